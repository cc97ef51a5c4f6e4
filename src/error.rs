//! Error types for the extraction-to-DTS pipeline.
//!
//! Each stage of the pipeline gets its own error enum, following the same
//! shape the rest of this codebase uses elsewhere: small `thiserror` enums
//! per subsystem, aggregated into a single top-level error that `main`
//! matches on to pick an exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent the extraction directory from being read at all:
/// bad arguments, a missing directory, a missing identification summary,
/// or a missing primary disassembled table. These are the only fatal
/// errors this tool raises; anything gone wrong inside a device body is
/// logged and skipped instead, not propagated as an error.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("extraction directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("primary disassembled table not found: {0}")]
    MissingPrimaryTable(PathBuf),

    #[error("identification summary not found: {0}")]
    MissingSummary(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from writing the generated DTS file.
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error type returned by `main`'s `run()`.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}
