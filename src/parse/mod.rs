//! Parsing stage: turns disassembled ACPI text into a typed device list.
//!
//! `device` is the top-level driver; `resource` and `package` are the
//! sub-recognizers it composes.

pub mod device;
pub mod package;
pub mod resource;

pub use device::{dedupe, parse_devices, ParseOutcome, PnpFilter};
