//! sky1-dtsgen - translates a Sky1 ACPI extraction directory into a
//! mainline-kernel Device Tree Source file.

mod emit;
mod error;
mod lexer;
mod model;
mod parse;
mod sidecar;
mod symbols;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info, warn};

use emit::context::BoardContext;
use error::{EmitError, Error, ExtractError};
use parse::{dedupe, parse_devices, ParseOutcome, PnpFilter};

#[derive(Parser, Debug)]
#[command(name = "sky1-dtsgen")]
#[command(about = "Translates a Sky1 ACPI extraction directory into a mainline-kernel DTS file")]
struct Args {
    /// Directory produced by the on-target extraction step
    extraction_dir: PathBuf,

    /// Output DTS path (defaults to `<extraction_dir>/generated.dts`)
    output: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Additional PNP* hardware-IDs to allow through the device filter
    #[arg(long = "pnp-allow")]
    pnp_allow: Vec<String>,

    /// Ignore supplementary-table fixed regulators and always use the
    /// runtime sidecar dump (testing aid)
    #[arg(long)]
    regulators_sidecar_only: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(args: Args) -> Result<(), Error> {
    let extraction_dir = &args.extraction_dir;
    if !extraction_dir.is_dir() {
        return Err(ExtractError::MissingDirectory(extraction_dir.clone()).into());
    }

    let summary_path = extraction_dir.join("00-summary.txt");
    let summary_text = read_required(&summary_path)
        .map_err(|_| ExtractError::MissingSummary(summary_path.clone()))?;
    let summary = sidecar::parse_summary(&summary_text);
    if !summary.boot_mode_is_acpi {
        warn!("00-summary.txt does not report an ACPI boot mode; continuing anyway");
    }
    info!(
        "board identity: {:?}, {} cores",
        summary.identity, summary.core_count
    );

    let primary_path = extraction_dir.join("acpi/DSDT.dsl");
    let primary_text = read_required(&primary_path)
        .map_err(|_| ExtractError::MissingPrimaryTable(primary_path.clone()))?;

    let filter = PnpFilter::new(args.pnp_allow.iter().cloned());

    let mut all_devices = Vec::new();
    let mut dropped_by_pnp_filter = 0u32;

    let ParseOutcome {
        devices,
        dropped_by_filter,
    } = parse_devices(&primary_text, &filter);
    info!("parsed {} device(s) from {}", devices.len(), primary_path.display());
    all_devices.extend(devices);
    dropped_by_pnp_filter += dropped_by_filter;

    for path in supplementary_tables(extraction_dir) {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("skipping unreadable supplementary table {}: {e}", path.display());
                continue;
            }
        };
        let ParseOutcome {
            devices,
            dropped_by_filter,
        } = parse_devices(&text, &filter);
        info!("parsed {} device(s) from {}", devices.len(), path.display());
        all_devices.extend(devices);
        dropped_by_pnp_filter += dropped_by_filter;
    }

    let before_dedup = all_devices.len();
    let mut devices = dedupe(all_devices);
    debug!(
        "deduplicated {} device(s) down to {}",
        before_dedup,
        devices.len()
    );

    let total_extra_windows: u32 = devices.iter().map(|d| d.extra_windows_seen).sum();
    if total_extra_windows > 0 {
        debug!(
            "{total_extra_windows} additional Memory32Fixed window(s) seen and discarded beyond each device's first"
        );
    }

    let i2c_probes = read_optional(&extraction_dir.join("06-i2c.txt"))
        .map(|text| sidecar::parse_i2c_probe(&text))
        .unwrap_or_default();
    if i2c_probes.is_empty() {
        warn!("no i2c sidecar dump found; i2c child placeholders will be omitted");
    }

    let table_regulators = sidecar::regulators_from_devices(&devices);
    let regulators = if !args.regulators_sidecar_only && !table_regulators.is_empty() {
        info!("using {} fixed regulator(s) from supplementary tables", table_regulators.len());
        table_regulators
    } else {
        read_optional(&extraction_dir.join("12-regulators.txt"))
            .map(|text| sidecar::parse_regulator_dump(&text))
            .unwrap_or_default()
    };
    if regulators.is_empty() {
        warn!("no fixed regulators found; regulator nodes will be omitted");
    }
    devices.retain(|d| d.hardware_id != sidecar::PRP0001_HARDWARE_ID);

    let unclaimed_i2c = unclaimed_i2c_addresses(&devices, &i2c_probes);

    let ctx = BoardContext {
        identity: summary.identity,
        core_count: summary.core_count,
        boot_mode_is_acpi: summary.boot_mode_is_acpi,
        devices,
        i2c_probes,
        regulators,
        dropped_by_pnp_filter,
    };

    let text = emit::generate(&ctx);

    let output_path = args
        .output
        .unwrap_or_else(|| extraction_dir.join("generated.dts"));
    fs::write(&output_path, &text).map_err(|source| EmitError::Write {
        path: output_path.clone(),
        source,
    })?;

    print_summary(&ctx, &text, &output_path, unclaimed_i2c);
    Ok(())
}

fn supplementary_tables(extraction_dir: &Path) -> Vec<PathBuf> {
    let acpi_dir = extraction_dir.join("acpi");
    let Ok(entries) = fs::read_dir(&acpi_dir) else {
        return Vec::new();
    };
    let mut tables: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with("SSDT") && name.ends_with(".dsl"))
        })
        .collect();
    tables.sort();
    tables
}

fn read_required(path: &Path) -> std::io::Result<String> {
    fs::read_to_string(path)
}

fn read_optional(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn unclaimed_i2c_addresses(
    devices: &[model::Device],
    probes: &[sidecar::I2cProbe],
) -> usize {
    let buses_with_devices: std::collections::HashSet<u32> = devices
        .iter()
        .filter(|d| symbols::resolve(&d.hardware_id).category == symbols::Category::I2c)
        .map(|d| d.unique_id)
        .collect();
    probes
        .iter()
        .filter(|p| !buses_with_devices.contains(&p.bus))
        .count()
}

fn print_summary(ctx: &BoardContext, text: &str, output_path: &Path, unclaimed_i2c: usize) {
    let line_count = text.lines().count();
    println!("generated {} ({line_count} lines)", output_path.display());
    println!("board identity: {:?}", ctx.identity);
    println!("devices dropped by PNP filter: {}", ctx.dropped_by_pnp_filter);
    println!("i2c sidecar addresses not claimed by any bus: {unclaimed_i2c}");

    let mut tally: HashMap<&str, u32> = HashMap::new();
    for device in &ctx.devices {
        let compatible = symbols::compatible_for(&device.hardware_id);
        *tally.entry(compatible).or_insert(0) += 1;
    }
    let mut tally: Vec<(&str, u32)> = tally.into_iter().collect();
    tally.sort_by(|a, b| a.0.cmp(b.0));
    for (compatible, count) in tally {
        println!("  {compatible}: {count}");
    }
}
