//! Readers for the runtime-captured sidecar files: the i2c-bus probe
//! grid, the fixed-regulator dump, and the board identification summary.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{BoardIdentity, Device};

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^---\s*i2c-(\d+)\s*---").unwrap());
static ROW_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9a-fA-F]{2}):").unwrap());
static ADDRESS_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{2}$").unwrap());
static CORES_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Cores:\s*(\d+)").unwrap());
static BOOT_MODE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Boot mode:\s*(.+)").unwrap());
static PRODUCT_NAME_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Product Name:\s*(.+)").unwrap());

/// One detected i2c client: its bus index and 7-bit address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct I2cProbe {
    pub bus: u32,
    pub address: u8,
}

/// Parse `06-i2c.txt`: one `--- i2c-N ---` section per bus, each followed
/// by `i2cdetect`-style rows. Any cell that isn't `--` or `UU` and looks
/// like a two-hex-digit address is a detected client.
pub fn parse_i2c_probe(text: &str) -> Vec<I2cProbe> {
    let mut probes = Vec::new();
    let mut bus: Option<u32> = None;

    for line in text.lines() {
        if let Some(caps) = SECTION_HEADER.captures(line) {
            bus = caps[1].parse().ok();
            continue;
        }
        let Some(bus) = bus else { continue };
        if !ROW_PREFIX.is_match(line) {
            continue;
        }
        for cell in line.split_whitespace().skip(1) {
            if cell == "--" || cell == "UU" {
                continue;
            }
            if ADDRESS_CELL.is_match(cell) {
                if let Ok(address) = u8::from_str_radix(cell, 16) {
                    probes.push(I2cProbe { bus, address });
                }
            }
        }
    }

    probes
}

/// A fixed-voltage regulator, whether recovered from a supplementary ACPI
/// table's `PRP0001` descriptor or from the runtime sidecar dump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedRegulator {
    pub name: String,
    pub microvolts: u32,
    pub always_on: bool,
}

/// Parse `12-regulators.txt`: one regulator per line, `<name>
/// <microvolts> <always_on:0|1>`.
pub fn parse_regulator_dump(text: &str) -> Vec<FixedRegulator> {
    let mut regulators = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(name), Some(microvolts), Some(always_on)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let Ok(microvolts) = microvolts.parse::<u32>() else {
            continue;
        };
        regulators.push(FixedRegulator {
            name: name.to_string(),
            microvolts,
            always_on: always_on != "0",
        });
    }
    regulators
}

/// Hardware-ID used by the generic device-tree-compatible pass-through
/// descriptor. A device carrying this ID is never a real peripheral, so
/// `soc@0` emission must skip it once it has been folded into either a
/// recovered regulator or discarded as unrecognized.
pub const PRP0001_HARDWARE_ID: &str = "PRP0001";
const REGULATOR_FIXED_COMPATIBLE: &str = "regulator-fixed";

/// Recover `FixedRegulator` records from `PRP0001`-tagged devices in the
/// parsed device list: a generic device-tree-compatible descriptor with a
/// `regulator-fixed` `compatible` property and the usual regulator `_DSD`
/// keys, giving one shared record type regardless of whether a regulator
/// came from a supplementary table or the runtime sidecar dump. Callers
/// that fold this back into the board context must also drop
/// `PRP0001_HARDWARE_ID` devices from the ordinary device list, or they
/// will be rendered twice.
pub fn regulators_from_devices(devices: &[Device]) -> Vec<FixedRegulator> {
    devices
        .iter()
        .filter(|d| d.hardware_id == PRP0001_HARDWARE_ID)
        .filter(|d| d.compatible_property() == Some(REGULATOR_FIXED_COMPATIBLE))
        .filter_map(|d| {
            let name = d
                .properties
                .get("regulator-name")
                .and_then(|v| v.as_str())?
                .to_string();
            let microvolts = d
                .properties
                .get("regulator-min-microvolt")
                .and_then(|v| v.as_int())? as u32;
            let always_on = matches!(
                d.properties.get("regulator-always-on"),
                Some(crate::model::PropertyValue::Flag(true))
            );
            Some(FixedRegulator {
                name,
                microvolts,
                always_on,
            })
        })
        .collect()
}

/// Identification summary parsed from `00-summary.txt`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSummary {
    pub identity: BoardIdentity,
    pub core_count: u32,
    pub boot_mode_is_acpi: bool,
}

const DEFAULT_CORE_COUNT: u32 = 12;

/// Detect the board variant and core count from `00-summary.txt`: a
/// substring match for `O6N` / `CD8160` on the `Product Name:` line
/// selects the N-variant identity, else baseline.
pub fn parse_summary(text: &str) -> BoardSummary {
    let product_name = PRODUCT_NAME_LINE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    let identity = if product_name.contains("O6N") || product_name.contains("CD8160") {
        BoardIdentity::NVariant
    } else {
        BoardIdentity::Baseline
    };

    let core_count = CORES_LINE
        .captures(text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(DEFAULT_CORE_COUNT);

    let boot_mode_is_acpi = BOOT_MODE_LINE
        .captures(text)
        .map(|c| c[1].to_ascii_lowercase().contains("acpi"))
        .unwrap_or(false);

    BoardSummary {
        identity,
        core_count,
        boot_mode_is_acpi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i2c_probe_finds_address_in_detection_row() {
        let text = "\
--- i2c-3 ---
     0  1  2  3  4  5  6  7  8  9  a  b  c  d  e  f
00:          -- -- -- -- -- -- -- -- -- -- -- -- --
50: -- 51 -- -- -- -- -- -- -- -- -- -- -- -- -- --
";
        let probes = parse_i2c_probe(text);
        assert_eq!(probes, vec![I2cProbe { bus: 3, address: 0x51 }]);
    }

    #[test]
    fn i2c_probe_ignores_empty_and_in_use_cells() {
        let text = "\
--- i2c-0 ---
     0  1  2  3  4  5  6  7  8  9  a  b  c  d  e  f
60: UU -- -- -- -- -- -- -- -- -- -- -- -- -- -- --
";
        assert!(parse_i2c_probe(text).is_empty());
    }

    #[test]
    fn regulator_dump_parses_fields() {
        let text = "vdd_core 900000 1\nvdd_gpu 800000 0\n";
        let regs = parse_regulator_dump(text);
        assert_eq!(
            regs,
            vec![
                FixedRegulator {
                    name: "vdd_core".into(),
                    microvolts: 900000,
                    always_on: true
                },
                FixedRegulator {
                    name: "vdd_gpu".into(),
                    microvolts: 800000,
                    always_on: false
                },
            ]
        );
    }

    #[test]
    fn summary_detects_n_variant() {
        let text = "Boot mode: ACPI\nCores: 12\nProduct Name: Sky1 O6N CD8160 Devboard\n";
        let summary = parse_summary(text);
        assert_eq!(summary.identity, BoardIdentity::NVariant);
        assert_eq!(summary.core_count, 12);
        assert!(summary.boot_mode_is_acpi);
    }

    #[test]
    fn summary_defaults_to_baseline_and_default_cores() {
        let text = "Boot mode: Legacy\nProduct Name: Sky1 Reference\n";
        let summary = parse_summary(text);
        assert_eq!(summary.identity, BoardIdentity::Baseline);
        assert_eq!(summary.core_count, DEFAULT_CORE_COUNT);
        assert!(!summary.boot_mode_is_acpi);
    }

    #[test]
    fn prp0001_regulator_device_is_recovered() {
        use crate::model::PropertyValue;

        let mut device = Device::new("REG0".into());
        device.hardware_id = PRP0001_HARDWARE_ID.into();
        device.properties.insert(
            "compatible".into(),
            PropertyValue::Str(REGULATOR_FIXED_COMPATIBLE.into()),
        );
        device
            .properties
            .insert("regulator-name".into(), PropertyValue::Str("vdd_core".into()));
        device
            .properties
            .insert("regulator-min-microvolt".into(), PropertyValue::Int(900_000));
        device
            .properties
            .insert("regulator-always-on".into(), PropertyValue::Flag(true));

        let regulators = regulators_from_devices(&[device]);
        assert_eq!(
            regulators,
            vec![FixedRegulator {
                name: "vdd_core".into(),
                microvolts: 900_000,
                always_on: true,
            }]
        );
    }

    #[test]
    fn non_regulator_prp0001_device_is_ignored() {
        let mut device = Device::new("OTHER".into());
        device.hardware_id = PRP0001_HARDWARE_ID.into();
        assert!(regulators_from_devices(&[device]).is_empty());
    }
}
