//! Top-level driver for device recognition.
//!
//! Walks `Device(<ID>)` declarations in order, composing `ResourceParser`
//! and `PackageParser` to populate each device's fields, and uses
//! indentation (12 spaces vs. 8) to tell a child device apart from a
//! top-level one.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{package, resource};
use crate::lexer::TokenStream;
use crate::model::Device;

const CHILD_INDENT: usize = 12;

static DEVICE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)Device \((\w+)\)").unwrap());
static HID: Lazy<Regex> = Lazy::new(|| Regex::new(r#"_HID,\s*"([^"]*)""#).unwrap());
static UID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_UID,\s*(Zero|One|0[xX][0-9A-Fa-f]+|[0-9]+)").unwrap());
static ADR: Lazy<Regex> = Lazy::new(|| Regex::new(r"_ADR,\s*(0[xX][0-9A-Fa-f]+|[0-9]+)").unwrap());

/// Governs the hardware-ID drop filter: generic plug-and-play IDs
/// (`PNP*`) are dropped unless explicitly allow-listed. `PNP0C0C` is
/// always allowed through because the symbol table separately registers
/// a compatible string for it.
pub struct PnpFilter {
    allow: HashSet<String>,
}

impl PnpFilter {
    pub fn new(extra_allowed: impl IntoIterator<Item = String>) -> Self {
        let mut allow: HashSet<String> = extra_allowed.into_iter().collect();
        allow.insert("PNP0C0C".to_string());
        PnpFilter { allow }
    }

    pub fn permits(&self, hardware_id: &str) -> bool {
        if hardware_id.is_empty() {
            return false;
        }
        if !hardware_id.starts_with("PNP") {
            return true;
        }
        self.allow.contains(hardware_id)
    }
}

impl Default for PnpFilter {
    fn default() -> Self {
        PnpFilter::new(std::iter::empty())
    }
}

fn parse_uid(text: &str) -> Option<u32> {
    let caps = UID.captures(text)?;
    match &caps[1] {
        "Zero" => Some(0),
        "One" => Some(1),
        hex if hex.starts_with("0x") || hex.starts_with("0X") => {
            u32::from_str_radix(&hex[2..], 16).ok()
        }
        dec => dec.parse().ok(),
    }
}

fn parse_adr(text: &str) -> Option<u64> {
    let caps = ADR.captures(text)?;
    let text = &caps[1];
    if let Some(hex) = text.strip_prefix("0x").or(text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

/// Outcome of parsing one disassembled table: the filtered device list in
/// declaration order, plus a count of devices the `PNP*` filter dropped
/// (surfaced in the completion summary printed at the end of a run).
pub struct ParseOutcome {
    pub devices: Vec<Device>,
    pub dropped_by_filter: u32,
}

/// Parse every `Device(...)` declaration out of one disassembled table's
/// text. Cross-table deduplication is the caller's job, done once after
/// every input file has been walked.
pub fn parse_devices(text: &str, filter: &PnpFilter) -> ParseOutcome {
    let mut ts = TokenStream::new(text);
    let mut devices = Vec::new();
    let mut dropped_by_filter = 0u32;
    let mut current: Option<Device> = None;
    let mut current_child: Option<Device> = None;

    loop {
        let Some(line) = ts.next_line() else { break };

        if let Some(caps) = DEVICE_HEADER.captures(line.text) {
            let indent = caps[1].len();
            let id = caps[2].to_string();
            finalize_child(&mut current, &mut current_child);
            if indent >= CHILD_INDENT {
                current_child = Some(Device::new(id));
            } else {
                finalize_top(&mut devices, &mut current, filter, &mut dropped_by_filter);
                current = Some(Device::new(id));
            }
            continue;
        }

        let target = match current_child.as_mut().or(current.as_mut()) {
            Some(d) => d,
            None => continue,
        };

        if let Some(caps) = HID.captures(line.text) {
            target.hardware_id = caps[1].to_string();
        } else if let Some(uid) = parse_uid(line.text) {
            target.unique_id = uid;
        } else if let Some(adr) = parse_adr(line.text) {
            target.adr = Some(adr);
        } else if line.text.contains("_CRS") {
            resource::parse_crs(&mut ts, target);
        } else if line.text.contains("CLKT") {
            package::parse_clkt(&mut ts, target);
        } else if line.text.contains("RSTL") {
            package::parse_rstl(&mut ts, target);
        } else if line.text.contains("_DSD") {
            package::parse_dsd(&mut ts, target);
        }
    }

    finalize_child(&mut current, &mut current_child);
    finalize_top(&mut devices, &mut current, filter, &mut dropped_by_filter);
    ParseOutcome {
        devices,
        dropped_by_filter,
    }
}

fn finalize_child(current: &mut Option<Device>, current_child: &mut Option<Device>) {
    if let Some(child) = current_child.take() {
        if let Some(parent) = current.as_mut() {
            parent.children.push(child);
        }
    }
}

fn finalize_top(
    devices: &mut Vec<Device>,
    current: &mut Option<Device>,
    filter: &PnpFilter,
    dropped_by_filter: &mut u32,
) {
    if let Some(device) = current.take() {
        if device.hardware_id.is_empty() {
            return;
        }
        if filter.permits(&device.hardware_id) {
            devices.push(device);
        } else {
            *dropped_by_filter += 1;
        }
    }
}

/// Remove duplicate `(hardware_id, unique_id)` entries across one or more
/// parsed tables, keeping the first occurrence of each.
pub fn dedupe(devices: Vec<Device>) -> Vec<Device> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(devices.len());
    for device in devices {
        if seen.insert(device.dedup_key()) {
            out.push(device);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    Scope (_SB)
    {
        Device (I2C0)
        {
            Name (_HID, "CIXH200B")
            Name (_UID, Zero)
            Name (_CRS, ResourceTemplate ()
            {
                Memory32Fixed (ReadWrite,
                    0x04010000,
                    0x00010000,
                    )
                Interrupt (ResourceConsumer, Level, ActiveHigh, Exclusive, ,, )
                {
                    0x0000013E,
                }
                PinGroupFunction (Exclusive, PullDefault, 0x0000, "pinctrl_fch_i2c0", "\_SB.GPI0", 0, ResourceConsumer, ,, )
                {
                }
            })
            Name (CLKT, Package (0x01)
            {
                Package (0x02)
                {
                    0xFD,
                    ""
                }
            })
            Name (RSTL, Package (0x01)
            {
                Package (0x04)
                {
                    RST1,
                    0x12,
                    I2C0,
                    "i2c_reset"
                }
            })
            Name (_DSD, Package (0x02)
            {
                ToUUID ("daffd814-6eba-4d8c-8a91-bc9bbf4aa301"),
                Package (0x01)
                {
                    Package (0x02)
                    {
                        "clock-frequency",
                        0x00061A80
                    }
                }
            })
        }
        Device (ETH0)
        {
            Name (_HID, "CIXH7020")
            Name (_UID, Zero)
            Device (PHY0)
            {
                Name (_ADR, One)
                Name (_DSD, Package (0x02)
                {
                    ToUUID ("daffd814-6eba-4d8c-8a91-bc9bbf4aa301"),
                    Package (0x01)
                    {
                        Package (0x02)
                        {
                            "compatible",
                            "ethernet-phy-ieee802.3-c22"
                        }
                    }
                })
            }
        }
        Device (BRDG)
        {
            Name (_HID, "PNP0A08")
        }
    }
    "#;

    #[test]
    fn parses_i2c_device_end_to_end() {
        let filter = PnpFilter::default();
        let outcome = parse_devices(SAMPLE, &filter);
        let i2c = outcome.devices.iter().find(|d| d.hardware_id == "CIXH200B").unwrap();
        assert_eq!(i2c.unique_id, 0);
        assert_eq!(i2c.resource_window.unwrap().base, 0x04010000);
        assert_eq!(i2c.resource_window.unwrap().length, 0x00010000);
        assert_eq!(i2c.interrupt.unwrap().0, 0x13E);
        assert_eq!(i2c.pin_groups, vec!["pinctrl_fch_i2c0".to_string()]);
        assert_eq!(i2c.clock.as_ref().unwrap().clock_id, 0xFD);
        let reset = i2c.reset.as_ref().unwrap();
        assert_eq!(reset.controller, "RST1");
        assert_eq!(reset.reset_id, 0x12);
        assert_eq!(reset.reset_name.as_deref(), Some("i2c_reset"));
        assert_eq!(
            i2c.properties.get("clock-frequency").unwrap().as_int(),
            Some(0x61A80)
        );
    }

    #[test]
    fn parses_child_phy_device() {
        let filter = PnpFilter::default();
        let outcome = parse_devices(SAMPLE, &filter);
        let eth = outcome.devices.iter().find(|d| d.hardware_id == "CIXH7020").unwrap();
        assert_eq!(eth.children.len(), 1);
        assert_eq!(eth.children[0].adr, Some(1));
        assert_eq!(
            eth.children[0].compatible_property(),
            Some("ethernet-phy-ieee802.3-c22")
        );
    }

    #[test]
    fn drops_generic_pnp_ids() {
        let filter = PnpFilter::default();
        let outcome = parse_devices(SAMPLE, &filter);
        assert!(!outcome.devices.iter().any(|d| d.hardware_id == "PNP0A08"));
        assert_eq!(outcome.dropped_by_filter, 1);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut a = Device::new("A".into());
        a.hardware_id = "CIXH200B".into();
        a.unique_id = 0;
        a.pin_groups.push("first".into());
        let mut b = Device::new("A".into());
        b.hardware_id = "CIXH200B".into();
        b.unique_id = 0;
        b.pin_groups.push("second".into());
        let deduped = dedupe(vec![a, b]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].pin_groups, vec!["first".to_string()]);
    }
}
