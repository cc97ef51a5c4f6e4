//! Recognizer for named packages inside a device body: `CLKT` (clock
//! table), `RSTL` (reset table), and `_DSD` (generic key/value
//! properties).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexer::TokenStream;
use crate::model::{ClockRef, Device, PropertyValue, ResetRef};

static QUOTED_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\s*"([^"]*)",?\s*$"#).unwrap());
static VALUE_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(0[xX][0-9A-Fa-f]+|[0-9]+),?\s*$").unwrap());
static RESET_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(RST[0-9]),?\s*$").unwrap());

/// Walk lines until brace depth returns to the level it started at,
/// calling `on_line` for each consumed line. Shared by all three package
/// recognizers, since each closes its package the same way.
fn consume_package(ts: &mut TokenStream, mut on_line: impl FnMut(&str)) {
    let mut depth = 0i32;
    let mut started = false;
    loop {
        let Some(line) = ts.next_line() else { break };
        on_line(line.text);
        depth += line.depth_delta;
        if started && depth <= 0 {
            break;
        }
        if depth > 0 {
            started = true;
        }
    }
}

/// Parse a `CLKT` clock-table package: the first hex literal on a
/// non-`Package` line is the clock id, the first non-empty quoted string
/// is the clock name.
pub fn parse_clkt(ts: &mut TokenStream, device: &mut Device) {
    let mut clock_id: Option<u32> = None;
    let mut clock_name: Option<String> = None;

    consume_package(ts, |line| {
        if line.contains("Package") {
            return;
        }
        if clock_id.is_none() {
            if let Some(caps) = VALUE_LITERAL.captures(line) {
                let text = &caps[1];
                let parsed = if let Some(hex) = text.strip_prefix("0x").or(text.strip_prefix("0X"))
                {
                    u32::from_str_radix(hex, 16).ok()
                } else {
                    text.parse::<u32>().ok()
                };
                if let Some(v) = parsed {
                    clock_id = Some(v);
                    return;
                }
            }
        }
        if clock_name.is_none() {
            if let Some(caps) = QUOTED_ONLY.captures(line) {
                let text = &caps[1];
                if !text.is_empty() {
                    clock_name = Some(text.to_string());
                }
            }
        }
    });

    if let Some(clock_id) = clock_id {
        device.clock = Some(ClockRef {
            clock_id,
            clock_name,
        });
    }
}

/// Parse an `RSTL` reset-table package: the first bare `RST[0-9]` symbol
/// is the controller, the first subsequent hex literal is the reset id,
/// the first subsequent quoted identifier is the reset name.
pub fn parse_rstl(ts: &mut TokenStream, device: &mut Device) {
    let mut controller: Option<String> = None;
    let mut reset_id: Option<u32> = None;
    let mut reset_name: Option<String> = None;

    consume_package(ts, |line| {
        if controller.is_none() {
            if let Some(caps) = RESET_SYMBOL.captures(line) {
                controller = Some(caps[1].to_string());
                return;
            }
        }
        if controller.is_some() && reset_id.is_none() {
            if let Some(caps) = VALUE_LITERAL.captures(line) {
                let text = &caps[1];
                let parsed = if let Some(hex) = text.strip_prefix("0x").or(text.strip_prefix("0X"))
                {
                    u32::from_str_radix(hex, 16).ok()
                } else {
                    text.parse::<u32>().ok()
                };
                if let Some(v) = parsed {
                    reset_id = Some(v);
                    return;
                }
            }
        }
        if controller.is_some() && reset_name.is_none() {
            if let Some(caps) = QUOTED_ONLY.captures(line) {
                reset_name = Some(caps[1].to_string());
            }
        }
    });

    if let (Some(controller), Some(reset_id)) = (controller, reset_id) {
        device.reset = Some(ResetRef {
            controller,
            reset_id,
            reset_name,
        });
    }
}

/// Parse a `_DSD` UUID-tagged package of (string-key, value) pairs.
///
/// A quoted-only line with no pending key becomes the pending key; the
/// next quoted-only line, or the next hex/decimal literal line, completes
/// the pair. A pending key with no value by the time another key (or the
/// package close) is seen becomes a boolean flag.
pub fn parse_dsd(ts: &mut TokenStream, device: &mut Device) {
    let mut pending_key: Option<String> = None;

    let mut finalize = |device: &mut Device, pending_key: &mut Option<String>| {
        if let Some(key) = pending_key.take() {
            device.properties.insert(key, PropertyValue::Flag(true));
        }
    };

    consume_package(ts, |line| {
        if line.contains("ToUUID") {
            return;
        }
        if let Some(caps) = QUOTED_ONLY.captures(line) {
            let text = caps[1].to_string();
            if let Some(key) = pending_key.take() {
                device.properties.insert(key, PropertyValue::Str(text));
            } else {
                pending_key = Some(text);
            }
            return;
        }
        if let (Some(key), Some(caps)) = (pending_key.as_ref(), VALUE_LITERAL.captures(line)) {
            let text = &caps[1];
            let parsed: Option<i64> =
                if let Some(hex) = text.strip_prefix("0x").or(text.strip_prefix("0X")) {
                    i64::from_str_radix(hex, 16).ok()
                } else {
                    text.parse::<i64>().ok()
                };
            if let Some(v) = parsed {
                let key = key.clone();
                device.properties.insert(key, PropertyValue::Int(v));
                pending_key = None;
            }
        }
    });

    finalize(device, &mut pending_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(parser: impl Fn(&mut TokenStream, &mut Device), lines: &[&str]) -> Device {
        let text = lines.join("\n");
        let mut ts = TokenStream::new(&text);
        let mut device = Device::new("TEST".into());
        parser(&mut ts, &mut device);
        device
    }

    #[test]
    fn clkt_extracts_id_and_skips_package_size() {
        let device = run(
            parse_clkt,
            &[
                "        {",
                "            Package (0x02)",
                "            {",
                "                0xFD,",
                "                \"\"",
                "            }",
                "        })",
            ],
        );
        assert_eq!(device.clock.as_ref().unwrap().clock_id, 0xFD);
        assert_eq!(device.clock.as_ref().unwrap().clock_name, None);
    }

    #[test]
    fn rstl_extracts_controller_id_and_name() {
        let device = run(
            parse_rstl,
            &[
                "        {",
                "            RST1,",
                "            0x12,",
                "            I2C0,",
                "            \"i2c_reset\"",
                "        })",
            ],
        );
        let reset = device.reset.unwrap();
        assert_eq!(reset.controller, "RST1");
        assert_eq!(reset.reset_id, 0x12);
        assert_eq!(reset.reset_name.as_deref(), Some("i2c_reset"));
    }

    #[test]
    fn dsd_parses_int_string_and_flag_properties() {
        let device = run(
            parse_dsd,
            &[
                "        {",
                "            ToUUID (\"daffd814-6eba-4d8c-8a91-bc9bbf4aa301\"),",
                "            Package (0x03)",
                "            {",
                "                Package (0x02)",
                "                {",
                "                    \"clock-frequency\",",
                "                    0x00061A80",
                "                },",
                "                Package (0x02)",
                "                {",
                "                    \"compatible\",",
                "                    \"ethernet-phy-ieee802.3-c22\"",
                "                },",
                "                Package (0x01)",
                "                {",
                "                    \"wakeup-source\"",
                "                }",
                "            }",
                "        })",
            ],
        );
        assert_eq!(
            device.properties.get("clock-frequency"),
            Some(&PropertyValue::Int(0x61A80))
        );
        assert_eq!(
            device.properties.get("compatible"),
            Some(&PropertyValue::Str("ethernet-phy-ieee802.3-c22".to_string()))
        );
        assert_eq!(
            device.properties.get("wakeup-source"),
            Some(&PropertyValue::Flag(true))
        );
    }
}
