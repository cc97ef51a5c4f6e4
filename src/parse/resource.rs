//! Recognizer for resource descriptors inside a `_CRS` block.
//!
//! Invoked once `DeviceParser` has seen the line introducing `_CRS`. This
//! consumes lines directly from the shared `TokenStream` until the
//! resource template package closes (brace depth returns to the level it
//! started at), dispatching each line to whichever descriptor recognizer
//! is currently pending.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexer::{first_quoted, TokenStream};
use crate::model::{Device, GpioRef, InterruptRef, ResourceWindow};

static HEX8: Lazy<Regex> = Lazy::new(|| Regex::new(r"0x([0-9A-Fa-f]{8})\b").unwrap());
static HEX_ANY: Lazy<Regex> = Lazy::new(|| Regex::new(r"0x([0-9A-Fa-f]+)\b").unwrap());
static INTERRUPT_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*0x([0-9A-Fa-f]+),$").unwrap());
static GPIO_CONTROLLER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\_SB\.(\w+)").unwrap());

#[derive(Default)]
struct PendingMemory {
    active: bool,
    seen: Vec<u32>,
}

#[derive(Default)]
struct PendingInterrupt {
    active: bool,
}

#[derive(Default)]
struct PendingGpio {
    active: bool,
    controller: Option<String>,
    collecting_pins: bool,
}

/// Consume the `_CRS` resource template from `ts`, populating `device`.
///
/// Expects to be called immediately after the line that introduced `_CRS`
/// has already been consumed by the caller.
pub fn parse_crs(ts: &mut TokenStream, device: &mut Device) {
    let mut depth = 0i32;
    let mut started = false;
    let mut memory = PendingMemory::default();
    let mut interrupt = PendingInterrupt::default();
    let mut gpio = PendingGpio::default();

    loop {
        let Some(line) = ts.next_line() else {
            // Unterminated `_CRS`; a malformed resource template is not
            // fatal, so we simply stop with whatever was gathered.
            break;
        };

        if line.text.contains("Memory32Fixed") {
            memory.active = true;
        }
        if memory.active {
            if let Some(caps) = HEX8.captures(line.text) {
                if let Ok(value) = u32::from_str_radix(&caps[1], 16) {
                    if !memory.seen.contains(&value) {
                        memory.seen.push(value);
                    }
                }
            }
            if memory.seen.len() >= 2 {
                memory.active = false;
            }
        }

        if line.text.contains("Interrupt (ResourceConsumer") {
            interrupt.active = true;
        } else if interrupt.active && device.interrupt.is_none() {
            if let Some(caps) = INTERRUPT_LITERAL.captures(line.text) {
                if let Ok(value) = u32::from_str_radix(&caps[1], 16) {
                    device.interrupt = Some(InterruptRef(value));
                    interrupt.active = false;
                }
            }
        }

        if line.text.contains("PinGroupFunction") {
            if let Some(label) = first_lowercase_quoted(line.text) {
                device.pin_groups.push(label.to_string());
            }
        }

        if line.text.contains("GpioIo") {
            gpio = PendingGpio {
                active: true,
                controller: None,
                collecting_pins: false,
            };
        }
        if gpio.active {
            if gpio.controller.is_none() {
                if let Some(caps) = GPIO_CONTROLLER.captures(line.text) {
                    gpio.controller = Some(caps[1].to_string());
                }
            }
            if line.text.contains("Pin list") {
                gpio.collecting_pins = true;
            } else if gpio.collecting_pins {
                if let (Some(controller), Some(caps)) =
                    (gpio.controller.as_ref(), HEX_ANY.captures(line.text))
                {
                    if let Ok(pin) = u32::from_str_radix(&caps[1], 16) {
                        device.gpios.push(GpioRef {
                            controller: controller.clone(),
                            pin,
                        });
                    }
                } else if line.depth_delta < 0 {
                    gpio.active = false;
                    gpio.collecting_pins = false;
                }
            }
        }

        depth += line.depth_delta;
        if started && depth <= 0 {
            break;
        }
        if depth > 0 {
            started = true;
        }
    }

    match memory.seen.as_slice() {
        [] => {}
        [base] => device.resource_window = Some(ResourceWindow { base: *base, length: 0 }),
        [base, length, rest @ ..] => {
            if device.resource_window.is_none() {
                device.resource_window = Some(ResourceWindow {
                    base: *base,
                    length: *length,
                });
            }
            device.extra_windows_seen += rest.len() as u32 / 2;
        }
    }
}

/// First quoted string beginning with a lowercase letter on `line`.
fn first_lowercase_quoted(line: &str) -> Option<&str> {
    let mut rest = line;
    loop {
        let candidate = first_quoted(rest)?;
        if candidate.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return Some(candidate);
        }
        let offset = rest.find(candidate)? + candidate.len() + 1;
        if offset >= rest.len() {
            return None;
        }
        rest = &rest[offset..];
    }
}
