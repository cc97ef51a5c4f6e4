//! GPIO-keys and GPIO-LEDs auxiliary nodes.
//!
//! Only the fields the source actually populated are carried: a button's
//! `linux,code`, defaulting to `KEY_POWER`, and whatever `label` /
//! `default-state` keys an LED's `_DSD` supplied. No controller/pin/trigger
//! fields are invented.

use crate::emit::writer::DtsWriter;
use crate::model::Device;
use crate::symbols::{self, Category};

const KEY_POWER: i64 = 116;

pub fn emit_gpio_keys(w: &mut DtsWriter, devices: &[Device]) {
    let buttons: Vec<&Device> = devices
        .iter()
        .filter(|d| symbols::resolve(&d.hardware_id).category == Category::GpioKeys)
        .collect();
    if buttons.is_empty() {
        return;
    }

    w.open_node(None, "gpio-keys");
    w.prop_str("compatible", "gpio-keys");
    for (index, button) in buttons.iter().enumerate() {
        let code = button
            .properties
            .get("linux,code")
            .and_then(|v| v.as_int())
            .unwrap_or(KEY_POWER);
        w.open_node(None, &format!("button-{index}"));
        w.prop(&format!("linux,code = <{code}>;"));
        w.close_node();
    }
    w.close_node();
}

pub fn emit_gpio_leds(w: &mut DtsWriter, devices: &[Device]) {
    let leds: Vec<&Device> = devices
        .iter()
        .filter(|d| symbols::resolve(&d.hardware_id).category == Category::GpioLeds)
        .collect();
    if leds.is_empty() {
        return;
    }

    w.open_node(None, "leds");
    w.prop_str("compatible", "gpio-leds");
    for (index, led) in leds.iter().enumerate() {
        let label = led
            .properties
            .get("label")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("led-{index}"));
        w.open_node(None, &format!("led-{index}"));
        w.prop_str("label", &label);
        if let Some(state) = led.properties.get("default-state").and_then(|v| v.as_str()) {
            w.prop_str("default-state", state);
        }
        w.close_node();
    }
    w.close_node();
}
