//! Clock and reset controller emission.
//!
//! Emitted from the first matching device instances found in the parsed
//! list; a placeholder fixed-frequency clock is emitted under the `cru`
//! label when no clock controller was declared, so later `clocks`
//! references stay well-formed.

use crate::emit::writer::{reg_cells, DtsWriter};
use crate::model::Device;
use crate::symbols::{self, Category};

const PLACEHOLDER_CLOCK_HZ: u32 = 25_000_000;

pub fn emit_clock_controller(w: &mut DtsWriter, devices: &[Device]) {
    let cru = devices
        .iter()
        .find(|d| symbols::resolve(&d.hardware_id).category == Category::ClockController);

    match cru {
        Some(device) => {
            let (base, length) = device
                .resource_window
                .map(|win| (win.base, win.length))
                .unwrap_or((0, 0));
            w.open_node(Some("cru"), &format!("clock-controller@{base:08x}"));
            w.prop_str("compatible", symbols::compatible_for(&device.hardware_id));
            w.prop_cells("reg", &reg_cells(base, length));
            w.prop_u32("#clock-cells", 1);
            w.close_node();
        }
        None => {
            w.open_node(Some("cru"), "clock-cru");
            w.prop_str("compatible", "fixed-clock");
            w.prop_u32("#clock-cells", 0);
            w.prop_u32("clock-frequency", PLACEHOLDER_CLOCK_HZ);
            w.close_node();
        }
    }
}

pub fn emit_reset_controllers(w: &mut DtsWriter, devices: &[Device]) {
    let mut index = 0u32;
    for device in devices {
        if symbols::resolve(&device.hardware_id).category != Category::ResetController {
            continue;
        }
        let label = symbols::controller_label(&device.name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("rst{index}"));
        let (base, length) = device
            .resource_window
            .map(|win| (win.base, win.length))
            .unwrap_or((0, 0));
        w.open_node(Some(&label), &format!("reset-controller@{base:08x}"));
        w.prop_str("compatible", symbols::compatible_for(&device.hardware_id));
        w.prop_cells("reg", &reg_cells(base, length));
        w.prop_u32("#reset-cells", 1);
        w.close_node();
        index += 1;
    }
}
