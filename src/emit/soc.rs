//! The flat `soc@0` container and its per-device emission rules.

use crate::emit::writer::{reg_cells, spi_cells, DtsWriter};
use crate::model::Device;
use crate::sidecar::I2cProbe;
use crate::symbols::{self, Category};

const DEFAULT_I2C_CLOCK_HZ: i64 = 400_000;

/// Categories rendered as `soc@0` children, in emission order. Clock/reset
/// controllers and the board-level GPIO-keys/LEDs auxiliaries are emitted
/// elsewhere, ahead of this container.
const SOC_CATEGORIES: &[Category] = &[
    Category::I2c,
    Category::Uart,
    Category::Gpio,
    Category::Usb,
    Category::Pcie,
    Category::DisplayPort,
    Category::Watchdog,
    Category::Thermal,
    Category::Gpu,
    Category::Ethernet,
    Category::Npu,
    Category::VideoCodec,
    Category::Audio,
    Category::Spi,
    Category::Pwm,
    Category::Dma,
    Category::Rtc,
    Category::Iommu,
    Category::Mailbox,
    Category::PowerDomain,
    Category::Unknown,
];

pub fn emit_soc(w: &mut DtsWriter, devices: &[Device], i2c_probes: &[I2cProbe]) {
    w.open_node(None, "soc@0");
    w.prop_u32("#address-cells", 2);
    w.prop_u32("#size-cells", 2);
    w.prop_flag("ranges");

    for &category in SOC_CATEGORIES {
        let mut instances: Vec<&Device> = devices
            .iter()
            .filter(|d| symbols::resolve(&d.hardware_id).category == category)
            .collect();
        instances.sort_by_key(|d| d.unique_id);
        for device in instances {
            emit_device(w, device, category, i2c_probes);
        }
    }

    w.close_node();
}

fn label_index(category: Category, unique_id: u32) -> u32 {
    if category == Category::Uart {
        unique_id.saturating_sub(1)
    } else {
        unique_id
    }
}

fn emit_device(w: &mut DtsWriter, device: &Device, category: Category, i2c_probes: &[I2cProbe]) {
    let entry = symbols::resolve(&device.hardware_id);
    let label = format!("{}{}", entry.label_kind, label_index(category, device.unique_id));
    let base = device.resource_window.map(|win| win.base).unwrap_or(0);
    let node_name = format!("{}@{:08x}", entry.node_kind, base);

    w.open_node(Some(&label), &node_name);
    w.prop_str("compatible", entry.compatible);

    if let Some(window) = device.resource_window {
        w.prop_cells("reg", &reg_cells(window.base, window.length));
    }
    if let Some(interrupt) = device.interrupt {
        let spi = symbols::translate_interrupt(interrupt.0);
        w.prop(&format!("interrupts = <{}>;", spi_cells(spi)));
    }

    if let Some(clock) = &device.clock {
        w.prop(&format!("clocks = <&cru {}>;", clock.clock_id));
        if let Some(name) = &clock.clock_name {
            if !name.is_empty() {
                w.prop_str("clock-names", name);
            }
        }
    }

    if let Some(reset) = &device.reset {
        let reset_label = symbols::controller_label(&reset.controller)
            .unwrap_or(&reset.controller);
        w.prop(&format!("resets = <&{reset_label} {}>;", reset.reset_id));
        if let Some(name) = &reset.reset_name {
            w.prop_str("reset-names", name);
        }
    }

    if let Some(first_pin_group) = device.pin_groups.first() {
        w.prop(&format!("pinctrl-0 = <&{first_pin_group}>;"));
        w.prop_str("pinctrl-names", "default");
    }

    match category {
        Category::I2c => {
            let freq = device
                .properties
                .get("clock-frequency")
                .and_then(|v| v.as_int())
                .unwrap_or(DEFAULT_I2C_CLOCK_HZ);
            w.prop(&format!("clock-frequency = <{freq}>;"));
        }
        Category::Gpio => {
            w.prop_flag("gpio-controller");
            w.prop_u32("#gpio-cells", 2);
            if device.interrupt.is_some() {
                w.prop_flag("interrupt-controller");
                w.prop_u32("#interrupt-cells", 2);
            }
        }
        _ => {}
    }

    let status = if category == Category::Uart && device.unique_id == symbols::CONSOLE_UART_UID {
        "okay"
    } else {
        entry.default_status
    };
    w.prop_str("status", status);

    if category == Category::I2c {
        emit_i2c_children(w, device.unique_id, i2c_probes);
    }
    if category == Category::Ethernet && !device.children.is_empty() {
        emit_mdio_children(w, &device.children);
    }

    w.close_node();
}

/// Unidentified i2c children: every sidecar-probed address on the bus
/// matching this device's unique-ID that the device itself didn't
/// already declare gets a placeholder child.
fn emit_i2c_children(w: &mut DtsWriter, unique_id: u32, i2c_probes: &[I2cProbe]) {
    let mut addresses: Vec<u8> = i2c_probes
        .iter()
        .filter(|p| p.bus == unique_id)
        .map(|p| p.address)
        .collect();
    addresses.sort_unstable();
    addresses.dedup();
    for address in addresses {
        w.line(&format!("/* unidentified i2c client at 0x{address:02x} */"));
        w.open_node(None, &format!("device@{address:x}"));
        w.prop(&format!("reg = <0x{address:x}>;"));
        w.close_node();
    }
}

fn emit_mdio_children(w: &mut DtsWriter, children: &[Device]) {
    w.open_node(None, "mdio");
    w.prop_u32("#address-cells", 1);
    w.prop_u32("#size-cells", 0);
    for child in children {
        let Some(adr) = child.adr else { continue };
        let compatible = child.compatible_property().unwrap_or(symbols::UNKNOWN_COMPATIBLE);
        w.open_node(None, &format!("ethernet-phy@{adr:x}"));
        w.prop_str("compatible", compatible);
        w.prop(&format!("reg = <{adr}>;"));
        w.close_node();
    }
    w.close_node();
}
