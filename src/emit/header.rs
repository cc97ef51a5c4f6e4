//! Root preamble, CPU cluster, PSCI/timer, and the GIC.

use crate::emit::context::BoardContext;
use crate::emit::writer::{reg_cells, DtsWriter};
use crate::symbols::{self, Category};

const MEMORY_BASE: u32 = 0x8000_0000;
const MEMORY_SIZE_GIB: u64 = 16;

const GIC_DIST_BASE: u32 = 0xe821_0000;
const GIC_DIST_SIZE: u32 = 0x1_0000;
const GIC_REDIST_BASE: u32 = 0xe822_0000;
const GIC_REDIST_SIZE: u32 = 0x20_0000;

const BIG_CORE_COUNT: u32 = 4;

pub fn emit_preamble(w: &mut DtsWriter, ctx: &BoardContext) {
    w.line("// SPDX-License-Identifier: (GPL-2.0-only OR MIT)");
    w.line("// Generated from an on-target ACPI extraction. Do not edit by hand.");
    if !ctx.boot_mode_is_acpi {
        w.line("// Warning: source summary did not report an ACPI boot mode.");
    }
    w.line("");
    w.line("/dts-v1/;");
    w.line("");
    w.line("#include <dt-bindings/interrupt-controller/arm-gic.h>");
    w.line("");
    w.open_node(None, "/");
    w.prop_u32("#address-cells", 2);
    w.prop_u32("#size-cells", 2);
    w.prop_str("model", ctx.identity.model());
    w.prop_str_list("compatible", ctx.identity.compatible());
    w.prop_cells("interrupt-parent", "&gic");
    w.line("");

    emit_aliases(w, ctx);
    emit_chosen(w, ctx);

    w.open_node(None, "memory@80000000");
    w.prop_str("device_type", "memory");
    let size_bytes: u64 = MEMORY_SIZE_GIB << 30;
    w.prop(&format!(
        "reg = <0x0 0x{MEMORY_BASE:x} 0x{:x} 0x0>;",
        size_bytes >> 32
    ));
    w.close_node();

    emit_cpus(w, ctx.core_count);
    emit_psci_and_timer(w);
    emit_gic(w);
}

/// Order UART unique-IDs so the console UART always sorts first: it
/// becomes `serial0`, matching the `stdout-path` `emit_chosen` writes.
fn order_uarts_console_first(mut uids: Vec<u32>) -> Vec<u32> {
    uids.sort_unstable();
    if let Some(pos) = uids.iter().position(|&uid| uid == symbols::CONSOLE_UART_UID) {
        uids.swap(0, pos);
    }
    uids
}

fn emit_aliases(w: &mut DtsWriter, ctx: &BoardContext) {
    let serial_uids: Vec<u32> = ctx
        .devices
        .iter()
        .filter(|d| category_of(d) == Some(Category::Uart))
        .map(|d| d.unique_id)
        .collect();
    let mut i2c_uids: Vec<u32> = ctx
        .devices
        .iter()
        .filter(|d| category_of(d) == Some(Category::I2c))
        .map(|d| d.unique_id)
        .collect();
    if serial_uids.is_empty() && i2c_uids.is_empty() {
        return;
    }
    let serial_uids = order_uarts_console_first(serial_uids);
    i2c_uids.sort_unstable();

    w.open_node(None, "aliases");
    for (alias_index, uid) in serial_uids.iter().enumerate() {
        let label_index = uid.saturating_sub(1);
        w.prop(&format!(
            "serial{alias_index} = &uart{label_index};"
        ));
    }
    for (alias_index, uid) in i2c_uids.iter().enumerate() {
        w.prop(&format!("i2c{alias_index} = &i2c{uid};"));
    }
    w.close_node();
}

fn emit_chosen(w: &mut DtsWriter, ctx: &BoardContext) {
    let console = ctx
        .devices
        .iter()
        .find(|d| category_of(d) == Some(Category::Uart) && d.unique_id == symbols::CONSOLE_UART_UID)
        .or_else(|| {
            ctx.devices
                .iter()
                .find(|d| category_of(d) == Some(Category::Uart))
        });

    w.open_node(None, "chosen");
    if console.is_some() {
        w.prop_str("stdout-path", "serial0:115200n8");
    }
    w.close_node();
}

fn category_of(device: &crate::model::Device) -> Option<Category> {
    Some(crate::symbols::resolve(&device.hardware_id).category)
}

fn emit_cpus(w: &mut DtsWriter, core_count: u32) {
    w.open_node(None, "cpus");
    w.prop_u32("#address-cells", 1);
    w.prop_u32("#size-cells", 0);
    for cpu in 0..core_count {
        let compatible = if cpu < BIG_CORE_COUNT {
            "arm,cortex-a720"
        } else {
            "arm,cortex-a520"
        };
        w.open_node(Some(&format!("cpu{cpu}")), &format!("cpu@{cpu}"));
        w.prop_str("device_type", "cpu");
        w.prop_str("compatible", compatible);
        w.prop_u32("reg", cpu);
        w.prop_str("enable-method", "psci");
        w.close_node();
    }
    w.close_node();
}

fn emit_psci_and_timer(w: &mut DtsWriter) {
    w.open_node(Some("psci"), "psci");
    w.prop_str("compatible", "arm,psci-1.0");
    w.prop_str("method", "smc");
    w.close_node();

    w.open_node(None, "timer");
    w.prop_str("compatible", "arm,armv8-timer");
    w.prop(
        "interrupts = <GIC_PPI 13 IRQ_TYPE_LEVEL_LOW>, <GIC_PPI 14 IRQ_TYPE_LEVEL_LOW>, <GIC_PPI 11 IRQ_TYPE_LEVEL_LOW>, <GIC_PPI 10 IRQ_TYPE_LEVEL_LOW>;",
    );
    w.close_node();
}

fn emit_gic(w: &mut DtsWriter) {
    w.open_node(
        Some("gic"),
        &format!("interrupt-controller@{GIC_DIST_BASE:x}"),
    );
    w.prop_str("compatible", "arm,gic-v3");
    w.prop_flag("interrupt-controller");
    w.prop_u32("#interrupt-cells", 3);
    w.prop(&format!(
        "reg = <{}>, <{}>;",
        reg_cells(GIC_DIST_BASE, GIC_DIST_SIZE),
        reg_cells(GIC_REDIST_BASE, GIC_REDIST_SIZE)
    ));
    w.close_node();
}
