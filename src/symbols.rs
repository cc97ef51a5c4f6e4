//! Symbol resolution and normalization: hardware-ID → compatible string,
//! controller symbol → label handle, and firmware-absolute →
//! bus-relative interrupt numbers.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Sentinel compatible string for a hardware-ID with no table entry.
pub const UNKNOWN_COMPATIBLE: &str = "unknown";

/// Fixed distance between a firmware-absolute interrupt number and the
/// GIC shared-peripheral-interrupt (SPI) space.
const SPI_OFFSET: u32 = 32;

/// Unique-ID of the UART treated as the console: forced to `status =
/// "okay"` and pointed at by `/chosen`'s `stdout-path`, regardless of
/// which UART has the lowest unique-ID.
pub const CONSOLE_UART_UID: u32 = 3;

/// Ordering used when laying out the `soc@0` container: fixed category
/// order, then by unique-ID within a category. Categories past `Ethernet`
/// have no individually-called-out placement rule but are kept in a
/// stable, documented tail order so the miscellaneous peripherals don't
/// shuffle between runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    I2c,
    Uart,
    Gpio,
    Usb,
    Pcie,
    DisplayPort,
    Watchdog,
    Thermal,
    Gpu,
    Ethernet,
    Npu,
    VideoCodec,
    Audio,
    Spi,
    Pwm,
    Dma,
    Rtc,
    Iommu,
    Mailbox,
    PowerDomain,
    /// Never placed in `soc@0`; handled specially by the emitter.
    ClockController,
    ResetController,
    /// Board-level input/LED descriptors, also handled outside `soc@0`.
    GpioKeys,
    GpioLeds,
    /// Hardware-ID not present in the table; sorted to the tail of
    /// `soc@0`'s miscellaneous bucket.
    Unknown,
}

/// One compatible-string table entry.
#[derive(Clone, Copy, Debug)]
pub struct SymbolEntry {
    pub compatible: &'static str,
    pub category: Category,
    /// DTS node-name prefix, e.g. `"i2c"` → `i2c@...`, `"serial"` → `serial@...`.
    pub node_kind: &'static str,
    /// DTS label prefix. Equal to `node_kind` except for UART, where the
    /// label stays `uart<N>` while the node name is `serial@...`.
    pub label_kind: &'static str,
    pub default_status: &'static str,
}

macro_rules! entry {
    ($compatible:literal, $category:expr, $kind:literal, $status:literal) => {
        SymbolEntry {
            compatible: $compatible,
            category: $category,
            node_kind: $kind,
            label_kind: $kind,
            default_status: $status,
        }
    };
    ($compatible:literal, $category:expr, $kind:literal, label = $label:literal, $status:literal) => {
        SymbolEntry {
            compatible: $compatible,
            category: $category,
            node_kind: $kind,
            label_kind: $label,
            default_status: $status,
        }
    };
}

#[rustfmt::skip]
static ENTRIES: &[(&str, SymbolEntry)] = &[
    // I2C
    ("CIXH200B", entry!("cdns,i2c-r1p14", Category::I2c, "i2c", "okay")),
    ("CIXH200C", entry!("cdns,i2c-r1p14", Category::I2c, "i2c", "okay")),
    // UART: label stays `uart<N>`, node name is `serial@...`.
    ("ARMH0011", entry!("arm,pl011", Category::Uart, "serial", label = "uart", "disabled")),
    ("ARMH0012", entry!("arm,pl011", Category::Uart, "serial", label = "uart", "disabled")),
    // GPIO
    ("CIXH1003", entry!("cix,sky1-gpio", Category::Gpio, "gpio", "okay")),
    ("CIXH1004", entry!("cix,sky1-gpio", Category::Gpio, "gpio", "okay")),
    // SPI
    ("CIXH2010", entry!("cix,sky1-spi", Category::Spi, "spi", "okay")),
    ("CIXH2011", entry!("cix,sky1-spi", Category::Spi, "spi", "okay")),
    // PWM
    ("CIXH2020", entry!("cix,sky1-pwm", Category::Pwm, "pwm", "okay")),
    // USB
    ("CIXH3001", entry!("cix,sky1-xhci", Category::Usb, "usb", "okay")),
    ("CIXH3002", entry!("generic-xhci", Category::Usb, "usb", "okay")),
    // PCIe
    ("CIXH4001", entry!("cix,sky1-pcie", Category::Pcie, "pcie", "okay")),
    // Display / backlight-adjacent controllers
    ("CIXH5001", entry!("cix,sky1-dp", Category::DisplayPort, "dp", "okay")),
    ("CIXH5002", entry!("cix,sky1-dsi", Category::DisplayPort, "dsi", "okay")),
    // GPU
    ("CIXH6010", entry!("cix,sky1-gpu", Category::Gpu, "gpu", "okay")),
    // NPU
    ("CIXH6020", entry!("cix,sky1-npu", Category::Npu, "npu", "okay")),
    // Video codec
    ("CIXH6030", entry!("cix,sky1-vpu", Category::VideoCodec, "vpu", "okay")),
    // Thermal
    ("CIXH6040", entry!("cix,sky1-thermal", Category::Thermal, "thermal", "okay")),
    // Audio
    ("CIXH8001", entry!("cix,sky1-audio", Category::Audio, "audio", "okay")),
    // Ethernet MAC
    ("CIXH7020", entry!("cix,sky1-dwmac", Category::Ethernet, "eth", "okay")),
    ("CIXH7021", entry!("snps,dwmac-4.20a", Category::Ethernet, "eth", "okay")),
    // DMA
    ("CIXH9001", entry!("cix,sky1-dma", Category::Dma, "dma", "okay")),
    // RTC
    ("CIXH9010", entry!("cix,sky1-rtc", Category::Rtc, "rtc", "okay")),
    // IOMMU
    ("ARMH0020", entry!("arm,smmu-v3", Category::Iommu, "iommu", "okay")),
    // Mailbox
    ("CIXH9020", entry!("cix,sky1-mailbox", Category::Mailbox, "mailbox", "okay")),
    // Power domain
    ("CIXH9030", entry!("cix,sky1-power", Category::PowerDomain, "pd", "okay")),
    // Watchdog
    ("ARMH0010", entry!("arm,sbsa-gwdt", Category::Watchdog, "wdt", "disabled")),
    // Clock / reset controllers (never placed in soc@0; see emit::clkrst)
    ("CIXH0001", entry!("cix,sky1-cru", Category::ClockController, "clock-controller", "okay")),
    ("CIXH0002", entry!("cix,sky1-rcru", Category::ResetController, "reset-controller", "okay")),
    // Board-level input descriptors
    ("ACPI0011", entry!("gpio-keys", Category::GpioKeys, "key", "okay")),
    ("PNP0C0C", entry!("gpio-leds", Category::GpioLeds, "led", "okay")),
];

static TABLE: Lazy<HashMap<&'static str, SymbolEntry>> =
    Lazy::new(|| ENTRIES.iter().copied().collect());

/// Look up the compatible-string / category / node-kind entry for a
/// hardware-ID. Returns `None` for unrecognized IDs; the caller still
/// emits the device with `UNKNOWN_COMPATIBLE` and tallies it.
pub fn lookup(hardware_id: &str) -> Option<&'static SymbolEntry> {
    TABLE.get(hardware_id)
}

pub fn compatible_for(hardware_id: &str) -> &'static str {
    lookup(hardware_id).map(|e| e.compatible).unwrap_or(UNKNOWN_COMPATIBLE)
}

/// The unknown-hardware-ID default entry: sentinel compatible, a
/// best-effort `dev@` node name, tail-of-misc category placement.
const UNKNOWN_ENTRY: SymbolEntry = SymbolEntry {
    compatible: UNKNOWN_COMPATIBLE,
    category: Category::Unknown,
    node_kind: "dev",
    label_kind: "dev",
    default_status: "okay",
};

/// Resolve a hardware-ID to its table entry, or the unknown-device
/// default when it has no entry.
pub fn resolve(hardware_id: &str) -> SymbolEntry {
    lookup(hardware_id).copied().unwrap_or(UNKNOWN_ENTRY)
}

/// Map a firmware controller symbol (e.g. `GPI0`, `RST1`, `CRU0`) to the
/// stable DTS label used to reference it.
pub fn controller_label(symbol: &str) -> Option<&'static str> {
    match symbol {
        "GPI0" => Some("fch_gpio0"),
        "GPI1" => Some("fch_gpio1"),
        "GPI2" => Some("fch_gpio2"),
        "GPI3" => Some("fch_gpio3"),
        "GPI4" => Some("s5_gpio0"),
        "GPI5" => Some("s5_gpio1"),
        "GPI6" => Some("s5_gpio2"),
        "RST0" => Some("rst0"),
        "RST1" => Some("rst1"),
        "CRU0" => Some("cru"),
        _ => None,
    }
}

/// Translate a firmware-absolute interrupt number to a bus-relative SPI
/// number: `n - 32` when `n > 32`, else `0`.
pub fn translate_interrupt(firmware_absolute: u32) -> u32 {
    if firmware_absolute > SPI_OFFSET {
        firmware_absolute - SPI_OFFSET
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_hardware_id_maps_to_tabulated_compatible() {
        assert_eq!(compatible_for("CIXH200B"), "cdns,i2c-r1p14");
    }

    #[test]
    fn unknown_hardware_id_maps_to_sentinel() {
        assert_eq!(compatible_for("ZZZZ0000"), UNKNOWN_COMPATIBLE);
    }

    #[test]
    fn interrupt_translation_subtracts_offset_above_32() {
        assert_eq!(translate_interrupt(0x13E), 0x13E - 32);
        assert_eq!(translate_interrupt(32), 0);
        assert_eq!(translate_interrupt(0), 0);
    }

    #[test]
    fn controller_label_translation_is_idempotent_per_input() {
        let first = controller_label("GPI0");
        let second = controller_label("GPI0");
        assert_eq!(first, second);
        assert_eq!(first, Some("fch_gpio0"));
    }

    #[test]
    fn gpio_bank_labels_split_across_domains() {
        assert_eq!(controller_label("GPI3"), Some("fch_gpio3"));
        assert_eq!(controller_label("GPI4"), Some("s5_gpio0"));
    }
}
