//! Typed device model recovered from the disassembled ACPI text.
//!
//! A `Device` is built up field-by-field while the device walker consumes
//! a single `Device(...)` block, then frozen (moved, never mutated again)
//! once parsing hands it to the symbol mapper and emitter.

use std::collections::BTreeMap;

/// A firmware-declared memory-mapped register window: `(base, length)`.
///
/// Always rendered by the emitter as a 4-cell DTS tuple with the high
/// cells zeroed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceWindow {
    pub base: u32,
    pub length: u32,
}

/// A firmware-absolute interrupt number, not yet translated to an SPI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptRef(pub u32);

/// A pin-multiplexing reference, e.g. a GPIO bank and pin index pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GpioRef {
    pub controller: String,
    pub pin: u32,
}

/// A `CLKT` clock-table entry: a clock id paired with an optional name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockRef {
    pub clock_id: u32,
    pub clock_name: Option<String>,
}

/// An `RSTL` reset-table entry: a controller symbol, reset id, and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetRef {
    pub controller: String,
    pub reset_id: u32,
    pub reset_name: Option<String>,
}

/// A value recovered from a `_DSD` key/value pair.
///
/// A bare property name with no subsequent value is stored as `Flag(true)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    Int(i64),
    Str(String),
    Flag(bool),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// A parsed hardware declaration: one `Device(...)` block.
///
/// `hardware_id` is non-empty and, unless explicitly exempted, does not
/// match the plug-and-play reserved form (`PNP*`) — that filtering
/// happens where top-level devices are finalized, not here, so the type
/// itself carries no such guarantee. `unique_id` defaults to `0` when
/// unparseable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    /// Short identifier from the `Device(<ID>)` line, e.g. `I2C0`.
    pub name: String,
    pub hardware_id: String,
    pub unique_id: u32,
    pub resource_window: Option<ResourceWindow>,
    pub interrupt: Option<InterruptRef>,
    /// Additional `Memory32Fixed` windows beyond the first; kept only as
    /// a count, never emitted as extra `reg` cells.
    pub extra_windows_seen: u32,
    pub pin_groups: Vec<String>,
    pub gpios: Vec<GpioRef>,
    pub clock: Option<ClockRef>,
    pub reset: Option<ResetRef>,
    pub properties: BTreeMap<String, PropertyValue>,
    pub children: Vec<Device>,
    /// `_ADR` value, populated only for child devices.
    pub adr: Option<u64>,
}

impl Device {
    pub fn new(name: String) -> Self {
        Device {
            name,
            hardware_id: String::new(),
            unique_id: 0,
            resource_window: None,
            interrupt: None,
            extra_windows_seen: 0,
            pin_groups: Vec::new(),
            gpios: Vec::new(),
            clock: None,
            reset: None,
            properties: BTreeMap::new(),
            children: Vec::new(),
            adr: None,
        }
    }

    /// Deduplication key: `(hardware_id, unique_id)`.
    pub fn dedup_key(&self) -> (String, u32) {
        (self.hardware_id.clone(), self.unique_id)
    }

    pub fn compatible_property(&self) -> Option<&str> {
        self.properties.get("compatible").and_then(|v| v.as_str())
    }
}

/// One of a small closed set of board variants, discovered by a substring
/// test on the identification summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardIdentity {
    Baseline,
    NVariant,
}

impl BoardIdentity {
    pub fn model(&self) -> &'static str {
        match self {
            BoardIdentity::Baseline => "Sky1 Reference Platform",
            BoardIdentity::NVariant => "Sky1 O6N (CD8160) Platform",
        }
    }

    pub fn compatible(&self) -> &'static [&'static str] {
        match self {
            BoardIdentity::Baseline => &["cix,sky1", "cix,sky1-evb"],
            BoardIdentity::NVariant => &["cix,sky1-o6n", "cix,sky1"],
        }
    }
}
