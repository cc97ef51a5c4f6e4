//! Resolved board-wide state handed to the emitter: the per-device list
//! along with the sidecar-derived tables (i2c probes, regulators) and
//! board identity, gathered into one record once parsing finishes so the
//! emitter never has to reach back into the extraction directory itself.

use crate::model::{BoardIdentity, Device};
use crate::sidecar::{FixedRegulator, I2cProbe};

pub struct BoardContext {
    pub identity: BoardIdentity,
    pub core_count: u32,
    pub boot_mode_is_acpi: bool,
    pub devices: Vec<Device>,
    pub i2c_probes: Vec<I2cProbe>,
    pub regulators: Vec<FixedRegulator>,
    pub dropped_by_pnp_filter: u32,
}
