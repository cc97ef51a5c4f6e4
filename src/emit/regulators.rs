//! Fixed-voltage regulator emission.

use crate::emit::writer::DtsWriter;
use crate::sidecar::FixedRegulator;

pub fn emit_regulators(w: &mut DtsWriter, regulators: &[FixedRegulator]) {
    for regulator in regulators {
        w.open_node(
            Some(&regulator.name),
            &format!("regulator-{}", regulator.name),
        );
        w.prop_str("compatible", "regulator-fixed");
        w.prop_str("regulator-name", &regulator.name);
        w.prop_u32("regulator-min-microvolt", regulator.microvolts);
        w.prop_u32("regulator-max-microvolt", regulator.microvolts);
        if regulator.always_on {
            w.prop_flag("regulator-always-on");
        }
        w.close_node();
    }
}
