//! DTS emission: header, CPU cluster, interrupt controller, clock/reset
//! controllers, regulators, board auxiliaries, and the `soc@0` device
//! container, in that fixed order.

pub mod aux;
pub mod clkrst;
pub mod context;
pub mod header;
pub mod regulators;
pub mod soc;
pub mod writer;

use context::BoardContext;
use writer::DtsWriter;

pub fn generate(ctx: &BoardContext) -> String {
    let mut w = DtsWriter::new();

    header::emit_preamble(&mut w, ctx);
    clkrst::emit_clock_controller(&mut w, &ctx.devices);
    clkrst::emit_reset_controllers(&mut w, &ctx.devices);
    regulators::emit_regulators(&mut w, &ctx.regulators);
    aux::emit_gpio_keys(&mut w, &ctx.devices);
    aux::emit_gpio_leds(&mut w, &ctx.devices);
    soc::emit_soc(&mut w, &ctx.devices, &ctx.i2c_probes);

    w.close_node(); // closes the root node opened by `header::emit_preamble`
    w.finish()
}
