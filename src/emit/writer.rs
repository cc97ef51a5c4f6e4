//! Small pretty-printer for DTS node indentation.
//!
//! The emitter is split into a model stage (resolve everything a node
//! needs) and a render stage (write it out correctly indented).
//! `DtsWriter` is the render half: callers push fully-resolved strings,
//! it only owns indentation and brace bookkeeping.

use std::fmt::Write as _;

pub struct DtsWriter {
    buf: String,
    depth: usize,
}

impl DtsWriter {
    pub fn new() -> Self {
        DtsWriter {
            buf: String::new(),
            depth: 0,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push('\t');
        }
    }

    /// Emit a raw line (e.g. a comment or preprocessor directive) at the
    /// current indentation.
    pub fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        self.indent();
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn raw(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Open `label: name {` (or just `name {` when `label` is `None`)
    /// and increase indentation for the body.
    pub fn open_node(&mut self, label: Option<&str>, name: &str) {
        self.indent();
        if let Some(label) = label {
            let _ = write!(self.buf, "{label}: {name} {{\n");
        } else {
            let _ = write!(self.buf, "{name} {{\n");
        }
        self.depth += 1;
    }

    /// Close the current node, decreasing indentation.
    pub fn close_node(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.buf.push_str("};\n");
    }

    pub fn prop(&mut self, text: &str) {
        self.indent();
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn prop_flag(&mut self, name: &str) {
        self.prop(&format!("{name};"));
    }

    pub fn prop_str(&mut self, name: &str, value: &str) {
        self.prop(&format!("{name} = \"{value}\";"));
    }

    pub fn prop_str_list(&mut self, name: &str, values: &[&str]) {
        let joined = values
            .iter()
            .map(|v| format!("\"{v}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.prop(&format!("{name} = {joined};"));
    }

    pub fn prop_u32(&mut self, name: &str, value: u32) {
        self.prop(&format!("{name} = <{value}>;"));
    }

    pub fn prop_cells(&mut self, name: &str, cells: &str) {
        self.prop(&format!("{name} = <{cells}>;"));
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for DtsWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a `ResourceWindow` as the 4-cell `<hi_base lo_base hi_len lo_len>`
/// tuple, with hi cells zeroed.
pub fn reg_cells(base: u32, length: u32) -> String {
    format!("0x0 0x{base:x} 0x0 0x{length:x}")
}

/// Render the symbolic GIC SPI interrupt cell.
pub fn spi_cells(spi: u32) -> String {
    format!("GIC_SPI {spi} IRQ_TYPE_LEVEL_HIGH")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_close_node_indents_body() {
        let mut w = DtsWriter::new();
        w.open_node(Some("i2c0"), "i2c@04010000");
        w.prop_str("compatible", "cdns,i2c-r1p14");
        w.close_node();
        let out = w.finish();
        assert_eq!(
            out,
            "i2c0: i2c@04010000 {\n\tcompatible = \"cdns,i2c-r1p14\";\n};\n"
        );
    }

    #[test]
    fn reg_cells_zero_extends_to_64_bits() {
        assert_eq!(reg_cells(0x04010000, 0x10000), "0x0 0x4010000 0x0 0x10000");
    }
}
