#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{SourceView, ViewSettings};
use core_events::DisassembledInsn;

pub const FILE: &str = "/work/src/prog.c";

pub fn numbered_source(lines: usize) -> String {
    (0..lines).map(|i| format!("int v{i} = {i};\n")).collect()
}

pub fn view(text: &str) -> SourceView {
    SourceView::new(FILE, text, ViewSettings::default()).unwrap()
}

pub fn view_with_height(text: &str, height: usize) -> SourceView {
    let settings = ViewSettings {
        height,
        ..ViewSettings::default()
    };
    SourceView::new(FILE, text, settings).unwrap()
}

pub fn block(addrs: &[u64]) -> Vec<DisassembledInsn> {
    addrs
        .iter()
        .map(|&a| DisassembledInsn::new(format!("insn_{a:x}"), a))
        .collect()
}

/// Expand `line` through the request/delivery round trip.
pub fn expand_with(view: &mut SourceView, line: usize, addrs: &[u64]) {
    view.expand(line);
    view.disassembled(line, block(addrs));
}
