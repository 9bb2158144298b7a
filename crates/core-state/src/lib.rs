//! Per-line debugger state of one source view.
//!
//! * `LineStore` owns one `SourceLine` per logical source line: the
//!   disassembly block delivered by the debugger (possibly empty), whether the
//!   line can map to machine code at all, and whether an expansion is waiting
//!   for disassembly.
//! * `MarkerSet` owns the marker bitmask of every line plus the instruction
//!   addresses the PC / breakpoint markers refer to, so a marker can be drawn on
//!   the exact disassembly row while a line is expanded.
//!
//! Neither type knows about display rows; the row index in `core-model`
//! consumes the block lengths stored here.
//!
//! Invariants:
//! * `LineStore::len()` and `MarkerSet::len()` equal the logical line count of
//!   the current text; both are rebuilt wholesale on reload.
//! * A line with `can_disass == false` never has `expand_pending` set.
//! * Out-of-range line numbers are ignored by every mutator and report
//!   "nothing" from every query.

mod lines;
mod markers;

pub use lines::{DeliveryOutcome, LineStore, SourceLine};
pub use markers::{MarkerEntry, MarkerSet};
