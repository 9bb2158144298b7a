//! Display-row model of a source view.
//!
//! A source view shows one row per logical line, plus one row per
//! disassembled instruction under every expanded line. This crate owns the
//! pieces that live in display-row coordinates:
//!
//! * `RowIndex`: the line <-> row translation and expansion bookkeeping.
//! * `View`: cursor and viewport, remapped whenever rows shift.
//! * `CellMetrics`: pixel <-> cell conversion for hit testing.
//! * `RepaintTracker`: what the presentation layer must redraw.
//!
//! Nothing here knows about text, markers or disassembly content; the engine
//! in `core-actions` feeds block lengths and instruction offsets in.

mod geometry;
mod repaint;
mod rows;
mod view;

pub use geometry::{CellMetrics, PixelPoint, PixelRect};
pub use repaint::{Repaint, RepaintTracker};
pub use rows::{BlockChange, RowIndex, RowPos};
pub use view::{Cursor, View, Viewport, compute_scroll_intent};
