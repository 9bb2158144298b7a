//! Repaint bookkeeping for the presentation layer.
//!
//! The engine records logical lines whose appearance changed (marker updates,
//! re-highlighting, a line's block being replaced). Structural changes that
//! move rows (expand, collapse, reload) request a full repaint instead.
//!
//! Invariants:
//! * The list returned by `take_lines_in` is sorted ascending and unique.
//! * Taking clears all pending state, including the full-repaint flag.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repaint {
    Full,
    Lines(Vec<usize>),
}

#[derive(Debug, Default)]
pub struct RepaintTracker {
    lines: Vec<usize>,
    full: bool,
}

impl RepaintTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, line: usize) {
        self.lines.push(line);
    }

    pub fn mark_all<I: IntoIterator<Item = usize>>(&mut self, lines: I) {
        self.lines.extend(lines);
    }

    pub fn mark_full(&mut self) {
        self.full = true;
    }

    pub fn is_empty(&self) -> bool {
        !self.full && self.lines.is_empty()
    }

    /// Consume pending work restricted to the visible `lines`.
    pub fn take_lines_in(&mut self, visible: Range<usize>) -> Repaint {
        if std::mem::take(&mut self.full) {
            self.lines.clear();
            return Repaint::Full;
        }
        let mut v: Vec<usize> = self
            .lines
            .drain(..)
            .filter(|l| visible.contains(l))
            .collect();
        v.sort_unstable();
        v.dedup();
        Repaint::Lines(v)
    }
}
