//! Cursor and viewport, both addressed in display rows.
//!
//! Expanding or collapsing a line shifts every row after its base row, so both
//! the cursor row and the first visible row are remapped through the
//! `BlockChange` produced by the row index. The cursor keeps showing the same
//! logical line; when it sat on an instruction row that disappears it falls
//! back to the line's source row.

use crate::rows::BlockChange;
use std::ops::Range;

/// Cursor row plus a selection inside that row's text (`anchor..byte`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub anchor: usize,
    pub byte: usize,
}

impl Cursor {
    pub fn at_row(row: usize) -> Self {
        Self {
            row,
            anchor: 0,
            byte: 0,
        }
    }

    pub fn selection(&self) -> Range<usize> {
        self.anchor.min(self.byte)..self.anchor.max(self.byte)
    }

    pub fn select(&mut self, row: usize, range: Range<usize>) {
        self.row = row;
        self.anchor = range.start;
        self.byte = range.end;
    }

    pub fn clear_selection(&mut self) {
        self.anchor = 0;
        self.byte = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub first_row: usize,
    pub height: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            first_row: 0,
            height: 1,
        }
    }
}

impl Viewport {
    pub fn new(first_row: usize, height: usize) -> Self {
        Self { first_row, height }
    }

    pub fn rows(&self) -> Range<usize> {
        self.first_row..self.first_row + self.height
    }
}

/// Compute the first visible row that keeps `cursor_row` inside the viewport
/// with `margin` rows of context (clamped to half the height).
///
/// Returns `None` when no scroll is needed.
pub fn compute_scroll_intent(
    first: usize,
    cursor_row: usize,
    height: usize,
    margin: usize,
) -> Option<usize> {
    if height == 0 {
        return None;
    }
    let m = margin.min(height / 2);
    let bottom = first + height;
    if cursor_row < first + m {
        let new_first = cursor_row.saturating_sub(m);
        if new_first != first {
            return Some(new_first);
        }
    } else if cursor_row + m >= bottom {
        let new_first = cursor_row + m + 1 - height;
        if new_first != first {
            return Some(new_first);
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct View {
    pub cursor: Cursor,
    pub viewport: Viewport,
}

impl View {
    pub fn new(height: usize) -> Self {
        Self {
            cursor: Cursor::default(),
            viewport: Viewport::new(0, height.max(1)),
        }
    }

    /// Follow a block change in the row index.
    pub fn remap(&mut self, change: &BlockChange) {
        if change.touches_block(self.cursor.row) {
            self.cursor.clear_selection();
        }
        self.cursor.row = change.remap_row(self.cursor.row);
        self.viewport.first_row = change.remap_row(self.viewport.first_row);
    }

    /// Keep cursor and viewport inside `row_count` rows.
    pub fn clamp(&mut self, row_count: usize) {
        let last = row_count.saturating_sub(1);
        if self.cursor.row > last {
            self.cursor = Cursor::at_row(last);
        }
        let max_first = row_count.saturating_sub(self.viewport.height);
        self.viewport.first_row = self.viewport.first_row.min(max_first);
    }

    /// Scroll so the cursor is visible. Returns true if the viewport moved.
    pub fn auto_scroll(&mut self, margin: usize) -> bool {
        match compute_scroll_intent(
            self.viewport.first_row,
            self.cursor.row,
            self.viewport.height,
            margin,
        ) {
            Some(first) => {
                self.viewport.first_row = first;
                true
            }
            None => false,
        }
    }

    /// Move the cursor by `delta` rows, clamped to `row_count`.
    pub fn move_cursor(&mut self, delta: isize, row_count: usize) -> bool {
        if row_count == 0 {
            return false;
        }
        let target = self
            .cursor
            .row
            .saturating_add_signed(delta)
            .min(row_count - 1);
        if target == self.cursor.row {
            return false;
        }
        self.cursor = Cursor::at_row(target);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_intent_noop_inside_band() {
        assert_eq!(compute_scroll_intent(0, 5, 10, 2), None);
    }

    #[test]
    fn scroll_intent_up_and_down() {
        assert_eq!(compute_scroll_intent(10, 11, 6, 2), Some(9));
        assert_eq!(compute_scroll_intent(10, 9, 6, 0), Some(9));
        assert_eq!(compute_scroll_intent(0, 4, 5, 1), Some(1));
        assert_eq!(compute_scroll_intent(0, 5, 5, 0), Some(1));
        assert_eq!(compute_scroll_intent(0, 2, 4, 10), Some(1));
    }

    #[test]
    fn remap_after_expand_keeps_line_under_cursor() {
        let mut v = View::new(5);
        v.cursor.select(7, 1..3);
        v.viewport.first_row = 4;
        v.remap(&BlockChange { line: 2, base: 2, old_len: 0, new_len: 4 });
        assert_eq!(v.cursor.row, 11);
        assert_eq!(v.cursor.selection(), 1..3);
        assert_eq!(v.viewport.first_row, 8);
    }

    #[test]
    fn remap_after_collapse_from_instruction_row() {
        let mut v = View::new(5);
        v.cursor.select(4, 0..2);
        v.remap(&BlockChange { line: 2, base: 2, old_len: 4, new_len: 0 });
        assert_eq!(v.cursor, Cursor::at_row(2));
    }

    #[test]
    fn move_and_clamp() {
        let mut v = View::new(3);
        assert!(v.move_cursor(10, 5));
        assert_eq!(v.cursor.row, 4);
        assert!(v.move_cursor(-100, 5));
        assert_eq!(v.cursor.row, 0);
        assert!(!v.move_cursor(-1, 5));
        v.cursor.row = 9;
        v.viewport.first_row = 8;
        v.clamp(5);
        assert_eq!(v.cursor.row, 4);
        assert_eq!(v.viewport.first_row, 2);
    }
}
