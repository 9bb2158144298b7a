//! Bidirectional mapping between logical source lines and display rows.
//!
//! Every logical line occupies a contiguous run of display rows: one row for
//! the source text, followed by one row per disassembled instruction while the
//! line is expanded. The index stores the first row of every line as a prefix
//! sum (`starts`, length `lines + 1`, last element = total row count), so
//!
//! * line -> row is a direct lookup,
//! * row -> line is a binary search over `starts`,
//! * changing one block's length shifts the tail of `starts` by the delta.
//!
//! Invariants:
//! * `starts[0] == 0` and `starts` is strictly increasing (every run >= 1).
//! * `starts.len() == line_count() + 1`.
//! * `row_to_line(line_to_row(l)) == (l, None)` for every line `l`.

use std::ops::Range;

/// Position of a display row in logical terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowPos {
    pub line: usize,
    /// Index into the line's disassembly block; `None` for the source row.
    pub disass: Option<usize>,
}

impl RowPos {
    pub fn is_disassembly(&self) -> bool {
        self.disass.is_some()
    }
}

/// Result of changing the block length of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChange {
    pub line: usize,
    /// Row showing the line's source text.
    pub base: usize,
    pub old_len: usize,
    pub new_len: usize,
}

impl BlockChange {
    /// Where `row` ends up after this change. Rows inside a shrunk part of the
    /// block fall back to the base row; rows after the block shift by the delta.
    pub fn remap_row(&self, row: usize) -> usize {
        if row <= self.base {
            return row;
        }
        let offset = row - self.base;
        if offset <= self.old_len {
            return if offset <= self.new_len { row } else { self.base };
        }
        row + self.new_len - self.old_len
    }

    /// True if `row` was one of the instruction rows replaced by this change.
    pub fn touches_block(&self, row: usize) -> bool {
        row > self.base && row <= self.base + self.old_len
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIndex {
    starts: Vec<usize>,
}

impl Default for RowIndex {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RowIndex {
    /// Index for `line_count` collapsed lines.
    pub fn new(line_count: usize) -> Self {
        Self {
            starts: (0..=line_count).collect(),
        }
    }

    /// Collapse everything and resize to `line_count` lines.
    pub fn rebuild(&mut self, line_count: usize) {
        self.starts.clear();
        self.starts.extend(0..=line_count);
        tracing::debug!(target: "srcview.rows", lines = line_count, "rebuild");
    }

    pub fn line_count(&self) -> usize {
        self.starts.len() - 1
    }

    pub fn row_count(&self) -> usize {
        self.starts.last().copied().unwrap_or(0)
    }

    /// Rows occupied by `line` (1 when collapsed, 0 when out of range).
    pub fn run_length(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        self.starts[line + 1] - self.starts[line]
    }

    pub fn is_line_expanded(&self, line: usize) -> bool {
        self.run_length(line) > 1
    }

    /// First display row of `line`.
    pub fn line_to_row(&self, line: usize) -> Option<usize> {
        (line < self.line_count()).then(|| self.starts[line])
    }

    /// Row of instruction `offset` of `line` if that row is shown, else the
    /// line's base row.
    pub fn line_to_row_at(&self, line: usize, offset: Option<usize>) -> Option<usize> {
        let base = self.line_to_row(line)?;
        match offset {
            Some(o) if o + 1 < self.run_length(line) => Some(base + 1 + o),
            _ => Some(base),
        }
    }

    pub fn row_to_line(&self, row: usize) -> Option<RowPos> {
        if row >= self.row_count() {
            return None;
        }
        let line = self.starts.partition_point(|&s| s <= row) - 1;
        let offset = row - self.starts[line];
        Some(RowPos {
            line,
            disass: offset.checked_sub(1),
        })
    }

    /// True if `row` belongs to an expanded line (its source row or any of
    /// its instruction rows).
    pub fn is_row_expanded(&self, row: usize) -> bool {
        self.row_to_line(row)
            .is_some_and(|p| self.is_line_expanded(p.line))
    }

    pub fn is_row_disassembly_row(&self, row: usize) -> bool {
        self.row_to_line(row).is_some_and(|p| p.is_disassembly())
    }

    /// Lines with at least one row inside `rows`.
    pub fn lines_in_rows(&self, rows: Range<usize>) -> Range<usize> {
        let end = rows.end.min(self.row_count());
        if rows.start >= end {
            return 0..0;
        }
        let first = self.row_to_line(rows.start).map_or(0, |p| p.line);
        let last = self.row_to_line(end - 1).map_or(first, |p| p.line);
        first..last + 1
    }

    /// The literal row sequence: entry `r` is the line shown at row `r`.
    pub fn rows(&self) -> Vec<usize> {
        (0..self.line_count())
            .flat_map(|line| std::iter::repeat_n(line, self.run_length(line)))
            .collect()
    }

    /// Make `line` occupy `1 + block_len` rows.
    /// Returns `None` for out-of-range lines or when nothing changes.
    pub fn set_block_len(&mut self, line: usize, block_len: usize) -> Option<BlockChange> {
        let old_len = self.run_length(line).checked_sub(1)?;
        if old_len == block_len {
            return None;
        }
        let base = self.starts[line];
        for s in &mut self.starts[line + 1..] {
            *s = *s + block_len - old_len;
        }
        tracing::trace!(target: "srcview.rows", line, base, old_len, new_len = block_len, "set_block_len");
        Some(BlockChange {
            line,
            base,
            old_len,
            new_len: block_len,
        })
    }

    /// Insert `block_len` rows after the base row of a collapsed line.
    pub fn expand(&mut self, line: usize, block_len: usize) -> Option<BlockChange> {
        if self.is_line_expanded(line) {
            return None;
        }
        self.set_block_len(line, block_len)
    }

    /// Remove the block rows of an expanded line.
    pub fn collapse(&mut self, line: usize) -> Option<BlockChange> {
        if !self.is_line_expanded(line) {
            return None;
        }
        self.set_block_len(line, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collapsed_identity() {
        let idx = RowIndex::new(4);
        assert_eq!(idx.rows(), vec![0, 1, 2, 3]);
        assert_eq!(idx.row_to_line(2), Some(RowPos { line: 2, disass: None }));
        assert_eq!(idx.row_to_line(4), None);
        assert_eq!(idx.line_to_row(4), None);
    }

    #[test]
    fn expand_shifts_following_rows() {
        let mut idx = RowIndex::new(8);
        let change = idx.expand(5, 3).unwrap();
        assert_eq!(change.base, 5);
        assert_eq!(idx.rows(), vec![0, 1, 2, 3, 4, 5, 5, 5, 5, 6, 7]);
        assert_eq!(idx.line_to_row(6), Some(9));
        assert_eq!(idx.row_to_line(7), Some(RowPos { line: 5, disass: Some(1) }));
        assert!(idx.is_row_expanded(5));
        assert!(idx.is_row_expanded(8));
        assert!(!idx.is_row_expanded(9));
        assert!(idx.is_row_disassembly_row(6));
        assert!(!idx.is_row_disassembly_row(5));
    }

    #[test]
    fn line_to_row_at_offsets() {
        let mut idx = RowIndex::new(8);
        assert_eq!(idx.line_to_row_at(5, Some(1)), Some(5));
        idx.expand(5, 3);
        assert_eq!(idx.line_to_row_at(5, Some(1)), Some(7));
        assert_eq!(idx.line_to_row_at(5, Some(3)), Some(5));
        assert_eq!(idx.line_to_row_at(5, None), Some(5));
    }

    #[test]
    fn expand_collapse_idempotent_and_restoring() {
        let mut idx = RowIndex::new(3);
        let before = idx.rows();
        assert!(idx.collapse(1).is_none());
        idx.expand(1, 2);
        assert!(idx.expand(1, 5).is_none());
        let change = idx.collapse(1).unwrap();
        assert_eq!((change.old_len, change.new_len), (2, 0));
        assert_eq!(idx.rows(), before);
        assert!(idx.expand(1, 0).is_none());
    }

    #[test]
    fn block_change_remap() {
        let grow = BlockChange { line: 2, base: 2, old_len: 0, new_len: 3 };
        assert_eq!(grow.remap_row(1), 1);
        assert_eq!(grow.remap_row(2), 2);
        assert_eq!(grow.remap_row(3), 6);
        let shrink = BlockChange { line: 2, base: 2, old_len: 3, new_len: 1 };
        assert_eq!(shrink.remap_row(3), 3);
        assert_eq!(shrink.remap_row(4), 2);
        assert_eq!(shrink.remap_row(6), 4);
    }

    #[test]
    fn lines_in_rows_covers_partial_blocks() {
        let mut idx = RowIndex::new(5);
        idx.expand(1, 4);
        assert_eq!(idx.lines_in_rows(3..7), 1..3);
        assert_eq!(idx.lines_in_rows(0..100), 0..5);
        assert_eq!(idx.lines_in_rows(50..60), 0..0);
    }
}
