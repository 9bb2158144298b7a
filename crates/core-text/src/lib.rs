//! Rope-based source text storage plus the pure per-line text helpers used by
//! the source view (grapheme navigation, display width, substring search and
//! expression extraction).
//!
//! The buffer is read-only from the engine's point of view: the file-loading
//! collaborator supplies the whole text, and a reload replaces the buffer.

use anyhow::Result;
use ropey::Rope;

pub mod expr;
pub mod search;
pub mod width;

pub use width::egc_width;

/// A source text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    /// Number of physical source lines. A trailing newline does not open an
    /// extra line and an empty text has no lines at all.
    pub fn line_count(&self) -> usize {
        let chars = self.rope.len_chars();
        if chars == 0 {
            return 0;
        }
        let lines = self.rope.len_lines();
        if self.rope.char(chars - 1) == '\n' {
            lines - 1
        } else {
            lines
        }
    }

    /// Line content without its line terminator (`\n` or `\r\n`).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.line_count() {
            return None;
        }
        let mut s = self.rope.line(idx).to_string();
        if s.ends_with('\n') {
            s.pop();
            if s.ends_with('\r') {
                s.pop();
            }
        }
        Some(s)
    }

    /// Iterate all line contents in order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.line_count()).filter_map(move |i| self.line(i))
    }
}

/// Column mapping over grapheme clusters of a single line.
pub mod grapheme {
    use crate::egc_width;
    use unicode_segmentation::UnicodeSegmentation;

    /// Cells occupied by a cluster starting at visual column `col`. Tabs
    /// advance to the next multiple of `tab_width`.
    fn advance(g: &str, col: usize, tab_width: usize) -> usize {
        if g == "\t" {
            let tw = tab_width.max(1);
            tw - col % tw
        } else {
            egc_width(g) as usize
        }
    }

    /// Visual column (cells) up to (but not including) byte offset.
    pub fn visual_col(line: &str, byte: usize, tab_width: usize) -> usize {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += advance(g, col, tab_width);
        }
        col
    }

    /// Byte offset of the cluster covering visual column `target_col`, or
    /// `None` when the column lies past the end of the line.
    pub fn byte_at_visual_col(line: &str, target_col: usize, tab_width: usize) -> Option<usize> {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            let w = advance(g, col, tab_width).max(1);
            if target_col < col + w {
                return Some(idx);
            }
            col += w;
        }
        None
    }

    /// `text` with tabs replaced by spaces, given the visual column `col`
    /// where it starts. `col` is left at the column after the last cluster.
    pub fn expand_tabs(text: &str, col: &mut usize, tab_width: usize) -> String {
        let mut out = String::with_capacity(text.len());
        for g in text.graphemes(true) {
            let w = advance(g, *col, tab_width);
            if g == "\t" {
                out.extend(std::iter::repeat_n(' ', w));
            } else {
                out.push_str(g);
            }
            *col += w;
        }
        out
    }
}
