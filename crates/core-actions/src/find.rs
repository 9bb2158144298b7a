//! Text search across display rows.

use crate::SourceView;
use core_text::search::{FindDirection, SearchHit, find_wrapping};

impl SourceView {
    /// Find `needle` starting just after (forward) or before (backward) the
    /// current selection, wrapping around the file once. On success the match
    /// becomes the selection and is scrolled into view; on failure the cursor
    /// is left untouched.
    pub fn find(&mut self, needle: &str, case_sensitive: bool, direction: FindDirection) -> Option<SearchHit> {
        let cursor = self.view.cursor;
        let selection = cursor.selection();
        let from = match direction {
            FindDirection::Forward => selection.end,
            FindDirection::Backward => selection.start,
        };
        let hit = find_wrapping(
            self.rows.row_count(),
            |row| self.row_text(row),
            cursor.row,
            from,
            needle,
            case_sensitive,
            direction,
        );
        match &hit {
            Some(h) => {
                tracing::debug!(
                    target: "srcview.search",
                    row = h.row,
                    start = h.range.start,
                    end = h.range.end,
                    ?direction,
                    "found"
                );
                self.view.cursor.select(h.row, h.range.clone());
                if self.view.auto_scroll(self.settings.scroll_margin) {
                    self.repaint.mark_full();
                }
            }
            None => {
                tracing::debug!(target: "srcview.search", needle, ?direction, "not_found");
            }
        }
        hit
    }

    /// `find` using the configured case sensitivity.
    pub fn find_default(&mut self, needle: &str, direction: FindDirection) -> Option<SearchHit> {
        self.find(needle, self.settings.case_sensitive, direction)
    }
}
