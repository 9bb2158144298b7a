//! Pointer hit testing: the expression under a pixel and gutter/text clicks.

use crate::SourceView;
use core_events::{Address, ClickButton, SourceNotification};
use core_model::{PixelPoint, PixelRect};
use core_text::{expr, grapheme};
use std::ops::Range;

/// Gutter column hit by a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GutterColumn {
    /// The `+`/`-` column that expands or collapses a line.
    Expander,
    /// The marker column (breakpoints, PC).
    Markers,
}

/// Expression found under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAtPoint {
    pub text: String,
    pub row: usize,
    /// Byte range of the expression inside the row text.
    pub range: Range<usize>,
    pub line: usize,
    /// Instruction address when the row is a disassembly row.
    pub address: Option<Address>,
    /// Bounding rectangle relative to the text area.
    pub rect: PixelRect,
}

impl SourceView {
    /// The expression under `point`, extended across member access and index
    /// groups. Points past the end of a row or on non-identifier characters
    /// yield nothing.
    pub fn word_at_point(&self, point: PixelPoint) -> Option<WordAtPoint> {
        let first_row = self.view.viewport.first_row;
        let tab_width = self.settings.tab_width;
        let (row, col) = self.settings.metrics.cell_at(point, first_row)?;
        let text = self.row_text(row)?;
        let byte = grapheme::byte_at_visual_col(&text, col, tab_width)?;
        let word = expr::word_bounds(&text, byte)?;
        let range = expr::extend_expr_with_limit(&text, word, self.settings.max_lookbehind);
        let cols = grapheme::visual_col(&text, range.start, tab_width)
            ..grapheme::visual_col(&text, range.end, tab_width);
        let pos = self.rows.row_to_line(row)?;
        Some(WordAtPoint {
            text: text[range.clone()].to_string(),
            row,
            range,
            line: pos.line,
            address: self.row_address(row),
            rect: self.settings.metrics.rect_for(row, first_row, cols),
        })
    }

    /// Click in the gutter of `row`. The expander column toggles the row's
    /// line (source rows only); the marker column reports the click so the
    /// debugger can toggle a breakpoint at the line or instruction.
    pub fn click_gutter(&mut self, row: usize, column: GutterColumn, button: ClickButton) -> bool {
        let Some(pos) = self.rows.row_to_line(row) else {
            return false;
        };
        match column {
            GutterColumn::Expander => {
                if pos.is_disassembly() {
                    return false;
                }
                self.toggle(pos.line)
            }
            GutterColumn::Markers => {
                let address = self.row_address(row);
                tracing::debug!(target: "srcview.markers", line = pos.line, ?address, ?button, "gutter_clicked");
                self.outbox.push(SourceNotification::Clicked {
                    expression: None,
                    line: pos.line,
                    address,
                    button,
                });
                true
            }
        }
    }

    /// Click on the text: reports the expression under the pointer.
    pub fn click_text(&mut self, point: PixelPoint, button: ClickButton) -> Option<WordAtPoint> {
        let word = self.word_at_point(point)?;
        self.view.cursor.select(word.row, word.range.clone());
        self.outbox.push(SourceNotification::Clicked {
            expression: Some(word.text.clone()),
            line: word.line,
            address: word.address,
            button,
        });
        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ViewSettings;

    fn view(text: &str) -> SourceView {
        SourceView::new("t.c", text, ViewSettings::default()).unwrap()
    }

    #[test]
    fn word_under_point_with_tab() {
        let v = view("\tp->next = 0;\n");
        // Tab covers columns 0..8; `next` starts at column 11.
        let w = v.word_at_point(PixelPoint::new(12 * 8 + 3, 5)).unwrap();
        assert_eq!(w.text, "p->next");
        assert_eq!(w.range, 1..8);
        assert_eq!(w.rect, PixelRect { x: 64, y: 0, width: 56, height: 16 });
        assert_eq!(w.line, 0);
        assert_eq!(w.address, None);
    }

    #[test]
    fn nothing_past_end_or_on_operator() {
        let v = view("a = b;\n");
        assert!(v.word_at_point(PixelPoint::new(8 * 10, 0)).is_none());
        assert!(v.word_at_point(PixelPoint::new(8 * 2, 0)).is_none());
        assert!(v.word_at_point(PixelPoint::new(0, 16 * 5)).is_none());
    }
}
