//! Plain-terminal rendering of display rows.
//!
//! Each row is `<expander><marker> <number> <text>`:
//! * expander: `-` expanded line, `+` collapsed line that can be disassembled,
//!   blank otherwise (always blank on instruction rows)
//! * marker: the strongest marker bit drawn on that row
//! * number: 1-based line number on source rows, address on instruction rows
//!
//! Tabs are expanded to the view's tab width. The current selection is drawn
//! reversed when colour is enabled and bracketed otherwise.

use core_actions::SourceView;
use core_events::MarkerFlags;
use core_highlight::{TokenKind, TokenSpan};
use core_text::grapheme::expand_tabs;
use crossterm::queue;
use crossterm::style::{Attribute, Color, ContentStyle, Print, PrintStyledContent, Stylize};
use std::io::{self, Write};
use std::ops::Range;

pub fn marker_glyph(flags: MarkerFlags) -> char {
    const ORDER: [(MarkerFlags, char); 7] = [
        (MarkerFlags::PC, '>'),
        (MarkerFlags::PC_UP, '^'),
        (MarkerFlags::BP_ORPHAN, 'o'),
        (MarkerFlags::BP_DISABLED, 'b'),
        (MarkerFlags::BP_CONDITIONAL, '?'),
        (MarkerFlags::BP_TEMPORARY, 't'),
        (MarkerFlags::BP, 'B'),
    ];
    ORDER
        .iter()
        .find(|(bit, _)| flags.contains(*bit))
        .map_or(' ', |&(_, glyph)| glyph)
}

fn token_style(kind: TokenKind) -> ContentStyle {
    let style = ContentStyle::new();
    match kind {
        TokenKind::Plain => style,
        TokenKind::Keyword => style.with(Color::Blue).attribute(Attribute::Bold),
        TokenKind::Comment => style.with(Color::DarkGrey),
        TokenKind::String => style.with(Color::Green),
        TokenKind::Preprocessor => style.with(Color::Magenta),
        TokenKind::Disassembly => style.with(Color::Cyan),
    }
}

/// Split spans at the selection edges; the flag marks pieces inside it.
fn pieces(spans: &[TokenSpan], selection: &Range<usize>) -> Vec<(Range<usize>, TokenKind, bool)> {
    let mut out = Vec::new();
    for span in spans {
        let mut cuts = vec![span.range.start, span.range.end];
        for edge in [selection.start, selection.end] {
            if edge > span.range.start && edge < span.range.end {
                cuts.push(edge);
            }
        }
        cuts.sort_unstable();
        for pair in cuts.windows(2) {
            let piece = pair[0]..pair[1];
            let selected = !selection.is_empty() && piece.start >= selection.start && piece.end <= selection.end;
            out.push((piece, span.kind, selected));
        }
    }
    out
}

pub struct RowPrinter {
    pub color: bool,
    number_width: usize,
}

impl RowPrinter {
    pub fn new(view: &SourceView, color: bool) -> Self {
        let widest_line = view.line_count().max(1).to_string().len();
        Self {
            color,
            number_width: widest_line.max(5),
        }
    }

    fn gutter(&self, view: &SourceView, row: usize) -> Option<String> {
        let pos = view.row_to_line(row)?;
        let expander = match pos.disass {
            Some(_) => ' ',
            None if view.is_line_expanded(pos.line) => '-',
            None if view.can_disassemble(pos.line) => '+',
            None => ' ',
        };
        let number = match view.row_address(row) {
            Some(address) => address.to_string(),
            None => (pos.line + 1).to_string(),
        };
        Some(format!(
            "{expander}{} {number:>width$} ",
            marker_glyph(view.row_markers(row)),
            width = self.number_width
        ))
    }

    pub fn write_row<W: Write>(&self, out: &mut W, view: &SourceView, row: usize) -> io::Result<()> {
        let (Some(gutter), Some(text), Some(spans)) =
            (self.gutter(view, row), view.row_text(row), view.highlight_row(row))
        else {
            return Ok(());
        };
        let cursor = view.cursor();
        let selection = if cursor.row == row {
            cursor.selection()
        } else {
            0..0
        };
        let tab_width = view.settings().tab_width;
        let mut col = 0;
        queue!(out, Print(gutter))?;
        for (range, kind, selected) in pieces(&spans, &selection) {
            let chunk = expand_tabs(&text[range], &mut col, tab_width);
            if self.color {
                let mut style = token_style(kind);
                if selected {
                    style = style.attribute(Attribute::Reverse);
                }
                queue!(out, PrintStyledContent(style.apply(chunk)))?;
            } else if selected {
                queue!(out, Print(format!("[{chunk}]")))?;
            } else {
                queue!(out, Print(chunk))?;
            }
        }
        queue!(out, Print("\n"))?;
        Ok(())
    }

    pub fn write_rows<W: Write>(&self, out: &mut W, view: &SourceView, rows: Range<usize>) -> io::Result<()> {
        for row in rows {
            self.write_row(out, view, row)?;
        }
        out.flush()
    }
}
