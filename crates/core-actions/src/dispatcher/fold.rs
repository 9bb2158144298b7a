//! Expand / collapse handling.
//!
//! Row-addressed actions ignore instruction rows, except `CollapseCursor`
//! which collapses the block the cursor sits in and parks the cursor on the
//! line's source row.

use super::DispatchResult;
use crate::SourceView;

pub(crate) fn expand_row(view: &mut SourceView, row: usize) -> DispatchResult {
    DispatchResult::from_changed(view.expand_row(row))
}

pub(crate) fn collapse_row(view: &mut SourceView, row: usize) -> DispatchResult {
    DispatchResult::from_changed(view.collapse_row(row))
}

pub(crate) fn toggle_row(view: &mut SourceView, row: usize) -> DispatchResult {
    match view.row_to_line(row) {
        Some(pos) if !pos.is_disassembly() => DispatchResult::from_changed(view.toggle(pos.line)),
        _ => DispatchResult::clean(),
    }
}

pub(crate) fn collapse_cursor(view: &mut SourceView) -> DispatchResult {
    let Some(pos) = view.row_to_line(view.cursor().row) else {
        return DispatchResult::clean();
    };
    DispatchResult::from_changed(view.collapse(pos.line))
}
