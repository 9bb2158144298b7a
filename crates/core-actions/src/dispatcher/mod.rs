//! Dispatcher applying `Action` to a `SourceView`.
//!
//! The presentation layer translates keyboard, mouse and menu input into
//! `Action` values; `dispatch` applies one action and reports whether a redraw
//! is needed. Sub-modules:
//! * `motion` - cursor movement in display rows
//! * `fold`   - expand / collapse / toggle addressed by row or cursor
//!
//! Notifications produced while handling an action (expanded / collapsed
//! lines, disassembly requests, clicks) stay queued in the view until
//! `SourceView::flush_notifications`.

use crate::{GutterColumn, SourceView};
use core_events::{Address, ClickButton};
use core_model::PixelPoint;
use core_text::search::FindDirection;

mod fold;
mod motion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ExpandRow(usize),
    CollapseRow(usize),
    ToggleRow(usize),
    ExpandCursor,
    CollapseCursor,
    Motion(MotionKind),
    Find {
        needle: String,
        case_sensitive: bool,
        direction: FindDirection,
    },
    ClickGutter {
        row: usize,
        column: GutterColumn,
        button: ClickButton,
    },
    ClickText {
        point: PixelPoint,
        button: ClickButton,
    },
    ScrollTo {
        line: usize,
        address: Option<Address>,
    },
}

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    pub dirty: bool,
    /// For `Find`: whether a match was selected.
    pub found: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            found: false,
        }
    }
    pub fn clean() -> Self {
        Self {
            dirty: false,
            found: false,
        }
    }
    pub fn found() -> Self {
        Self {
            dirty: true,
            found: true,
        }
    }
    fn from_changed(changed: bool) -> Self {
        if changed { Self::dirty() } else { Self::clean() }
    }
}

/// Apply an action to the view.
pub fn dispatch(view: &mut SourceView, action: Action) -> DispatchResult {
    tracing::trace!(target: "actions.dispatch", ?action, "dispatch");
    match action {
        Action::ExpandRow(row) => fold::expand_row(view, row),
        Action::CollapseRow(row) => fold::collapse_row(view, row),
        Action::ToggleRow(row) => fold::toggle_row(view, row),
        Action::ExpandCursor => {
            let row = view.cursor().row;
            fold::expand_row(view, row)
        }
        Action::CollapseCursor => fold::collapse_cursor(view),
        Action::Motion(kind) => motion::handle_motion(kind, view),
        Action::Find {
            needle,
            case_sensitive,
            direction,
        } => match view.find(&needle, case_sensitive, direction) {
            Some(_) => DispatchResult::found(),
            None => DispatchResult::clean(),
        },
        Action::ClickGutter {
            row,
            column,
            button,
        } => DispatchResult::from_changed(view.click_gutter(row, column, button)),
        Action::ClickText { point, button } => {
            DispatchResult::from_changed(view.click_text(point, button).is_some())
        }
        Action::ScrollTo { line, address } => {
            DispatchResult::from_changed(view.scroll_to(line, address))
        }
    }
}
