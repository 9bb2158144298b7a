//! Motion sub-dispatch (cursor movement in display rows).
//!
//! Motions move over every display row, instruction rows included, and clamp
//! to the row range. Page motions jump by the viewport height. The viewport
//! follows the cursor through the configured scroll margin.

use super::{DispatchResult, MotionKind};
use crate::SourceView;

pub(crate) fn handle_motion(kind: MotionKind, view: &mut SourceView) -> DispatchResult {
    let rows = view.rows.row_count();
    if rows == 0 {
        return DispatchResult::clean();
    }
    let before = view.view.cursor;
    let page = view.view.viewport.height.max(1) as isize;
    let moved = match kind {
        MotionKind::Up => view.view.move_cursor(-1, rows),
        MotionKind::Down => view.view.move_cursor(1, rows),
        MotionKind::PageUp => view.view.move_cursor(-page, rows),
        MotionKind::PageDown => view.view.move_cursor(page, rows),
        MotionKind::Top => view.view.move_cursor(isize::MIN, rows),
        MotionKind::Bottom => view.view.move_cursor(isize::MAX, rows),
    };
    if !moved {
        return DispatchResult::clean();
    }
    if view.view.auto_scroll(view.settings.scroll_margin) {
        view.repaint.mark_full();
    }
    tracing::trace!(
        target: "actions.dispatch",
        motion = ?kind,
        from = before.row,
        to = view.view.cursor.row,
        "motion"
    );
    DispatchResult::dirty()
}
