//! Marker overlay operations of `SourceView`.
//!
//! Masks are stored per logical line. While a line is expanded, PC and
//! breakpoint bits whose address resolves inside the block are drawn on the
//! instruction row instead of the source row; unresolvable addresses keep the
//! marker on the source row.

use crate::SourceView;
use core_events::{Address, BreakpointInfo, MarkerFlags};

impl SourceView {
    /// Replace the mask of one line.
    pub fn update_markers(&mut self, line: usize, flags: MarkerFlags) -> bool {
        let changed = self.markers.update(line, flags);
        if changed {
            self.repaint.mark(line);
        }
        changed
    }

    /// Replace every mask; lines missing from `snapshot` are cleared.
    pub fn apply_marker_snapshot<I>(&mut self, snapshot: I) -> Vec<usize>
    where
        I: IntoIterator<Item = (usize, MarkerFlags)>,
    {
        let changed = self.markers.apply_snapshot(snapshot);
        self.repaint.mark_all(changed.iter().copied());
        changed
    }

    /// Set or clear the PC of a stack frame on `line`. Frame 0 is the
    /// innermost frame; any other frame sets the outer-frame marker.
    pub fn set_program_counter(
        &mut self,
        line: usize,
        address: Option<Address>,
        frame: usize,
        on: bool,
    ) -> bool {
        let changed = self.markers.set_program_counter(line, address, frame, on);
        if changed {
            tracing::debug!(
                target: "srcview.markers",
                line,
                frame,
                on,
                address = ?address,
                "program_counter"
            );
            self.repaint.mark(line);
        }
        changed
    }

    /// Rebuild breakpoint bits from the debugger's breakpoint list. Entries for
    /// other files are skipped; PC bits are preserved.
    pub fn apply_breakpoints(&mut self, breakpoints: &[BreakpointInfo]) -> Vec<usize> {
        let mine: Vec<(usize, MarkerFlags, Option<Address>)> = breakpoints
            .iter()
            .filter(|bp| self.file_name_matches(&bp.file))
            .map(|bp| (bp.line, bp.marker_flags(), bp.address))
            .collect();
        let changed = self.markers.apply_breakpoints(mine);
        self.repaint.mark_all(changed.iter().copied());
        changed
    }

    /// Block offset an address resolves to on `line`, if the line is expanded.
    fn marker_offset(&self, line: usize, address: Option<Address>) -> Option<usize> {
        if !self.rows.is_line_expanded(line) {
            return None;
        }
        self.lines.get(line)?.find_address_row_offset(address?)
    }

    /// Marker bits to draw on `row`.
    pub fn row_markers(&self, row: usize) -> MarkerFlags {
        let Some(pos) = self.rows.row_to_line(row) else {
            return MarkerFlags::empty();
        };
        let Some(entry) = self.markers.entry(pos.line) else {
            return MarkerFlags::empty();
        };
        let groups = [
            (MarkerFlags::PC, entry.pc_inner),
            (MarkerFlags::PC_UP, entry.pc_outer),
            (MarkerFlags::BP_ANY, entry.breakpoint),
        ];
        let mut out = MarkerFlags::empty();
        for (bits, address) in groups {
            let present = entry.flags & bits;
            if present.is_empty() {
                continue;
            }
            if self.marker_offset(pos.line, address) == pos.disass {
                out |= present;
            }
        }
        out
    }

    /// Row currently showing the PC of `frame` (innermost for 0, outer otherwise).
    pub fn pc_row(&self, frame: usize) -> Option<usize> {
        let bit = MarkerFlags::pc_for_frame(frame);
        let line = self.markers.lines_with(bit).next()?;
        let entry = self.markers.entry(line)?;
        let address = if bit == MarkerFlags::PC {
            entry.pc_inner
        } else {
            entry.pc_outer
        };
        let base = self.rows.line_to_row(line)?;
        Some(match self.marker_offset(line, address) {
            Some(offset) => base + 1 + offset,
            None => base,
        })
    }
}
