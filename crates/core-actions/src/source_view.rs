//! The source-view engine: one `SourceView` per open file.
//!
//! `SourceView` composes the text buffer, the per-line disassembly store, the
//! marker overlay, the row index, the syntax cache and the cursor/viewport into
//! a single query interface. It never draws; the presentation layer asks it for
//! row texts, spans and markers and receives `SourceNotification`s through
//! `flush_notifications`.
//!
//! Expansion state machine per line:
//!
//! ```text
//!   Collapsed --expand, no code--> Pending --disassembled(code)--> Expanded
//!   Collapsed --expand, code-----------------------------------> Expanded
//!   Pending   --collapse--> Collapsed (later delivery only stores the code)
//!   Expanded  --collapse--> Collapsed
//!   any       --disassembled(empty)--> Collapsed, can_disass = false
//! ```
//!
//! Invariants (after every public call):
//! * `rows.line_count() == lines.len() == markers.len() == buffer.line_count()`.
//! * An expanded line's run length is `1 + block length`.
//! * The cursor row is `< row_count()` (or 0 for an empty file).

use anyhow::Result;
use core_config::Config;
use core_events::{
    Address, DebuggerEvent, DisassembledInsn, MarkerFlags, NotificationSink, SourceNotification,
    forward_all,
};
use core_highlight::{LineEdit, Spans, SyntaxCache, highlight_disassembly};
use core_model::{BlockChange, CellMetrics, Cursor, Repaint, RepaintTracker, RowIndex, RowPos, View, Viewport};
use core_state::{LineStore, MarkerSet, SourceLine};
use core_text::Buffer;
use core_text::expr::DEFAULT_MAX_LOOKBEHIND;
use std::path::{Component, Path};
use tracing::debug;

pub const MAX_TAB_WIDTH: usize = 32;

/// Presentation parameters the engine needs for geometry and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub tab_width: usize,
    pub metrics: CellMetrics,
    pub case_sensitive: bool,
    pub max_lookbehind: usize,
    pub scroll_margin: usize,
    pub height: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            tab_width: 8,
            metrics: CellMetrics::default(),
            case_sensitive: false,
            max_lookbehind: DEFAULT_MAX_LOOKBEHIND,
            scroll_margin: 0,
            height: 24,
        }
    }
}

impl ViewSettings {
    /// Settings for a viewport of `height` rows from a loaded configuration.
    pub fn from_config(cfg: &Config, height: usize) -> Self {
        let (cell_width, cell_height) = cfg.effective_cell_size();
        Self {
            tab_width: cfg.effective_tab_width(),
            metrics: CellMetrics::new(cell_width, cell_height),
            case_sensitive: cfg.case_sensitive(),
            max_lookbehind: cfg.max_lookbehind(),
            scroll_margin: cfg.effective_scroll_margin(height),
            height: height.max(1),
        }
    }
}

pub struct SourceView {
    pub(crate) file_name: String,
    pub(crate) buffer: Buffer,
    pub(crate) lines: LineStore,
    pub(crate) rows: RowIndex,
    pub(crate) markers: MarkerSet,
    pub(crate) syntax: SyntaxCache,
    pub(crate) view: View,
    pub(crate) repaint: RepaintTracker,
    pub(crate) settings: ViewSettings,
    pub(crate) outbox: Vec<SourceNotification>,
}

impl SourceView {
    pub fn new(file_name: impl Into<String>, text: &str, settings: ViewSettings) -> Result<Self> {
        let file_name = file_name.into();
        let buffer = Buffer::from_str(file_name.clone(), text)?;
        let count = buffer.line_count();
        let mut syntax = SyntaxCache::new();
        syntax.rebuild(buffer.lines());
        debug!(target: "srcview.rows", file = %file_name, lines = count, "source_view_created");
        Ok(Self {
            file_name,
            buffer,
            lines: LineStore::new(count),
            rows: RowIndex::new(count),
            markers: MarkerSet::new(count),
            syntax,
            view: View::new(settings.height),
            repaint: RepaintTracker::new(),
            settings,
            outbox: Vec::new(),
        })
    }

    // ---------------------------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------------------------

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn line_count(&self) -> usize {
        self.rows.line_count()
    }

    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    pub fn row_index(&self) -> &RowIndex {
        &self.rows
    }

    pub fn cursor(&self) -> Cursor {
        self.view.cursor
    }

    pub fn viewport(&self) -> Viewport {
        self.view.viewport
    }

    pub fn row_to_line(&self, row: usize) -> Option<RowPos> {
        self.rows.row_to_line(row)
    }

    pub fn line_to_row(&self, line: usize) -> Option<usize> {
        self.rows.line_to_row(line)
    }

    /// Row showing the instruction at exactly `address` when `line` is
    /// expanded; the line's base row otherwise.
    pub fn line_to_row_at(&self, line: usize, address: Option<Address>) -> Option<usize> {
        let offset = address.and_then(|a| self.lines.get(line)?.exact_address_offset(a));
        self.rows.line_to_row_at(line, offset)
    }

    pub fn is_row_expanded(&self, row: usize) -> bool {
        self.rows.is_row_expanded(row)
    }

    pub fn is_row_disassembly_row(&self, row: usize) -> bool {
        self.rows.is_row_disassembly_row(row)
    }

    pub fn is_line_expanded(&self, line: usize) -> bool {
        self.rows.is_line_expanded(line)
    }

    pub fn can_disassemble(&self, line: usize) -> bool {
        self.lines.can_disassemble(line)
    }

    pub fn is_expand_pending(&self, line: usize) -> bool {
        self.lines.is_pending(line)
    }

    pub fn line_state(&self, line: usize) -> Option<&SourceLine> {
        self.lines.get(line)
    }

    pub fn find_address_row_offset(&self, line: usize, address: Address) -> Option<usize> {
        self.lines.get(line)?.find_address_row_offset(address)
    }

    pub fn line_markers(&self, line: usize) -> MarkerFlags {
        self.markers.flags(line)
    }

    /// Text shown on `row`: the source line, or the instruction text on a
    /// disassembly row.
    pub fn row_text(&self, row: usize) -> Option<String> {
        let pos = self.rows.row_to_line(row)?;
        match pos.disass {
            None => self.buffer.line(pos.line),
            Some(offset) => self
                .lines
                .get(pos.line)?
                .disass
                .get(offset)
                .map(|insn| insn.text.clone()),
        }
    }

    /// Instruction address shown on a disassembly row.
    pub fn row_address(&self, row: usize) -> Option<Address> {
        let pos = self.rows.row_to_line(row)?;
        self.lines.get(pos.line)?.address_at(pos.disass?)
    }

    /// Highlight spans for the text of `row`.
    pub fn highlight_row(&self, row: usize) -> Option<Spans> {
        let pos = self.rows.row_to_line(row)?;
        let text = self.row_text(row)?;
        Some(match pos.disass {
            None => self.syntax.highlight_line(pos.line, &text).spans,
            Some(_) => highlight_disassembly(&text),
        })
    }

    /// Line and instruction address under the cursor.
    pub fn active_line(&self) -> Option<(usize, Option<Address>)> {
        let row = self.view.cursor.row;
        let pos = self.rows.row_to_line(row)?;
        Some((pos.line, self.row_address(row)))
    }

    /// True if `other` names this view's file. Relative names match as a
    /// trailing run of path components.
    pub fn file_name_matches(&self, other: &str) -> bool {
        fn normal(p: &str) -> Vec<Component<'_>> {
            Path::new(p)
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect()
        }
        if other.is_empty() {
            return false;
        }
        let mine = normal(&self.file_name);
        let theirs = normal(other);
        if mine == theirs {
            return true;
        }
        let mine_abs = Path::new(&self.file_name).is_absolute();
        let theirs_abs = Path::new(other).is_absolute();
        match (mine_abs, theirs_abs) {
            (true, true) => false,
            (_, false) => mine.ends_with(&theirs),
            (false, true) => theirs.ends_with(&mine),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Expand / collapse
    // ---------------------------------------------------------------------------------------------

    pub(crate) fn apply_block_change(&mut self, change: BlockChange) {
        self.view.remap(&change);
        self.view.clamp(self.rows.row_count());
        self.repaint.mark_full();
    }

    /// Show the disassembly of `line`, requesting it first if necessary.
    /// Returns true if anything changed (rows or a new request).
    pub fn expand(&mut self, line: usize) -> bool {
        if self.rows.is_line_expanded(line) {
            return false;
        }
        let Some(state) = self.lines.get(line) else {
            return false;
        };
        if !state.can_disass {
            debug!(target: "srcview.disasm", line, "expand_not_disassemblable");
            return false;
        }
        if !state.has_disassembly() {
            if !self.lines.mark_pending(line) {
                return false;
            }
            debug!(target: "srcview.disasm", line, "disassemble_requested");
            self.outbox.push(SourceNotification::DisassembleRequested(line));
            return true;
        }
        let block_len = state.disass.len();
        match self.rows.expand(line, block_len) {
            Some(change) => {
                self.apply_block_change(change);
                debug!(target: "srcview.rows", line, rows = block_len, "line_expanded");
                self.outbox.push(SourceNotification::LineExpanded(line));
                true
            }
            None => false,
        }
    }

    /// Hide the disassembly of `line`; also cancels a pending expansion.
    pub fn collapse(&mut self, line: usize) -> bool {
        let cancelled = self.lines.cancel_pending(line);
        if cancelled {
            debug!(target: "srcview.disasm", line, "pending_expand_cancelled");
        }
        match self.rows.collapse(line) {
            Some(change) => {
                self.apply_block_change(change);
                debug!(target: "srcview.rows", line, rows = change.old_len, "line_collapsed");
                self.outbox.push(SourceNotification::LineCollapsed(line));
                true
            }
            None => cancelled,
        }
    }

    pub fn toggle(&mut self, line: usize) -> bool {
        if self.rows.is_line_expanded(line) || self.lines.is_pending(line) {
            self.collapse(line)
        } else {
            self.expand(line)
        }
    }

    /// `expand` addressed by row; disassembly rows are ignored.
    pub fn expand_row(&mut self, row: usize) -> bool {
        match self.rows.row_to_line(row) {
            Some(RowPos { line, disass: None }) => self.expand(line),
            _ => false,
        }
    }

    /// `collapse` addressed by row; disassembly rows are ignored.
    pub fn collapse_row(&mut self, row: usize) -> bool {
        match self.rows.row_to_line(row) {
            Some(RowPos { line, disass: None }) => self.collapse(line),
            _ => false,
        }
    }

    /// Deliver the disassembly of `line`.
    pub fn disassembled(&mut self, line: usize, code: Vec<DisassembledInsn>) {
        let Some(outcome) = self.lines.deliver(line, code) else {
            return;
        };
        if outcome.new_len == 0 {
            if let Some(change) = self.rows.collapse(line) {
                self.apply_block_change(change);
                self.outbox.push(SourceNotification::LineCollapsed(line));
            }
            debug!(target: "srcview.disasm", line, "line_not_disassemblable");
            return;
        }
        if self.rows.is_line_expanded(line) {
            if let Some(change) = self.rows.set_block_len(line, outcome.new_len) {
                self.apply_block_change(change);
            }
            self.repaint.mark_full();
            debug!(
                target: "srcview.disasm",
                line,
                previous = outcome.previous_len,
                new = outcome.new_len,
                "block_replaced"
            );
            self.outbox.push(SourceNotification::LineExpanded(line));
        } else if outcome.was_pending {
            if let Some(change) = self.rows.expand(line, outcome.new_len) {
                self.apply_block_change(change);
                debug!(target: "srcview.rows", line, rows = outcome.new_len, "line_expanded");
                self.outbox.push(SourceNotification::LineExpanded(line));
            }
        }
    }

    /// Drop every disassembly block (e.g. the program was rebuilt). Expanded
    /// lines collapse; markers are kept.
    pub fn clear_disassembly(&mut self) {
        let expanded: Vec<usize> = (0..self.line_count())
            .filter(|&l| self.rows.is_line_expanded(l))
            .collect();
        for line in expanded {
            self.collapse(line);
        }
        self.lines.clear_disassembly();
    }

    pub fn handle_debugger_event(&mut self, event: DebuggerEvent) {
        match event {
            DebuggerEvent::Markers(snapshot) => {
                self.apply_marker_snapshot(snapshot);
            }
            DebuggerEvent::Breakpoints(list) => {
                self.apply_breakpoints(&list);
            }
            DebuggerEvent::Disassembled { line, code } => self.disassembled(line, code),
            DebuggerEvent::ProgramCounter {
                line,
                address,
                frame,
                set,
            } => {
                self.set_program_counter(line, address, frame, set);
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Cursor, viewport and settings
    // ---------------------------------------------------------------------------------------------

    /// Put the cursor on `line` (on the instruction at `address` when the line
    /// is expanded) and scroll minimally so it is visible.
    pub fn scroll_to(&mut self, line: usize, address: Option<Address>) -> bool {
        let Some(row) = self.line_to_row_at(line, address) else {
            return false;
        };
        self.view.cursor = Cursor::at_row(row);
        if self.view.auto_scroll(self.settings.scroll_margin) {
            self.repaint.mark_full();
        }
        true
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.settings.height = height.max(1);
        self.view.viewport.height = self.settings.height;
        self.view.clamp(self.rows.row_count());
        self.repaint.mark_full();
    }

    /// Returns true if the tab width changed.
    pub fn set_tab_width(&mut self, width: usize) -> bool {
        let width = width.clamp(1, MAX_TAB_WIDTH);
        if width == self.settings.tab_width {
            return false;
        }
        self.settings.tab_width = width;
        self.repaint.mark_full();
        true
    }

    /// Replace the text. Disassembly and markers are dropped and every line
    /// collapses; highlight states of the unchanged prefix and suffix are kept.
    /// Returns the lines whose highlighting changed.
    pub fn reload(&mut self, text: &str) -> Result<Vec<usize>> {
        let buffer = Buffer::from_str(self.file_name.clone(), text)?;
        let old: Vec<String> = self.buffer.lines().collect();
        let new: Vec<String> = buffer.lines().collect();
        let edit = LineEdit::diff(old.as_slice(), new.as_slice());
        let changed = if edit.is_noop() {
            Vec::new()
        } else {
            self.syntax.apply_edit(edit, |i| new.get(i).cloned())
        };
        let count = new.len();
        self.buffer = buffer;
        self.lines.reset(count);
        self.markers.reset(count);
        self.rows.rebuild(count);
        self.view.clamp(self.rows.row_count());
        self.view.cursor.clear_selection();
        self.repaint.mark_full();
        debug!(
            target: "srcview.highlight",
            lines = count,
            rehighlighted = changed.len(),
            "reload"
        );
        Ok(changed)
    }

    // ---------------------------------------------------------------------------------------------
    // Output
    // ---------------------------------------------------------------------------------------------

    /// Notifications queued since the last flush.
    pub fn pending_notifications(&self) -> &[SourceNotification] {
        &self.outbox
    }

    pub fn flush_notifications(&mut self, sink: &mut dyn NotificationSink) -> usize {
        forward_all(self.outbox.drain(..), sink)
    }

    /// What the presentation layer must redraw inside the viewport.
    pub fn take_repaint(&mut self) -> Repaint {
        let visible = self.rows.lines_in_rows(self.view.viewport.rows());
        self.repaint.take_lines_in(visible)
    }
}
