//! Per-line exit states for incremental re-highlighting.
//!
//! The cache stores the `HighlightState` leaving each source line. The state
//! entering line `i` is the exit of line `i - 1` (or `Normal` for line 0).
//!
//! After a textual edit, described as a `LineEdit` (a run of lines replaced by
//! another run), `apply_edit` re-highlights from the first changed line and
//! keeps going past the edited run only while the entering state of the next
//! unchanged line differs from what it was before. The returned list is the set
//! of lines whose spans may differ and must be repainted.
//!
//! Invariants:
//! * `len()` equals the number of source lines the cache was last fed.
//! * The repaint list is sorted ascending and unique.

use crate::{HighlightState, HighlightedLine, highlight};

/// Lines `start..start + removed` of the old text were replaced by lines
/// `start..start + inserted` of the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEdit {
    pub start: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl LineEdit {
    /// Edit turning `old` into `new` by stripping their common prefix and suffix.
    pub fn diff<S: AsRef<str>>(old: &[S], new: &[S]) -> Self {
        let start = old
            .iter()
            .zip(new.iter())
            .take_while(|(a, b)| a.as_ref() == b.as_ref())
            .count();
        let max_suffix = old.len().min(new.len()) - start;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a.as_ref() == b.as_ref())
            .count();
        Self {
            start,
            removed: old.len() - start - suffix,
            inserted: new.len() - start - suffix,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.inserted == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxCache {
    exits: Vec<HighlightState>,
}

impl SyntaxCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.exits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exits.is_empty()
    }

    /// State entering `line`. Lines past the end report the exit of the last line.
    pub fn entering(&self, line: usize) -> HighlightState {
        if line == 0 {
            return HighlightState::Normal;
        }
        self.exits
            .get(line - 1)
            .or_else(|| self.exits.last())
            .copied()
            .unwrap_or_default()
    }

    pub fn exit(&self, line: usize) -> Option<HighlightState> {
        self.exits.get(line).copied()
    }

    /// Highlight every line from scratch.
    pub fn rebuild<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exits.clear();
        let mut state = HighlightState::Normal;
        for line in lines {
            state = highlight(line.as_ref(), state).exit;
            self.exits.push(state);
        }
        tracing::debug!(target: "srcview.highlight", lines = self.exits.len(), "rebuild");
    }

    /// Spans for `line` given its current text, using the cached entering state.
    pub fn highlight_line(&self, line: usize, text: &str) -> HighlightedLine {
        highlight(text, self.entering(line))
    }

    /// Re-highlight after `edit`; `text` yields the new text of a line.
    /// Returns the lines that must be repainted.
    pub fn apply_edit<F>(&mut self, edit: LineEdit, mut text: F) -> Vec<usize>
    where
        F: FnMut(usize) -> Option<String>,
    {
        let start = edit.start.min(self.exits.len());
        let old_end = (start + edit.removed).min(self.exits.len());
        let old_suffix_entering = if old_end == 0 {
            HighlightState::Normal
        } else {
            self.exits[old_end - 1]
        };
        self.exits.splice(
            start..old_end,
            std::iter::repeat_n(HighlightState::Normal, edit.inserted),
        );
        let changed_end = start + edit.inserted;

        let mut repaint = Vec::new();
        let mut old_entering = old_suffix_entering;
        for line in start..self.exits.len() {
            let entering = self.entering(line);
            if line >= changed_end && entering == old_entering {
                break;
            }
            let exit = highlight(text(line).as_deref().unwrap_or(""), entering).exit;
            old_entering = if line + 1 == changed_end {
                old_suffix_entering
            } else {
                self.exits[line]
            };
            self.exits[line] = exit;
            repaint.push(line);
        }
        tracing::trace!(
            target: "srcview.highlight",
            start,
            removed = edit.removed,
            inserted = edit.inserted,
            repainted = repaint.len(),
            "apply_edit"
        );
        repaint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cache_for(lines: &[&str]) -> SyntaxCache {
        let mut c = SyntaxCache::new();
        c.rebuild(lines.iter());
        c
    }

    fn edit(cache: &mut SyntaxCache, old: &[&str], new: &[&str]) -> Vec<usize> {
        let e = LineEdit::diff(old, new);
        let owned: Vec<String> = new.iter().map(|s| s.to_string()).collect();
        cache.apply_edit(e, |i| owned.get(i).cloned())
    }

    #[test]
    fn entering_states_follow_block_comment() {
        let c = cache_for(&["int a;", "/* open", "still", "*/ int b;", "c"]);
        assert_eq!(c.entering(0), HighlightState::Normal);
        assert_eq!(c.entering(2), HighlightState::InBlockComment);
        assert_eq!(c.entering(3), HighlightState::InBlockComment);
        assert_eq!(c.entering(4), HighlightState::Normal);
    }

    #[test]
    fn diff_strips_prefix_and_suffix() {
        let e = LineEdit::diff(&["a", "b", "c", "d"], &["a", "x", "y", "d"]);
        assert_eq!(e, LineEdit { start: 1, removed: 2, inserted: 2 });
        let same = LineEdit::diff(&["a", "a"], &["a", "a", "a"]);
        assert_eq!(same, LineEdit { start: 2, removed: 0, inserted: 1 });
        assert!(LineEdit::diff(&["q"], &["q"]).is_noop());
    }

    #[test]
    fn local_edit_repaints_only_changed_line() {
        let old = ["int a;", "int b;", "int c;", "int d;"];
        let new = ["int a;", "long b;", "int c;", "int d;"];
        let mut c = cache_for(&old);
        assert_eq!(edit(&mut c, &old, &new), vec![1]);
    }

    #[test]
    fn opening_comment_repaints_until_convergence() {
        let old = ["a", "b", "c */", "d", "e"];
        let new = ["/* a", "b", "c */", "d", "e"];
        let mut c = cache_for(&old);
        assert_eq!(edit(&mut c, &old, &new), vec![0, 1, 2]);
        assert_eq!(c.entering(1), HighlightState::InBlockComment);
        assert_eq!(c.entering(3), HighlightState::Normal);
    }

    #[test]
    fn unclosed_comment_repaints_to_end() {
        let old = ["a", "b", "c"];
        let new = ["/* a", "b", "c"];
        let mut c = cache_for(&old);
        assert_eq!(edit(&mut c, &old, &new), vec![0, 1, 2]);
        assert_eq!(c.exit(2), Some(HighlightState::InBlockComment));
    }

    #[test]
    fn removing_lines_compares_against_old_suffix_state() {
        let old = ["/* a", "b */", "int c;"];
        let new = ["/* a", "int c;"];
        let mut c = cache_for(&old);
        let repaint = edit(&mut c, &old, &new);
        assert_eq!(repaint, vec![1]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.exit(1), Some(HighlightState::InBlockComment));
    }

    #[test]
    fn incremental_matches_full_rebuild() {
        let old = ["x", "/* y", "z */", "w", "\"s\\", "t\"", "#if A \\", "B"];
        let new = ["x", "y", "z */", "w", "\"s", "t\"", "#if A", "B"];
        let mut inc = cache_for(&old);
        edit(&mut inc, &old, &new);
        let full = cache_for(&new);
        for i in 0..new.len() {
            assert_eq!(inc.exit(i), full.exit(i), "line {i}");
        }
    }
}
