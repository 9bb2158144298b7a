//! Plain substring search over display rows.
//!
//! Matching is substring containment (no regex). Case-insensitive matching
//! compares characters through `char::to_lowercase` so byte offsets always
//! refer to the original text.
//!
//! `find_wrapping` visits every row at most once plus the start row a second
//! time, which is the "wrap around exactly once" rule: the remainder of the
//! start row, the rows after it up to the file boundary, the rows from the
//! other boundary back to the start row, and finally the start row in full.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindDirection {
    Forward,
    Backward,
}

/// A match: display row plus byte range inside that row's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub row: usize,
    pub range: Range<usize>,
}

fn chars_eq(a: char, b: char, case_sensitive: bool) -> bool {
    a == b || (!case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
}

/// Byte length of the match of `needle` starting at `at`, if any.
fn match_len_at(hay: &str, at: usize, needle: &str, case_sensitive: bool) -> Option<usize> {
    let rest = hay.get(at..)?;
    if case_sensitive {
        return rest.starts_with(needle).then_some(needle.len());
    }
    let mut hay_chars = rest.char_indices();
    for nc in needle.chars() {
        let (_, hc) = hay_chars.next()?;
        if !chars_eq(hc, nc, false) {
            return None;
        }
    }
    Some(hay_chars.next().map(|(i, _)| i).unwrap_or(rest.len()))
}

/// First match starting at or after byte `from`.
pub fn find_forward(hay: &str, needle: &str, from: usize, case_sensitive: bool) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    hay.char_indices()
        .map(|(i, _)| i)
        .filter(|&i| i >= from)
        .find_map(|i| match_len_at(hay, i, needle, case_sensitive).map(|len| i..i + len))
}

/// Last match that ends at or before byte `before`.
pub fn find_backward(
    hay: &str,
    needle: &str,
    before: usize,
    case_sensitive: bool,
) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    hay.char_indices()
        .rev()
        .map(|(i, _)| i)
        .filter(|&i| i < before)
        .find_map(|i| {
            match_len_at(hay, i, needle, case_sensitive)
                .filter(|len| i + len <= before)
                .map(|len| i..i + len)
        })
}

/// Search `row_count` rows whose text is produced by `row_text`, starting at
/// (`start_row`, `from`) and wrapping around the file boundary once.
///
/// For a forward search `from` is the byte where scanning begins (usually the
/// end of the current selection); for a backward search a match must end at or
/// before `from` (usually the start of the current selection).
pub fn find_wrapping<F>(
    row_count: usize,
    mut row_text: F,
    start_row: usize,
    from: usize,
    needle: &str,
    case_sensitive: bool,
    direction: FindDirection,
) -> Option<SearchHit>
where
    F: FnMut(usize) -> Option<String>,
{
    if row_count == 0 || needle.is_empty() {
        return None;
    }
    let start_row = start_row.min(row_count - 1);
    let mut in_row = |row: usize, bound: Option<usize>| -> Option<SearchHit> {
        let text = row_text(row)?;
        let range = match direction {
            FindDirection::Forward => find_forward(&text, needle, bound.unwrap_or(0), case_sensitive),
            FindDirection::Backward => {
                find_backward(&text, needle, bound.unwrap_or(text.len()), case_sensitive)
            }
        }?;
        Some(SearchHit { row, range })
    };

    if let Some(hit) = in_row(start_row, Some(from)) {
        return Some(hit);
    }
    let order: Box<dyn Iterator<Item = usize>> = match direction {
        FindDirection::Forward => Box::new((start_row + 1..row_count).chain(0..=start_row)),
        FindDirection::Backward => Box::new((0..start_row).rev().chain((start_row..row_count).rev())),
    };
    for row in order {
        if let Some(hit) = in_row(row, None) {
            return Some(hit);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> impl FnMut(usize) -> Option<String> {
        let owned: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        move |i| owned.get(i).cloned()
    }

    #[test]
    fn forward_in_line_respects_from() {
        assert_eq!(find_forward("abab", "ab", 0, true), Some(0..2));
        assert_eq!(find_forward("abab", "ab", 1, true), Some(2..4));
        assert_eq!(find_forward("abab", "ab", 3, true), None);
        assert_eq!(find_forward("abab", "", 0, true), None);
    }

    #[test]
    fn backward_in_line_excludes_current_selection() {
        assert_eq!(find_backward("abab", "ab", 4, true), Some(2..4));
        assert_eq!(find_backward("abab", "ab", 2, true), Some(0..2));
        assert_eq!(find_backward("abab", "ab", 1, true), None);
    }

    #[test]
    fn case_insensitive_keeps_original_offsets() {
        assert_eq!(find_forward("xNeEdLe", "needle", 0, false), Some(1..7));
        assert_eq!(find_forward("xNeEdLe", "needle", 0, true), None);
        assert_eq!(find_forward("straße!", "SSE", 0, false), None);
        assert_eq!(find_forward("ÄBC", "äb", 0, false), Some(0..3));
    }

    #[test]
    fn forward_wraps_to_file_start() {
        let hit = find_wrapping(
            3,
            rows(&["needle here", "nothing", "tail"]),
            1,
            0,
            "NEEDLE",
            false,
            FindDirection::Forward,
        );
        assert_eq!(hit, Some(SearchHit { row: 0, range: 0..6 }));
    }

    #[test]
    fn forward_finds_earlier_part_of_start_row_last() {
        let hit = find_wrapping(
            2,
            rows(&["ab x ab", "zzz"]),
            0,
            3,
            "ab",
            true,
            FindDirection::Forward,
        );
        assert_eq!(hit, Some(SearchHit { row: 0, range: 5..7 }));
        let wrapped = find_wrapping(
            2,
            rows(&["ab x", "zzz"]),
            0,
            2,
            "ab",
            true,
            FindDirection::Forward,
        );
        assert_eq!(wrapped, Some(SearchHit { row: 0, range: 0..2 }));
    }

    #[test]
    fn backward_wraps_to_file_end() {
        let hit = find_wrapping(
            3,
            rows(&["top", "middle", "x needle"]),
            0,
            0,
            "needle",
            true,
            FindDirection::Backward,
        );
        assert_eq!(hit, Some(SearchHit { row: 2, range: 2..8 }));
    }

    #[test]
    fn full_cycle_without_match_is_none() {
        let mut visited = Vec::new();
        let texts = ["a", "b", "c"];
        let hit = find_wrapping(
            3,
            |i| {
                visited.push(i);
                texts.get(i).map(|s| s.to_string())
            },
            1,
            0,
            "needle",
            false,
            FindDirection::Forward,
        );
        assert!(hit.is_none());
        assert_eq!(visited, vec![1, 2, 0, 1]);
    }
}
