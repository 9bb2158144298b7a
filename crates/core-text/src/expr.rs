//! Identifier and expression boundaries under a cursor.
//!
//! `word_bounds` isolates the identifier touching a byte offset; `extend_expr`
//! then grows that word into the longest member-access chain around it, e.g.
//! a click anywhere in `obj.field[i].x` yields the whole chain so a debugger
//! can evaluate it. Extension follows `.`, `->` and `::` plus balanced `[...]`
//! index groups; it stops at whitespace, any other operator, statement
//! terminators and unbalanced brackets, and never leaves the given line.

use std::ops::Range;

/// How far `extend_expr` looks to the left of the word, in bytes.
pub const DEFAULT_MAX_LOOKBEHIND: usize = 256;

pub fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Start of the identifier run ending at `pos` (never below `floor`).
fn ident_start_before(text: &str, floor: usize, pos: usize) -> usize {
    let mut start = pos;
    for (i, c) in text[floor..pos].char_indices().rev() {
        if !is_ident_char(c) {
            break;
        }
        start = floor + i;
    }
    start
}

/// End of the identifier run starting at `pos`.
fn ident_end_after(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn starts_with_ident(s: &str) -> bool {
    s.chars().next().is_some_and(is_ident_start)
}

/// Index of the `[` matching the `]` at `close` (searching no further left than `floor`).
fn matching_open(text: &str, floor: usize, close: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for i in (floor..=close).rev() {
        match bytes[i] {
            b']' => depth += 1,
            b'[' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `]` matching the `[` at `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn member_op_suffix(s: &str) -> Option<usize> {
    if s.ends_with("->") || s.ends_with("::") {
        Some(2)
    } else if s.ends_with('.') {
        Some(1)
    } else {
        None
    }
}

fn member_op_prefix(s: &str) -> Option<usize> {
    if s.starts_with("->") || s.starts_with("::") {
        Some(2)
    } else if s.starts_with('.') {
        Some(1)
    } else {
        None
    }
}

/// Identifier touching byte `at`. Returns `None` when `at` is past the end of
/// the line or not inside an identifier.
pub fn word_bounds(text: &str, at: usize) -> Option<Range<usize>> {
    if at >= text.len() || !text.is_char_boundary(at) {
        return None;
    }
    if !text[at..].chars().next().is_some_and(is_ident_char) {
        return None;
    }
    let start = ident_start_before(text, 0, at);
    let end = ident_end_after(text, at);
    (start < end).then_some(start..end)
}

/// Extend `word` to the surrounding expression using the default look-behind.
pub fn extend_expr(text: &str, word: Range<usize>) -> Range<usize> {
    extend_expr_with_limit(text, word, DEFAULT_MAX_LOOKBEHIND)
}

/// Extend `word` to the surrounding member-access expression, looking at most
/// `max_lookbehind` bytes to the left of the word.
pub fn extend_expr_with_limit(text: &str, word: Range<usize>, max_lookbehind: usize) -> Range<usize> {
    if word.start > word.end
        || word.end > text.len()
        || !text.is_char_boundary(word.start)
        || !text.is_char_boundary(word.end)
    {
        return word;
    }
    let mut floor = word.start.saturating_sub(max_lookbehind);
    while !text.is_char_boundary(floor) {
        floor += 1;
    }

    let mut start = word.start;
    while let Some(op_len) = member_op_suffix(&text[floor..start]) {
        let op_start = start - op_len;
        let mut operand_end = op_start;
        let mut balanced = true;
        while operand_end > floor && text.as_bytes()[operand_end - 1] == b']' {
            match matching_open(text, floor, operand_end - 1) {
                Some(open) => operand_end = open,
                None => {
                    balanced = false;
                    break;
                }
            }
        }
        if !balanced {
            break;
        }
        let ident = ident_start_before(text, floor, operand_end);
        if ident == operand_end {
            // `::name` with nothing before it is a global scope qualifier.
            if operand_end == op_start && &text[op_start..start] == "::" {
                start = op_start;
            }
            break;
        }
        if !starts_with_ident(&text[ident..]) {
            break;
        }
        start = ident;
    }

    let mut end = word.end;
    loop {
        while text[end..].starts_with('[') {
            match matching_close(text, end) {
                Some(close) => end = close + 1,
                None => return start..end,
            }
        }
        let Some(op_len) = member_op_prefix(&text[end..]) else {
            break;
        };
        let ident = end + op_len;
        if !starts_with_ident(&text[ident..]) {
            break;
        }
        end = ident_end_after(text, ident);
    }
    start..end
}
