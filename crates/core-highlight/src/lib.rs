//! C/C++ token highlighter for the source view.
//!
//! `highlight` is a pure function of `(line text, entering state)`; the only
//! information carried from one line to the next is a `HighlightState`. That
//! property lets `SyntaxCache` re-highlight just the lines whose entering
//! state actually changed after the text was replaced.
//!
//! Carry states:
//! * `Normal`
//! * `InBlockComment`: a `/*` was not closed on a previous line.
//! * `InLineContinuation`: the previous line ended with a backslash inside a
//!   preprocessor directive, a `//` comment or a string/char literal.
//!
//! Within a line the scanner is greedy left to right: comments, literals,
//! numbers and identifiers are consumed whole; identifiers are checked against
//! a fixed keyword table by exact, case-sensitive match. Unterminated
//! constructs never fail: a block comment carries to the end of the file and
//! an unterminated literal ends at the end of its line.
//!
//! Spans cover the whole line without gaps; adjacent spans of the same kind are
//! merged.

use smallvec::SmallVec;
use std::ops::Range;

mod cache;
mod keywords;

pub use cache::{LineEdit, SyntaxCache};
pub use keywords::{KEYWORDS, is_keyword};

/// Construct continued onto the next line by a trailing backslash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continued {
    Preprocessor,
    LineComment,
    /// String or char literal, with its opening quote.
    Literal(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HighlightState {
    #[default]
    Normal,
    InBlockComment,
    InLineContinuation(Continued),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Plain,
    Keyword,
    Comment,
    String,
    Preprocessor,
    /// Instruction text on a disassembly row.
    Disassembly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    pub range: Range<usize>,
    pub kind: TokenKind,
}

pub type Spans = SmallVec<[TokenSpan; 8]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedLine {
    pub spans: Spans,
    pub exit: HighlightState,
}

#[derive(Default)]
struct SpanBuilder {
    spans: Spans,
}

impl SpanBuilder {
    fn push(&mut self, range: Range<usize>, kind: TokenKind) {
        if range.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.kind == kind && last.range.end == range.start => {
                last.range.end = range.end;
            }
            _ => self.spans.push(TokenSpan { range, kind }),
        }
    }

    fn finish(self, exit: HighlightState) -> HighlightedLine {
        HighlightedLine {
            spans: self.spans,
            exit,
        }
    }
}

/// Byte just past the closing `quote`, scanning from `from`; `None` if the
/// literal is not closed on this line.
fn literal_end(line: &str, from: usize, quote: char) -> Option<usize> {
    let mut chars = line[from..].char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return Some(from + i + c.len_utf8());
        }
    }
    None
}

fn run_end(line: &str, from: usize, pred: impl Fn(char) -> bool) -> usize {
    line[from..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map(|(i, _)| from + i)
        .unwrap_or(line.len())
}

fn continued_if(backslash: bool, what: Continued) -> HighlightState {
    if backslash {
        HighlightState::InLineContinuation(what)
    } else {
        HighlightState::Normal
    }
}

/// Classify one source line given the state entering it.
pub fn highlight(line: &str, entering: HighlightState) -> HighlightedLine {
    let len = line.len();
    let backslash = line.ends_with('\\');
    let mut out = SpanBuilder::default();
    let mut pos = 0;

    match entering {
        HighlightState::InLineContinuation(Continued::Preprocessor) => {
            out.push(0..len, TokenKind::Preprocessor);
            return out.finish(continued_if(backslash, Continued::Preprocessor));
        }
        HighlightState::InLineContinuation(Continued::LineComment) => {
            out.push(0..len, TokenKind::Comment);
            return out.finish(continued_if(backslash, Continued::LineComment));
        }
        HighlightState::InLineContinuation(Continued::Literal(quote)) => match literal_end(line, 0, quote) {
            Some(end) => {
                out.push(0..end, TokenKind::String);
                pos = end;
            }
            None => {
                out.push(0..len, TokenKind::String);
                return out.finish(continued_if(backslash, Continued::Literal(quote)));
            }
        },
        HighlightState::InBlockComment => match line.find("*/") {
            Some(close) => {
                out.push(0..close + 2, TokenKind::Comment);
                pos = close + 2;
            }
            None => {
                out.push(0..len, TokenKind::Comment);
                return out.finish(HighlightState::InBlockComment);
            }
        },
        HighlightState::Normal => {
            if line.trim_start().starts_with('#') {
                out.push(0..len, TokenKind::Preprocessor);
                return out.finish(continued_if(backslash, Continued::Preprocessor));
            }
        }
    }

    while pos < len {
        let rest = &line[pos..];
        let Some(c) = rest.chars().next() else { break };
        if rest.starts_with("//") {
            out.push(pos..len, TokenKind::Comment);
            return out.finish(continued_if(backslash, Continued::LineComment));
        }
        if rest.starts_with("/*") {
            match line[pos + 2..].find("*/") {
                Some(rel) => {
                    let end = pos + 2 + rel + 2;
                    out.push(pos..end, TokenKind::Comment);
                    pos = end;
                    continue;
                }
                None => {
                    out.push(pos..len, TokenKind::Comment);
                    return out.finish(HighlightState::InBlockComment);
                }
            }
        }
        if c == '"' || c == '\'' {
            match literal_end(line, pos + 1, c) {
                Some(end) => {
                    out.push(pos..end, TokenKind::String);
                    pos = end;
                    continue;
                }
                None => {
                    out.push(pos..len, TokenKind::String);
                    return out.finish(continued_if(backslash, Continued::Literal(c)));
                }
            }
        }
        if c == '_' || c.is_ascii_alphabetic() {
            let end = run_end(line, pos, |ch| ch == '_' || ch.is_alphanumeric());
            let kind = if is_keyword(&line[pos..end]) {
                TokenKind::Keyword
            } else {
                TokenKind::Plain
            };
            out.push(pos..end, kind);
            pos = end;
            continue;
        }
        if c.is_ascii_digit() {
            let end = run_end(line, pos, |ch| ch == '_' || ch == '.' || ch.is_alphanumeric());
            out.push(pos..end, TokenKind::Plain);
            pos = end;
            continue;
        }
        out.push(pos..pos + c.len_utf8(), TokenKind::Plain);
        pos += c.len_utf8();
    }
    out.finish(HighlightState::Normal)
}

/// Spans for a disassembly row: the whole text is one `Disassembly` span. The
/// carry state of the surrounding source is unaffected.
pub fn highlight_disassembly(text: &str) -> Spans {
    let mut out = SpanBuilder::default();
    out.push(0..text.len(), TokenKind::Disassembly);
    out.spans
}
