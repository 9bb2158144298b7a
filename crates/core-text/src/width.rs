//! Display width of a single grapheme cluster.
//!
//! All column decisions in the view (pixel hit testing, tab stops, bounding
//! rectangles) go through `egc_width` so there is one place to adjust if a
//! renderer measures clusters differently.

use unicode_width::UnicodeWidthStr;

/// Column width of one extended grapheme cluster. Control characters and
/// zero-width clusters report 0; tabs are resolved by the caller.
pub fn egc_width(g: &str) -> u16 {
    if g.chars().all(char::is_control) {
        return 0;
    }
    UnicodeWidthStr::width(g).min(u16::MAX as usize) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_wide() {
        assert_eq!(egc_width("a"), 1);
        assert_eq!(egc_width("漢"), 2);
        assert_eq!(egc_width("e\u{301}"), 1);
    }

    #[test]
    fn controls_are_zero() {
        assert_eq!(egc_width("\u{7}"), 0);
        assert_eq!(egc_width(""), 0);
    }
}
