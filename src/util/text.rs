use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
///
/// ```
/// use reelfeed::util::display_width;
///
/// assert_eq!(display_width("Heat"), 4);
/// assert_eq!(display_width("千と千尋"), 8);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: char = '…';

/// Truncate to at most `max_width` columns, ending in `…` when cut.
///
/// ```
/// use reelfeed::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Alien", 10), "Alien");
/// assert_eq!(truncate_to_width("The Godfather", 8), "The God…");
/// assert_eq!(truncate_to_width("Jaws", 0), "");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1;
    let mut width = 0;
    let mut out = String::with_capacity(s.len().min(max_width * 4));

    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }

    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Collapse remote text into a single safe display line.
///
/// Drops ANSI escape sequences and control characters, and folds any run of
/// whitespace (newlines and tabs included) into one space.
pub fn sanitize_line(s: &str) -> Cow<'_, str> {
    let clean = !s.chars().any(|c| c.is_control() || c == '\u{1b}')
        && !s.contains("  ")
        && s.trim() == s;
    if clean {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            skip_escape(&mut chars);
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    Cow::Owned(out)
}

/// Consume the remainder of a CSI (`ESC [`) or OSC (`ESC ]`) sequence.
fn skip_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    match chars.peek() {
        Some('[') => {
            chars.next();
            for c in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&c) {
                    break;
                }
            }
        }
        Some(']') => {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '\u{07}' {
                    break;
                }
                if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                    chars.next();
                    break;
                }
            }
        }
        _ => {}
    }
}
