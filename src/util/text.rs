use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Ellipsis appended when a title is cut. One column wide.
const ELLIPSIS: char = '…';

/// Terminal columns occupied by `s`.
///
/// ```
/// use hckr::util::display_width;
///
/// assert_eq!(display_width("Show HN"), 7);
/// assert_eq!(display_width("日本"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` so it occupies at most `max_width` columns, ending in `…` when
/// anything was dropped.
///
/// Borrows when `s` already fits. Wide characters are never split, so the
/// result may be one column narrower than `max_width`.
///
/// ```
/// use hckr::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Ask HN: Who is hiring?", 10), "Ask HN: W…");
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Short", 0), "");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    let mut out = String::with_capacity(end + ELLIPSIS.len_utf8());
    out.push_str(&s[..end]);
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Right-pad `s` with spaces to exactly `width` columns, truncating first if needed.
pub fn fit_to_width(s: &str, width: usize) -> String {
    let cut = truncate_to_width(s, width);
    let pad = width.saturating_sub(display_width(&cut));
    format!("{}{}", cut, " ".repeat(pad))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    /// Saw ESC, deciding which sequence follows.
    Start,
    /// Inside `ESC [`, until a final byte in `@`..=`~`.
    Csi,
    /// Inside `ESC ]`, until BEL or `ESC \`.
    Osc,
    /// Saw ESC inside an OSC string.
    OscEsc,
}

/// Make remote text safe to print on a single terminal line.
///
/// Drops ANSI CSI and OSC sequences and every other control character.
/// Line breaks and tabs become single spaces, runs of whitespace collapse,
/// and the result is trimmed. Borrows when nothing needed changing.
///
/// ```
/// use hckr::util::sanitize_line;
///
/// assert_eq!(sanitize_line("Rust\x1b[31m 2024\x1b[0m"), "Rust 2024");
/// assert_eq!(sanitize_line("  two\n lines "), "two lines");
/// ```
pub fn sanitize_line(s: &str) -> Cow<'_, str> {
    let clean = !s.chars().any(|c| c.is_control())
        && !s.contains("  ")
        && s.trim() == s;
    if clean {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut state = Escape::None;
    let mut pending_space = false;

    for c in s.chars() {
        state = match state {
            Escape::Start => match c {
                '[' => Escape::Csi,
                ']' => Escape::Osc,
                _ => Escape::None,
            },
            Escape::Csi if ('@'..='~').contains(&c) => Escape::None,
            Escape::Csi => Escape::Csi,
            Escape::Osc if c == '\x07' => Escape::None,
            Escape::Osc if c == '\x1b' => Escape::OscEsc,
            Escape::Osc => Escape::Osc,
            Escape::OscEsc if c == '\\' => Escape::None,
            Escape::OscEsc => Escape::Osc,
            Escape::None if c == '\x1b' => Escape::Start,
            Escape::None => {
                if c.is_whitespace() {
                    pending_space = !out.is_empty();
                } else if !c.is_control() {
                    if pending_space {
                        out.push(' ');
                        pending_space = false;
                    }
                    out.push(c);
                }
                Escape::None
            }
        };
    }

    Cow::Owned(out)
}
