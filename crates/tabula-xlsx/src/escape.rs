//! `_xHHHH_` escapes used by spreadsheet text.
//!
//! Characters XML cannot carry are written as `_x` plus four hex digits and
//! `_`. A literal underscore that would otherwise start such a sequence is
//! itself written as `_x005F_`.

use std::borrow::Cow;

/// Length of `_xHHHH_`
const SEQ_LEN: usize = 7;

fn hex_at(bytes: &[u8], at: usize) -> Option<u32> {
    let seq = bytes.get(at..at + SEQ_LEN)?;
    if seq[0] != b'_' || !matches!(seq[1], b'x' | b'X') || seq[6] != b'_' {
        return None;
    }
    let digits = std::str::from_utf8(&seq[2..6]).ok()?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Replace escape sequences with the characters they stand for
pub(crate) fn decode(text: &str) -> Cow<'_, str> {
    if !text.contains("_x") && !text.contains("_X") {
        return Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        match hex_at(bytes, i).and_then(char::from_u32) {
            Some(c) => {
                out.push_str(&text[copied..i]);
                out.push(c);
                i += SEQ_LEN;
                copied = i;
            }
            None => i += 1,
        }
    }
    out.push_str(&text[copied..]);
    Cow::Owned(out)
}

/// Escape text so that [`decode`] gives it back unchanged
pub(crate) fn encode(text: &str) -> Cow<'_, str> {
    let needs_escape = |c: char| c != '\t' && c != '\n' && c != '\r' && (c as u32) < 0x20;
    let bytes = text.as_bytes();
    let ambiguous = |i: usize| hex_at(bytes, i).is_some();

    if !text.chars().any(needs_escape) && !(0..bytes.len()).any(ambiguous) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for (i, c) in text.char_indices() {
        if c == '_' && ambiguous(i) {
            out.push_str("_x005F_");
        } else if needs_escape(c) {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
