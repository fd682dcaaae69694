//! Grammar scanners over raw JSON bytes.
//!
//! Every scanner takes `(buffer, offset)` and returns `(end, ok)`: the offset
//! just past the token (or the offset where scanning stopped) and whether the
//! bytes matched the JSON grammar. Nothing is allocated and no value is
//! materialized; numbers in particular stay opaque grammar spans.
//!
//! The threat validator drives these directly. The splice engine and the
//! locator only need [`skip_space`] and [`is_escaped`], the latter when
//! walking backwards over an object key.

use bstr::ByteSlice;

/// JSON insignificant whitespace.
#[inline]
#[must_use]
pub const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Returns the first offset at or after `i` that is not JSON whitespace.
#[inline]
#[must_use]
pub fn skip_space(data: &[u8], mut i: usize) -> usize {
    while i < data.len() && is_space(data[i]) {
        i += 1;
    }
    i
}

/// Scans a string literal whose opening quote sits at `i - 1`.
///
/// On success the returned offset is one past the closing quote. Control
/// bytes below `0x20`, unknown escapes and short `\u` escapes are rejected.
#[must_use]
pub fn scan_string(data: &[u8], mut i: usize) -> (usize, bool) {
    while i < data.len() {
        match data[i] {
            b'"' => return (i + 1, true),
            b'\\' => {
                i += 1;
                match data.get(i) {
                    Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {}
                    Some(b'u') => {
                        for _ in 0..4 {
                            i += 1;
                            if !data.get(i).is_some_and(u8::is_ascii_hexdigit) {
                                return (i, false);
                            }
                        }
                    }
                    _ => return (i, false),
                }
            }
            b if b < b' ' => return (i, false),
            _ => {}
        }
        i += 1;
    }
    (i, false)
}

/// Scans a number literal starting at `i` (the sign or first digit).
///
/// Enforces `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
#[must_use]
pub fn scan_number(data: &[u8], mut i: usize) -> (usize, bool) {
    if data.get(i) == Some(&b'-') {
        i += 1;
    }
    match data.get(i) {
        Some(b'0') => {
            i += 1;
            // a leading zero is only legal on its own
            if data.get(i).is_some_and(u8::is_ascii_digit) {
                return (i, false);
            }
        }
        Some(b'1'..=b'9') => i = skip_digits(data, i + 1),
        _ => return (i, false),
    }
    if data.get(i) == Some(&b'.') {
        i += 1;
        if !data.get(i).is_some_and(u8::is_ascii_digit) {
            return (i, false);
        }
        i = skip_digits(data, i + 1);
    }
    if matches!(data.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(data.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !data.get(i).is_some_and(u8::is_ascii_digit) {
            return (i, false);
        }
        i = skip_digits(data, i + 1);
    }
    (i, true)
}

fn skip_digits(data: &[u8], mut i: usize) -> usize {
    while data.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}

/// Matches the tail of `true`; the leading `t` sits at `i - 1`.
#[inline]
#[must_use]
pub fn scan_true(data: &[u8], i: usize) -> (usize, bool) {
    scan_literal(data, i, b"rue")
}

/// Matches the tail of `false`; the leading `f` sits at `i - 1`.
#[inline]
#[must_use]
pub fn scan_false(data: &[u8], i: usize) -> (usize, bool) {
    scan_literal(data, i, b"alse")
}

/// Matches the tail of `null`; the leading `n` sits at `i - 1`.
#[inline]
#[must_use]
pub fn scan_null(data: &[u8], i: usize) -> (usize, bool) {
    scan_literal(data, i, b"ull")
}

fn scan_literal(data: &[u8], i: usize, rest: &[u8]) -> (usize, bool) {
    match data.get(i..i + rest.len()) {
        Some(window) if window == rest => (i + rest.len(), true),
        _ => (i, false),
    }
}

/// Counts Unicode scalar values in `bytes`.
///
/// Invalid sequences count as one replacement character each, so a hostile
/// payload cannot shrink its measured length by being malformed.
#[must_use]
pub fn utf8_len(bytes: &[u8]) -> usize {
    bytes.chars().count()
}

/// Whether the byte at `pos` is escaped, i.e. preceded by an odd run of
/// backslashes.
#[must_use]
pub fn is_escaped(data: &[u8], pos: usize) -> bool {
    data[..pos].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1
}
