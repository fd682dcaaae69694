//! Synthesis of the containers a set operation has to create.

use alloc::vec::Vec;

use crate::{error::SpliceError, path::PathSegment, value::SetValue};

/// Whether `s` cannot be written between two quotes as is.
pub(crate) fn must_escape(s: &str) -> bool {
    s.bytes()
        .any(|b| b < b' ' || b >= 0x7f || b == b'"' || b == b'\\')
}

/// Appends `s` as a JSON string literal.
///
/// Printable ASCII is copied; the short escapes are used where JSON has them;
/// everything else becomes `\uXXXX`, split into UTF-16 surrogates above the
/// basic plane.
pub(crate) fn append_stringify(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    if !must_escape(s) {
        buf.extend_from_slice(s.as_bytes());
        buf.push(b'"');
        return;
    }
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(br#"\""#),
            '\\' => buf.extend_from_slice(br"\\"),
            '\u{08}' => buf.extend_from_slice(br"\b"),
            '\u{0c}' => buf.extend_from_slice(br"\f"),
            '\n' => buf.extend_from_slice(br"\n"),
            '\r' => buf.extend_from_slice(br"\r"),
            '\t' => buf.extend_from_slice(br"\t"),
            ' '..='~' => buf.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes()),
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    append_unicode_escape(buf, *unit);
                }
            }
        }
    }
    buf.push(b'"');
}

fn append_unicode_escape(buf: &mut Vec<u8>, unit: u16) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    buf.extend_from_slice(br"\u");
    for shift in [12u16, 8, 4, 0] {
        buf.push(HEX[usize::from((unit >> shift) & 0xf)]);
    }
}

/// Appends `s` `n` times, failing instead of aborting when the result
/// cannot be allocated.
fn append_repeat(buf: &mut Vec<u8>, s: &[u8], n: usize) -> Result<(), SpliceError> {
    let len = s
        .len()
        .checked_mul(n)
        .ok_or(SpliceError::PaddingTooLarge(n))?;
    buf.try_reserve(len)
        .map_err(|_| SpliceError::PaddingTooLarge(n))?;
    for _ in 0..n {
        buf.extend_from_slice(s);
    }
    Ok(())
}

/// Appends the skeleton for `segments`, ending in `value`.
///
/// Outside an array the first segment is written as a key header. The shape
/// of each nested container is decided by the segment that addresses into
/// it: a numeric index or the append marker opens an array padded with
/// `null`s, anything else opens an object.
pub(crate) fn append_build(
    buf: &mut Vec<u8>,
    in_array: bool,
    segments: &[PathSegment<'_>],
    value: &SetValue<'_>,
) -> Result<(), SpliceError> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };
    if !in_array {
        append_stringify(buf, &head.text);
        buf.push(b':');
    }
    match rest.first() {
        None => value.append_to(buf),
        Some(next) => match next.index() {
            Some(n) => {
                buf.push(b'[');
                append_repeat(buf, b"null,", n)?;
                append_build(buf, true, rest, value)?;
                buf.push(b']');
            }
            None if next.is_append() => {
                buf.push(b'[');
                append_build(buf, true, rest, value)?;
                buf.push(b']');
            }
            None => {
                buf.push(b'{');
                append_build(buf, false, rest, value)?;
                buf.push(b'}');
            }
        },
    }
    Ok(())
}

/// Builds the smallest document that holds `value` at `segments`.
///
/// ```rust
/// use jsonsplice::{build, segment, SetValue};
///
/// let segments = segment("users.1.name", false).unwrap();
/// let doc = build(&segments, &SetValue::from("ada")).unwrap();
/// assert_eq!(doc, br#"{"users":[null,{"name":"ada"}]}"#);
/// ```
///
/// # Errors
///
/// Returns [`SpliceError::PaddingTooLarge`] when an index asks for more
/// `null` padding than can be allocated.
pub fn build(
    segments: &[PathSegment<'_>],
    value: &SetValue<'_>,
) -> Result<Vec<u8>, SpliceError> {
    let mut buf = Vec::new();
    let Some(first) = segments.first() else {
        value.append_to(&mut buf);
        return Ok(buf);
    };
    match first.index() {
        Some(n) => {
            buf.push(b'[');
            append_repeat(&mut buf, b"null,", n)?;
            append_build(&mut buf, true, segments, value)?;
            buf.push(b']');
        }
        None if first.is_append() => {
            buf.push(b'[');
            append_build(&mut buf, true, segments, value)?;
            buf.push(b']');
        }
        None => {
            buf.push(b'{');
            append_build(&mut buf, false, segments, value)?;
            buf.push(b'}');
        }
    }
    Ok(buf)
}

pub(crate) fn append_null_padding(
    buf: &mut Vec<u8>,
    leading: bool,
    n: usize,
) -> Result<(), SpliceError> {
    if leading {
        append_repeat(buf, b"null,", n)
    } else {
        append_repeat(buf, b",null", n)
    }
}
