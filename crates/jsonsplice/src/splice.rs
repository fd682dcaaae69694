//! Path-addressed set and delete over raw JSON bytes.
//!
//! The engine walks the path one segment at a time. Each segment is located
//! inside the span the previous one resolved to, and the edit is written by
//! copying everything around that span verbatim, so formatting and sibling
//! values survive untouched. Missing segments are synthesized with the
//! container builder and injected before the closing bracket of the deepest
//! container that does exist.

use alloc::{borrow::Cow, string::String, vec::Vec};
use core::{cmp::Reverse, ops::Range};

use bstr::ByteSlice;

use crate::{
    builder::{append_build, append_null_padding},
    error::SpliceError,
    locate::{count_elements, skip_value, Locate, LocateOptions, PathLocator},
    options::SetOptions,
    path::{segment, ComplexPath, PathSegment},
    scan::{is_escaped, skip_space},
    value::SetValue,
};

/// Why an edit stopped short of producing a new document.
enum Halt {
    /// Nothing to do; the caller hands back the input.
    Unchanged,
    Failed(SpliceError),
}

impl From<SpliceError> for Halt {
    fn from(err: SpliceError) -> Self {
        Halt::Failed(err)
    }
}

type Spliced<T> = Result<T, Halt>;

#[derive(Clone, Copy)]
enum Edit<'e> {
    Set(&'e SetValue<'e>),
    Delete,
}

/// The set/delete engine, parameterised over how paths are resolved.
///
/// The free functions ([`set`](crate::set), [`delete`](crate::delete), ...)
/// use `Splicer::<PathLocator>::default()`. Plug in another [`Locate`] to
/// resolve paths differently:
///
/// ```rust
/// use jsonsplice::{PathLocator, SetOptions, SetValue, Splicer};
///
/// let splicer = Splicer::new(PathLocator);
/// let json = splicer
///     .set(br#"{"a":1}"#, "b.c", &SetValue::from(true), SetOptions::default())
///     .unwrap();
/// assert_eq!(json, br#"{"a":1,"b":{"c":true}}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Splicer<L = PathLocator> {
    locator: L,
}

impl<L: Locate> Splicer<L> {
    /// Creates an engine resolving paths with `locator`.
    pub const fn new(locator: L) -> Self {
        Self { locator }
    }

    /// Returns `json` with the value at `path` replaced by `value`, creating
    /// any missing objects and arrays on the way.
    ///
    /// A wildcard or query path replaces every value it matches and never
    /// creates anything; when it matches nothing the input comes back as is.
    ///
    /// # Errors
    ///
    /// See [`SpliceError`].
    pub fn set(
        &self,
        json: &[u8],
        path: &str,
        value: &SetValue<'_>,
        opts: SetOptions,
    ) -> Result<Vec<u8>, SpliceError> {
        unchanged_or(json, self.run(json, path, Edit::Set(value), opts))
    }

    /// Returns `json` without the value at `path`, together with the key (in
    /// an object) and one separating comma.
    ///
    /// A path that does not exist is not an error; the input comes back as
    /// is.
    ///
    /// # Errors
    ///
    /// See [`SpliceError`].
    pub fn delete(&self, json: &[u8], path: &str, opts: SetOptions) -> Result<Vec<u8>, SpliceError> {
        unchanged_or(json, self.run(json, path, Edit::Delete, opts))
    }

    /// Like [`set`](Self::set), but edits `json` itself.
    ///
    /// With [`SetOptions::optimistic`] and [`SetOptions::replace_in_place`]
    /// both on, an existing value is overwritten inside the buffer by
    /// shifting the bytes after it; nothing else is allocated unless the
    /// document outgrows the buffer's capacity. In every other case the
    /// buffer receives the freshly built document. On error the buffer is
    /// left as it was.
    ///
    /// # Errors
    ///
    /// See [`SpliceError`].
    pub fn set_in_place(
        &self,
        json: &mut Vec<u8>,
        path: &str,
        value: &SetValue<'_>,
        opts: SetOptions,
    ) -> Result<(), SpliceError> {
        if opts.optimistic && opts.replace_in_place && !path.is_empty() {
            if let Some(span) = self.optimistic_span(json, path, opts) {
                replace_range(json, span, &value.encoded());
                return Ok(());
            }
        }
        match self.run(json, path, Edit::Set(value), opts) {
            Ok(out) => {
                *json = out;
                Ok(())
            }
            Err(Halt::Unchanged) => Ok(()),
            Err(Halt::Failed(err)) => Err(err),
        }
    }

    fn run(&self, json: &[u8], path: &str, edit: Edit<'_>, opts: SetOptions) -> Spliced<Vec<u8>> {
        if path.is_empty() {
            return Err(SpliceError::EmptyPath.into());
        }
        if let Edit::Set(value) = edit {
            if opts.optimistic {
                if let Some(span) = self.optimistic_span(json, path, opts) {
                    return Ok(splice(json, span, &value.encoded()));
                }
            }
        }
        match segment(path, opts.raw_path) {
            Ok(segments) => {
                let mut buf = Vec::with_capacity(json.len());
                self.append_paths(&mut buf, json, &segments, edit, opts)?;
                Ok(buf)
            }
            Err(ComplexPath) => match edit {
                Edit::Delete => Err(SpliceError::ComplexDelete.into()),
                Edit::Set(value) => self.set_matches(json, path, value),
            },
        }
    }

    /// A single locate of the whole path, for paths that cannot contain
    /// query syntax.
    fn optimistic_span(&self, json: &[u8], path: &str, opts: SetOptions) -> Option<Range<usize>> {
        if !is_optimistic_path(path, opts.raw_path) {
            return None;
        }
        let found = self.locator.locate(
            json,
            path,
            LocateOptions {
                raw_path: opts.raw_path,
                disable_negative_index: true,
            },
        );
        if found.exists { found.span() } else { None }
    }

    fn append_paths(
        &self,
        buf: &mut Vec<u8>,
        json: &[u8],
        segments: &[PathSegment<'_>],
        edit: Edit<'_>,
        opts: SetOptions,
    ) -> Spliced<()> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(());
        };
        let delete = matches!(edit, Edit::Delete);
        let found = self.locator.locate(
            json,
            &head.source,
            LocateOptions {
                raw_path: opts.raw_path,
                // on delete `-1` names the last element; on set it appends
                disable_negative_index: !(delete && head.is_append()),
            },
        );
        let span = if found.exists { found.span() } else { None };

        let Some(span) = span else {
            return match edit {
                Edit::Delete => Err(Halt::Unchanged),
                Edit::Set(value) => insert_missing(buf, json, segments, value),
            };
        };

        buf.extend_from_slice(&json[..span.start]);
        if !rest.is_empty() {
            self.append_paths(buf, &json[span.clone()], rest, edit, opts)?;
            buf.extend_from_slice(&json[span.end..]);
            return Ok(());
        }
        let mut tail = span.end;
        match edit {
            Edit::Set(value) => value.append_to(buf),
            Edit::Delete => {
                if delete_tail_item(buf) {
                    let next = skip_space(json, tail);
                    if json.get(next) == Some(&b',') {
                        tail = next + 1;
                    }
                }
            }
        }
        buf.extend_from_slice(&json[tail..]);
        Ok(())
    }

    /// Replaces every value a wildcard or query path matches.
    fn set_matches(&self, json: &[u8], path: &str, value: &SetValue<'_>) -> Spliced<Vec<u8>> {
        let found = self.locator.locate(json, path, LocateOptions::default());
        if !found.exists {
            return Err(Halt::Unchanged);
        }
        let encoded = value.encoded();
        if let Some(span) = found.span() {
            return Ok(splice(json, span, &encoded));
        }
        if found.matches.is_empty() {
            return Err(Halt::Unchanged);
        }
        let mut spans = found.matches;
        // back to front, so earlier offsets stay valid
        spans.sort_by_key(|span| Reverse(span.start));
        let mut out = json.to_vec();
        let mut floor = usize::MAX;
        for span in spans {
            // a span enclosing one already written is left alone
            if span.end > floor {
                continue;
            }
            floor = span.start;
            replace_range(&mut out, span, &encoded);
        }
        Ok(out)
    }
}

fn unchanged_or(json: &[u8], result: Spliced<Vec<u8>>) -> Result<Vec<u8>, SpliceError> {
    match result {
        Ok(out) => Ok(out),
        Err(Halt::Unchanged) => Ok(json.to_vec()),
        Err(Halt::Failed(err)) => Err(err),
    }
}

/// Paths made only of `.`, digits, letters and a little punctuation can be
/// handed to the locator as a whole.
fn is_optimistic_path(path: &str, raw_path: bool) -> bool {
    raw_path
        || path
            .bytes()
            .all(|b| (b'.'..=b'z').contains(&b) && !(b':'..=b'@').contains(&b))
}

fn splice(json: &[u8], span: Range<usize>, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(json.len() - span.len() + value.len());
    out.extend_from_slice(&json[..span.start]);
    out.extend_from_slice(value);
    out.extend_from_slice(&json[span.end..]);
    out
}

/// Overwrites `span` with `value` inside `buf`, shifting the tail.
fn replace_range(buf: &mut Vec<u8>, span: Range<usize>, value: &[u8]) {
    let old_len = buf.len();
    let new_len = old_len - span.len() + value.len();
    let value_end = span.start + value.len();
    if value.len() <= span.len() {
        buf[span.start..value_end].copy_from_slice(value);
        buf.copy_within(span.end..old_len, value_end);
        buf.truncate(new_len);
    } else {
        buf.resize(new_len, 0);
        buf.copy_within(span.end..old_len, value_end);
        buf[span.start..value_end].copy_from_slice(value);
    }
}

/// Removes the separator (and, in an object, the key) written just before a
/// deleted value.
///
/// Returns `true` when the value was the first in its container, in which
/// case the comma after it has to go instead.
fn delete_tail_item(buf: &mut Vec<u8>) -> bool {
    for i in (0..buf.len()).rev() {
        match buf[i] {
            b'[' => return true,
            b',' => {
                buf.truncate(i);
                return false;
            }
            b':' => return strip_key(buf, i),
            _ => {}
        }
    }
    false
}

fn strip_key(buf: &mut Vec<u8>, colon: usize) -> bool {
    let Some(close) = buf[..colon].iter().rposition(|&b| b == b'"') else {
        return false;
    };
    let mut end = close;
    let open = loop {
        let Some(quote) = buf[..end].iter().rposition(|&b| b == b'"') else {
            return false;
        };
        if !is_escaped(buf, quote) {
            break quote;
        }
        end = quote;
    };
    for k in (0..open).rev() {
        match buf[k] {
            b'{' => {
                buf.truncate(k + 1);
                return true;
            }
            b',' => {
                buf.truncate(k);
                return false;
            }
            _ => {}
        }
    }
    false
}

/// Creates `segments` under the container `json` holds.
///
/// An empty document, or one holding a scalar, is first replaced with `[]`
/// when the segment is an index and `{}` otherwise. Whitespace around the
/// root is kept.
fn insert_missing(
    buf: &mut Vec<u8>,
    json: &[u8],
    segments: &[PathSegment<'_>],
    value: &SetValue<'_>,
) -> Spliced<()> {
    let Some(head) = segments.first() else {
        return Ok(());
    };
    let index = head.index();
    let fallback: &[u8] = if index.is_some() { b"[]" } else { b"{}" };

    let start = skip_space(json, 0);
    let (root, trail): (&[u8], &[u8]) = match json.get(start) {
        None => (fallback, &[]),
        Some(b'{' | b'[') => {
            let end = skip_value(json, start);
            (&json[start..end], &json[end..])
        }
        Some(b'"' | b'-' | b'0'..=b'9' | b't' | b'f' | b'n') => {
            (fallback, &json[skip_value(json, start)..])
        }
        Some(_) => return Err(SpliceError::NotContainer.into()),
    };
    let (open, close_byte) = match root.first() {
        Some(b'{') => (b'{', b'}'),
        Some(b'[') => (b'[', b']'),
        _ => return Err(SpliceError::NotContainer.into()),
    };
    let Some(close) = root.iter().rposition(|&b| b == close_byte) else {
        return Err(SpliceError::NotContainer.into());
    };
    let comma = root
        .get(skip_space(root, 1))
        .is_some_and(|&b| b != b'}' && b != b']');

    buf.extend_from_slice(&json[..start]);
    buf.extend_from_slice(&root[..close]);
    if open == b'{' {
        if comma {
            buf.push(b',');
        }
        append_build(buf, false, segments, value)?;
    } else {
        match index {
            Some(n) => {
                let len = count_elements(root, 0);
                if len == 0 {
                    append_null_padding(buf, true, n)?;
                } else {
                    append_null_padding(buf, false, n.saturating_sub(len))?;
                    if comma {
                        buf.push(b',');
                    }
                }
            }
            None if head.is_append() => {
                if comma {
                    buf.push(b',');
                }
            }
            None => return Err(SpliceError::NonNumericIndex(head.text.clone().into_owned()).into()),
        }
        append_build(buf, true, segments, value)?;
    }
    buf.push(close_byte);
    buf.extend_from_slice(trail);
    Ok(())
}

fn into_string(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.as_bytes().to_str_lossy().into_owned(),
    }
}

/// Sets the value at `path`, creating missing objects and arrays.
///
/// Strings and Rust scalars convert into [`SetValue`] directly; use
/// [`set_raw`] to splice pre-encoded JSON.
///
/// ```rust
/// let json = jsonsplice::set(br#"{"name":{"last":"Anderson"}}"#, "name.first", "Tom").unwrap();
/// assert_eq!(json, br#"{"name":{"last":"Anderson","first":"Tom"}}"#);
///
/// let json = jsonsplice::set(b"[]", "2", 5).unwrap();
/// assert_eq!(json, b"[null,null,5]");
/// ```
///
/// # Errors
///
/// See [`SpliceError`].
pub fn set<'v>(json: &[u8], path: &str, value: impl Into<SetValue<'v>>) -> Result<Vec<u8>, SpliceError> {
    set_with(json, path, value, SetOptions::default())
}

/// [`set`] with options.
///
/// # Errors
///
/// See [`SpliceError`].
pub fn set_with<'v>(
    json: &[u8],
    path: &str,
    value: impl Into<SetValue<'v>>,
    opts: SetOptions,
) -> Result<Vec<u8>, SpliceError> {
    Splicer::<PathLocator>::default().set(json, path, &value.into(), opts)
}

/// [`set`] over text.
///
/// # Errors
///
/// See [`SpliceError`].
pub fn set_str<'v>(json: &str, path: &str, value: impl Into<SetValue<'v>>) -> Result<String, SpliceError> {
    set_str_with(json, path, value, SetOptions::default())
}

/// [`set_with`] over text. [`SetOptions::replace_in_place`] has no effect.
///
/// # Errors
///
/// See [`SpliceError`].
pub fn set_str_with<'v>(
    json: &str,
    path: &str,
    value: impl Into<SetValue<'v>>,
    opts: SetOptions,
) -> Result<String, SpliceError> {
    set_with(json.as_bytes(), path, value, opts).map(into_string)
}

/// Sets the value at `path` to the pre-encoded JSON `raw`, byte for byte.
///
/// ```rust
/// let json = jsonsplice::set_raw(br#"{"a":1}"#, "a", br#"{"b":[2]}"#).unwrap();
/// assert_eq!(json, br#"{"a":{"b":[2]}}"#);
/// ```
///
/// # Errors
///
/// See [`SpliceError`].
pub fn set_raw(json: &[u8], path: &str, raw: &[u8]) -> Result<Vec<u8>, SpliceError> {
    set_raw_with(json, path, raw, SetOptions::default())
}

/// [`set_raw`] with options.
///
/// # Errors
///
/// See [`SpliceError`].
pub fn set_raw_with(json: &[u8], path: &str, raw: &[u8], opts: SetOptions) -> Result<Vec<u8>, SpliceError> {
    set_with(json, path, SetValue::Raw(Cow::Borrowed(raw)), opts)
}

/// [`set_raw`] over text.
///
/// # Errors
///
/// See [`SpliceError`].
pub fn set_raw_str(json: &str, path: &str, raw: &str) -> Result<String, SpliceError> {
    set_raw(json.as_bytes(), path, raw.as_bytes()).map(into_string)
}

/// Edits `json` in place; see [`Splicer::set_in_place`].
///
/// ```rust
/// use jsonsplice::SetOptions;
///
/// let mut json = br#"{"count":100,"ok":true}"#.to_vec();
/// let opts = SetOptions { optimistic: true, replace_in_place: true, ..Default::default() };
/// jsonsplice::set_in_place(&mut json, "count", 7, opts).unwrap();
/// assert_eq!(json, br#"{"count":7,"ok":true}"#);
/// ```
///
/// # Errors
///
/// See [`SpliceError`].
pub fn set_in_place<'v>(
    json: &mut Vec<u8>,
    path: &str,
    value: impl Into<SetValue<'v>>,
    opts: SetOptions,
) -> Result<(), SpliceError> {
    Splicer::<PathLocator>::default().set_in_place(json, path, &value.into(), opts)
}

/// Deletes the value at `path`.
///
/// ```rust
/// let json = jsonsplice::delete(br#"{"a":1,"b":2}"#, "a").unwrap();
/// assert_eq!(json, br#"{"b":2}"#);
///
/// let json = jsonsplice::delete(br#"{"a":1}"#, "missing").unwrap();
/// assert_eq!(json, br#"{"a":1}"#);
/// ```
///
/// # Errors
///
/// See [`SpliceError`].
pub fn delete(json: &[u8], path: &str) -> Result<Vec<u8>, SpliceError> {
    delete_with(json, path, SetOptions::default())
}

/// [`delete`] with options.
///
/// # Errors
///
/// See [`SpliceError`].
pub fn delete_with(json: &[u8], path: &str, opts: SetOptions) -> Result<Vec<u8>, SpliceError> {
    Splicer::<PathLocator>::default().delete(json, path, opts)
}

/// [`delete`] over text.
///
/// # Errors
///
/// See [`SpliceError`].
pub fn delete_str(json: &str, path: &str) -> Result<String, SpliceError> {
    delete(json.as_bytes(), path).map(into_string)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::locate::Located;

    #[rstest]
    #[case(r#"{"a":1,"b":"#, r#"{"a":1"#, false)]
    #[case(r#"{"a":"#, "{", true)]
    #[case(r#"{ "a" :"#, "{", true)]
    #[case(r#"{"x":0, "q\"k":"#, r#"{"x":0"#, false)]
    #[case("[", "[", true)]
    #[case("[1, ", "[1", false)]
    fn tail_items(#[case] prefix: &str, #[case] expected: &str, #[case] first: bool) {
        let mut buf = prefix.as_bytes().to_vec();
        assert_eq!(delete_tail_item(&mut buf), first);
        assert_eq!(buf, expected.as_bytes());
    }

    #[test]
    fn replace_range_shrinks_and_grows() {
        let mut buf = b"[100,2]".to_vec();
        replace_range(&mut buf, 1..4, b"7");
        assert_eq!(buf, b"[7,2]");
        replace_range(&mut buf, 1..2, b"12345");
        assert_eq!(buf, b"[12345,2]");
        replace_range(&mut buf, 7..8, b"");
        assert_eq!(buf, b"[12345,]");
    }

    #[test]
    fn optimistic_path_chars() {
        assert!(is_optimistic_path("name.last", false));
        assert!(is_optimistic_path("a.0.b_c", false));
        assert!(!is_optimistic_path("a-b", false));
        assert!(!is_optimistic_path("a:b", false));
        assert!(!is_optimistic_path("a b", false));
        assert!(!is_optimistic_path("friends.#", false));
        assert!(is_optimistic_path("a b#", true));
    }

    #[test]
    fn matches_splice_back_to_front() {
        let json = br#"{"f":[{"a":1},{"a":22},{"a":333}]}"#;
        let out = Splicer::<PathLocator>::default()
            .set(json, "f.#.a", &SetValue::from(0u8), SetOptions::default())
            .unwrap();
        assert_eq!(out, br#"{"f":[{"a":0},{"a":0},{"a":0}]}"#);
    }

    struct Nested;

    impl Locate for Nested {
        fn locate<'a>(&self, _: &'a [u8], _: &str, _: LocateOptions) -> Located<'a> {
            Located {
                exists: true,
                matches: alloc::vec![5..12, 10..11, 17..18],
                ..Located::missing()
            }
        }
    }

    #[test]
    fn enclosed_match_wins_over_enclosing_one() {
        let json = br#"{"a":{"b":1},"c":2}"#;
        let out = Splicer::new(Nested)
            .set(json, "*.b", &SetValue::from(0u8), SetOptions::default())
            .unwrap();
        assert_eq!(out, br#"{"a":{"b":0},"c":0}"#);
    }

    #[test]
    fn errors_leave_in_place_buffer_alone() {
        let mut json = b"[1,2]".to_vec();
        let err = set_in_place(&mut json, "x", 1, SetOptions::default()).unwrap_err();
        assert_eq!(err, SpliceError::NonNumericIndex("x".into()));
        assert_eq!(json, b"[1,2]");
    }
}
