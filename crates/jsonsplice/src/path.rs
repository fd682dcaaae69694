use alloc::{borrow::Cow, string::String, vec::Vec};

/// One component of a mutation path.
///
/// `text` is the component with path escapes removed and is what gets written
/// when a missing key has to be created. `source` keeps the escapes exactly as
/// written and is what the locator is queried with, so both views refer to
/// the same key character for character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment<'p> {
    /// The component with backslash escapes stripped.
    pub text: Cow<'p, str>,
    /// The component as written, escapes included.
    pub source: Cow<'p, str>,
    /// Set by a leading `:`; the component is always an object key, even when
    /// it looks like an array index.
    pub forced: bool,
    /// Whether further components follow this one.
    pub more: bool,
}

impl PathSegment<'_> {
    /// The array index this component addresses, if it is a plain unsigned
    /// decimal and not forced to be a key.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        if self.forced || self.text.is_empty() {
            return None;
        }
        self.text.bytes().try_fold(0usize, |n, b| {
            if b.is_ascii_digit() {
                n.checked_mul(10)?.checked_add(usize::from(b - b'0'))
            } else {
                None
            }
        })
    }

    /// Whether this component is the unforced `-1`, meaning "append" on set
    /// and "last element" on delete.
    #[must_use]
    pub fn is_append(&self) -> bool {
        !self.forced && self.text == "-1"
    }
}

/// Returned by [`segment`] when the path uses syntax reserved for the query
/// language (`|`, `#`, `@`, `*`, `?`) and needs the multi-match strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexPath;

/// Splits a mutation path into segments.
///
/// In raw mode the whole path is a single literal key. Otherwise an unescaped
/// `.` separates components, a backslash escapes the character that follows
/// it, and a leading `:` on a component forces it to be treated as a key.
///
/// # Errors
///
/// Returns [`ComplexPath`] when an unescaped query character appears.
pub fn segment(path: &str, raw_path: bool) -> Result<Vec<PathSegment<'_>>, ComplexPath> {
    if raw_path {
        return Ok(alloc::vec![PathSegment {
            text: Cow::Borrowed(path),
            source: Cow::Borrowed(path),
            forced: false,
            more: false,
        }]);
    }
    let mut segments = Vec::new();
    let mut rest = path;
    loop {
        let (segment, tail) = next_segment(rest)?;
        segments.push(segment);
        match tail {
            Some(tail) => rest = tail,
            None => return Ok(segments),
        }
    }
}

fn next_segment(path: &str) -> Result<(PathSegment<'_>, Option<&str>), ComplexPath> {
    let (forced, path) = match path.strip_prefix(':') {
        Some(stripped) => (true, stripped),
        None => (false, path),
    };
    // Only allocated once the first escape shows up.
    let mut escaped: Option<(String, String)> = None;
    let mut chars = path.char_indices();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '.' => {
                let segment = finish(&path[..i], escaped, forced, true);
                return Ok((segment, Some(&path[i + 1..])));
            }
            '|' | '#' | '@' | '*' | '?' => return Err(ComplexPath),
            '\\' => {
                let (text, source) = escaped
                    .get_or_insert_with(|| (String::from(&path[..i]), String::from(&path[..i])));
                source.push('\\');
                if let Some((_, next)) = chars.next() {
                    text.push(next);
                    source.push(next);
                }
            }
            _ => {
                if let Some((text, source)) = &mut escaped {
                    text.push(ch);
                    source.push(ch);
                }
            }
        }
    }
    Ok((finish(path, escaped, forced, false), None))
}

fn finish<'p>(
    plain: &'p str,
    escaped: Option<(String, String)>,
    forced: bool,
    more: bool,
) -> PathSegment<'p> {
    let (text, source) = match escaped {
        Some((text, source)) => (Cow::Owned(text), Cow::Owned(source)),
        None => (Cow::Borrowed(plain), Cow::Borrowed(plain)),
    };
    PathSegment {
        text,
        source,
        forced,
        more,
    }
}
