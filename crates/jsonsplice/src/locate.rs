//! Finding values by path.
//!
//! The splice engine never parses the document; it asks a [`Locate`]
//! implementation where the addressed value lives and edits around that byte
//! range. [`PathLocator`] is the built-in implementation and understands the
//! read-side path language:
//!
//! ```text
//! name.last          object keys, separated by `.` (or `|`)
//! child*.2  c?ild    `*` and `?` wildcards in keys
//! a\.b               `\` escapes the next character
//! children.1         array index
//! children.-1        last element
//! children.#         element count
//! friends.#.age      `age` of every element
//! friends.#(age>40)  first element matching a query
//! friends.#(age>40)# every element matching a query
//! ```
//!
//! Everything here is lenient: the document is assumed to be well formed and
//! malformed input makes a lookup fail rather than error out.

use alloc::{borrow::Cow, format, string::String, vec::Vec};
use core::ops::Range;

use bstr::ByteSlice;

use crate::scan::{is_space, skip_space};

/// Options for a single lookup.
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocateOptions {
    /// Treat the entire path as one literal key (or index, on an array).
    pub raw_path: bool,
    /// Do not resolve `-1` to the last array element.
    pub disable_negative_index: bool,
}

/// The outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<'a> {
    /// Whether the path addressed anything.
    pub exists: bool,
    /// Byte offset of the value within the searched document. `None` when
    /// nothing was found or the result was synthesized (a count, or the
    /// values collected by a fan-out path).
    pub offset: Option<usize>,
    /// The value's bytes: borrowed from the document when it has an offset,
    /// owned otherwise.
    pub raw: Cow<'a, [u8]>,
    /// For fan-out paths, the byte range of every collected value.
    pub matches: Vec<Range<usize>>,
}

impl Located<'_> {
    /// Nothing found.
    #[must_use]
    pub fn missing() -> Self {
        Located {
            exists: false,
            offset: None,
            raw: Cow::Borrowed(&[]),
            matches: Vec::new(),
        }
    }

    /// The byte range of a single located value, if there is one.
    #[must_use]
    pub fn span(&self) -> Option<Range<usize>> {
        self.offset.map(|start| start..start + self.raw.len())
    }
}

/// Finds the bytes a path refers to.
pub trait Locate {
    /// Looks `path` up in `json`.
    fn locate<'a>(&self, json: &'a [u8], path: &str, opts: LocateOptions) -> Located<'a>;
}

/// The built-in [`Locate`] implementation.
///
/// ```rust
/// use jsonsplice::{Locate, LocateOptions, PathLocator};
///
/// let json = br#"{"friends":[{"name":"Dale","age":44},{"name":"Roger","age":68}]}"#;
/// let found = PathLocator.locate(json, "friends.#(age>50).name", LocateOptions::default());
/// assert_eq!(found.raw.as_ref(), br#""Roger""#);
/// assert_eq!(found.offset, Some(45));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathLocator;

impl Locate for PathLocator {
    fn locate<'a>(&self, json: &'a [u8], path: &str, opts: LocateOptions) -> Located<'a> {
        if path.is_empty() {
            return Located::missing();
        }
        let start = skip_space(json, 0);
        let hit = if opts.raw_path {
            let component = Component::literal(path);
            lookup_component(json, start, &component, None, opts)
        } else {
            lookup(json, start, path, opts)
        };
        match hit {
            Hit::Miss => Located::missing(),
            Hit::Span(span) => Located {
                exists: true,
                offset: Some(span.start),
                raw: Cow::Borrowed(&json[span]),
                matches: Vec::new(),
            },
            Hit::Synth(raw) => Located {
                exists: true,
                offset: None,
                raw: Cow::Owned(raw),
                matches: Vec::new(),
            },
            Hit::Many { raw, matches } => Located {
                exists: true,
                offset: None,
                raw: Cow::Owned(raw),
                matches,
            },
        }
    }
}

enum Hit {
    Miss,
    Span(Range<usize>),
    Synth(Vec<u8>),
    Many {
        raw: Vec<u8>,
        matches: Vec<Range<usize>>,
    },
}

impl Hit {
    fn exists(&self) -> bool {
        !matches!(self, Hit::Miss)
    }
}

/// Collects fan-out results into a composite JSON array.
struct Gather {
    raw: Vec<u8>,
    matches: Vec<Range<usize>>,
}

impl Gather {
    fn new() -> Self {
        Gather {
            raw: alloc::vec![b'['],
            matches: Vec::new(),
        }
    }

    fn push(&mut self, json: &[u8], hit: Hit) {
        let bytes: Cow<'_, [u8]> = match hit {
            Hit::Miss => return,
            Hit::Span(span) => {
                self.matches.push(span.clone());
                Cow::Borrowed(&json[span])
            }
            Hit::Synth(raw) => Cow::Owned(raw),
            Hit::Many { raw, matches } => {
                self.matches.extend(matches);
                Cow::Owned(raw)
            }
        };
        if self.raw.len() > 1 {
            self.raw.push(b',');
        }
        self.raw.extend_from_slice(&bytes);
    }

    fn finish(mut self) -> Hit {
        self.raw.push(b']');
        Hit::Many {
            raw: self.raw,
            matches: self.matches,
        }
    }
}

/// One path component.
struct Component<'p> {
    /// As written, escapes included.
    source: &'p str,
    /// Escapes removed.
    text: Cow<'p, str>,
    /// Contains unescaped `*` or `?`.
    pattern: bool,
}

impl<'p> Component<'p> {
    fn literal(path: &'p str) -> Self {
        Component {
            source: path,
            text: Cow::Borrowed(path),
            pattern: false,
        }
    }

    fn parse(source: &'p str) -> Self {
        let mut pattern = false;
        let mut escaped = false;
        let mut chars = source.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => {
                    escaped = true;
                    chars.next();
                }
                '*' | '?' => pattern = true,
                _ => {}
            }
        }
        let text = if escaped {
            let mut text = String::with_capacity(source.len());
            let mut chars = source.chars();
            while let Some(ch) = chars.next() {
                if ch == '\\' {
                    if let Some(next) = chars.next() {
                        text.push(next);
                    }
                } else {
                    text.push(ch);
                }
            }
            Cow::Owned(text)
        } else {
            Cow::Borrowed(source)
        };
        Component {
            source,
            text,
            pattern,
        }
    }

    fn matches_key(&self, key: &str) -> bool {
        if self.pattern {
            glob_match(self.source, key)
        } else {
            self.text == key
        }
    }
}

/// Splits off the first component of `path`, honoring escapes and the
/// parentheses of a query.
fn split_component(path: &str) -> (&str, Option<&str>) {
    let bytes = path.as_bytes();
    let mut i = 0;
    if path.starts_with("#(") {
        i = query_end(bytes, 2);
        if bytes.get(i) == Some(&b'#') {
            i += 1;
        }
    }
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'.' | b'|' => return (&path[..i], Some(&path[i + 1..])),
            _ => {}
        }
        i += 1;
    }
    (path, None)
}

/// Offset just past the `)` closing a query body that starts at `i`.
fn query_end(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn lookup(json: &[u8], i: usize, path: &str, opts: LocateOptions) -> Hit {
    let (source, rest) = split_component(path);
    if source.starts_with('@') || source.starts_with('!') {
        // modifiers belong to the read-side query language
        return Hit::Miss;
    }
    lookup_component(json, i, &Component::parse(source), rest, opts)
}

fn lookup_component(
    json: &[u8],
    i: usize,
    component: &Component<'_>,
    rest: Option<&str>,
    opts: LocateOptions,
) -> Hit {
    match json.get(i) {
        Some(b'{') => {
            let mut hit = Hit::Miss;
            for_each_member(json, i, |key, value| {
                if component.matches_key(&key_text(&json[key])) {
                    hit = descend(json, value, rest, opts);
                }
                !hit.exists()
            });
            hit
        }
        Some(b'[') => lookup_array(json, i, component, rest, opts),
        _ => Hit::Miss,
    }
}

fn descend(json: &[u8], value: Range<usize>, rest: Option<&str>, opts: LocateOptions) -> Hit {
    match rest {
        None => Hit::Span(value),
        Some(rest) => lookup(json, value.start, rest, opts),
    }
}

fn lookup_array(
    json: &[u8],
    i: usize,
    component: &Component<'_>,
    rest: Option<&str>,
    opts: LocateOptions,
) -> Hit {
    let source = component.source;
    if source == "#" {
        return match rest {
            None => Hit::Synth(format!("{}", count_elements(json, i)).into_bytes()),
            Some(rest) => {
                let mut gather = Gather::new();
                for_each_element(json, i, |element| {
                    gather.push(json, lookup(json, element.start, rest, opts));
                    true
                });
                gather.finish()
            }
        };
    }
    if let Some(body) = source.strip_prefix("#(") {
        let (body, all) = match body.strip_suffix(")#") {
            Some(body) => (body, true),
            None => (body.strip_suffix(')').unwrap_or(body), false),
        };
        let query = Query::parse(body);
        if all {
            let mut gather = Gather::new();
            for_each_element(json, i, |element| {
                if query.matches(json, element.clone(), opts) {
                    gather.push(json, descend(json, element, rest, opts));
                }
                true
            });
            return gather.finish();
        }
        let mut hit = Hit::Miss;
        for_each_element(json, i, |element| {
            if query.matches(json, element.clone(), opts) {
                hit = descend(json, element, rest, opts);
                return false;
            }
            true
        });
        return hit;
    }

    let target = if component.text == "-1" && !opts.disable_negative_index {
        count_elements(json, i).checked_sub(1)
    } else {
        component.text.parse::<usize>().ok()
    };
    let Some(target) = target else {
        return Hit::Miss;
    };
    let mut found = None;
    let mut index = 0;
    for_each_element(json, i, |element| {
        if index == target {
            found = Some(element);
            return false;
        }
        index += 1;
        true
    });
    match found {
        Some(element) => descend(json, element, rest, opts),
        None => Hit::Miss,
    }
}

/// `lhs op rhs` inside `#(...)`.
struct Query<'q> {
    lhs: &'q str,
    op: &'q str,
    rhs: Cow<'q, str>,
}

impl<'q> Query<'q> {
    fn parse(body: &'q str) -> Self {
        let bytes = body.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let width = match (bytes[i], bytes.get(i + 1)) {
                (b'\\', _) => {
                    i += 2;
                    continue;
                }
                (b'!', Some(b'=' | b'%')) | (b'<' | b'>' | b'=', Some(b'=')) => 2,
                (b'<' | b'>' | b'=' | b'%', _) => 1,
                _ => 0,
            };
            if width > 0 {
                let op = match &body[i..i + width] {
                    "==" => "=",
                    op => op,
                };
                return Query {
                    lhs: body[..i].trim(),
                    op,
                    rhs: query_operand(body[i + width..].trim()),
                };
            }
            i += 1;
        }
        Query {
            lhs: body.trim(),
            op: "",
            rhs: Cow::Borrowed(""),
        }
    }

    fn matches(&self, json: &[u8], element: Range<usize>, opts: LocateOptions) -> bool {
        let value = if self.lhs.is_empty() {
            Hit::Span(element)
        } else {
            lookup(json, element.start, self.lhs, opts)
        };
        let raw: &[u8] = match &value {
            Hit::Miss => return false,
            Hit::Span(span) => &json[span.clone()],
            Hit::Synth(raw) | Hit::Many { raw, .. } => raw,
        };
        if self.op.is_empty() {
            return true;
        }
        let rhs = self.rhs.as_ref();
        match raw.first() {
            Some(b'"') => {
                let text = key_text(raw);
                let text = text.as_ref();
                match self.op {
                    "=" => text == rhs,
                    "!=" => text != rhs,
                    "<" => text < rhs,
                    "<=" => text <= rhs,
                    ">" => text > rhs,
                    ">=" => text >= rhs,
                    "%" => glob_match(rhs, text),
                    "!%" => !glob_match(rhs, text),
                    _ => false,
                }
            }
            Some(b'-' | b'0'..=b'9') => {
                let left = parse_f64(raw);
                let right = rhs.parse::<f64>().unwrap_or(0.0);
                match self.op {
                    "=" => left == right,
                    "!=" => left != right,
                    "<" => left < right,
                    "<=" => left <= right,
                    ">" => left > right,
                    ">=" => left >= right,
                    _ => false,
                }
            }
            Some(b't') => match self.op {
                "=" => rhs == "true",
                "!=" => rhs != "true",
                ">" => rhs == "false",
                ">=" => true,
                _ => false,
            },
            Some(b'f') => match self.op {
                "=" => rhs == "false",
                "!=" => rhs != "false",
                "<" => rhs == "true",
                "<=" => true,
                _ => false,
            },
            _ => false,
        }
    }
}

/// A quoted right-hand side is compared by its decoded content.
fn query_operand(rhs: &str) -> Cow<'_, str> {
    if rhs.len() >= 2 && rhs.starts_with('"') && rhs.ends_with('"') {
        key_text(rhs.as_bytes())
    } else {
        Cow::Borrowed(rhs)
    }
}

fn parse_f64(raw: &[u8]) -> f64 {
    core::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

/// Decoded content of a quoted JSON string.
fn key_text(quoted: &[u8]) -> Cow<'_, str> {
    let body = quoted
        .strip_prefix(b"\"")
        .and_then(|b| b.strip_suffix(b"\""))
        .unwrap_or(quoted);
    if body.contains(&b'\\') {
        Cow::Owned(unescape(body))
    } else {
        body.to_str_lossy()
    }
}

/// Decodes JSON string escapes. Unpaired surrogates and invalid UTF-8 become
/// U+FFFD.
pub(crate) fn unescape(body: &[u8]) -> String {
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        let b = body[i];
        i += 1;
        if b != b'\\' {
            out.push(b);
            continue;
        }
        let Some(&esc) = body.get(i) else {
            break;
        };
        i += 1;
        match esc {
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let Some(first) = hex4(body, i) else {
                    out.extend_from_slice("\u{fffd}".as_bytes());
                    continue;
                };
                i += 4;
                let mut units = alloc::vec![first];
                if (0xd800..0xdc00).contains(&first) && body.get(i..i + 2) == Some(br"\u") {
                    if let Some(second) = hex4(body, i + 2) {
                        if (0xdc00..0xe000).contains(&second) {
                            units.push(second);
                            i += 6;
                        }
                    }
                }
                for ch in char::decode_utf16(units) {
                    let ch = ch.unwrap_or(char::REPLACEMENT_CHARACTER);
                    out.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes());
                }
            }
            other => out.push(other),
        }
    }
    match String::from_utf8(out) {
        Ok(text) => text,
        Err(err) => err.as_bytes().to_str_lossy().into_owned(),
    }
}

fn hex4(body: &[u8], i: usize) -> Option<u16> {
    let digits = core::str::from_utf8(body.get(i..i + 4)?).ok()?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

/// Wildcard match of `text` against `pattern`: `*` spans any run of
/// characters, `?` exactly one, `\` makes the next character literal.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p).copied() {
            Some('*') => {
                star = Some((p, t));
                p += 1;
                continue;
            }
            Some('?') => {
                p += 1;
                t += 1;
                continue;
            }
            Some('\\') if p + 1 < pattern.len() => {
                if pattern[p + 1] == text[t] {
                    p += 2;
                    t += 1;
                    continue;
                }
            }
            Some(ch) if ch == text[t] => {
                p += 1;
                t += 1;
                continue;
            }
            _ => {}
        }
        let Some((star_p, star_t)) = star else {
            return false;
        };
        p = star_p + 1;
        t = star_t + 1;
        star = Some((star_p, star_t + 1));
    }
    while pattern.get(p) == Some(&'*') {
        p += 1;
    }
    p == pattern.len()
}

/// End offset of the value starting at `i`.
///
/// Strings end at the first unescaped quote and containers at their
/// balancing closer. Anything else runs up to the next delimiter.
pub(crate) fn skip_value(json: &[u8], i: usize) -> usize {
    match json.get(i) {
        None => i,
        Some(b'"') => skip_string(json, i + 1),
        Some(b'{' | b'[') => {
            let mut depth = 1usize;
            let mut j = i + 1;
            while j < json.len() {
                match json[j] {
                    b'"' => {
                        j = skip_string(json, j + 1);
                        continue;
                    }
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' => {
                        depth -= 1;
                        if depth == 0 {
                            return j + 1;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
            json.len()
        }
        Some(_) => {
            let mut j = i + 1;
            while j < json.len() && !matches!(json[j], b',' | b'}' | b']') && !is_space(json[j]) {
                j += 1;
            }
            j
        }
    }
}

/// `i` is just past the opening quote.
fn skip_string(json: &[u8], mut i: usize) -> usize {
    while i < json.len() {
        match json[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    json.len()
}

/// Calls `f` with the range of each element of the array whose `[` is at
/// `i`, until it returns `false`.
pub(crate) fn for_each_element(json: &[u8], i: usize, mut f: impl FnMut(Range<usize>) -> bool) {
    let mut j = i + 1;
    loop {
        j = skip_space(json, j);
        match json.get(j) {
            None | Some(b']') => return,
            Some(b',') => j += 1,
            Some(_) => {
                let end = skip_value(json, j);
                if !f(j..end) {
                    return;
                }
                j = end;
            }
        }
    }
}

/// Calls `f` with the quoted key range and the value range of each member
/// of the object whose `{` is at `i`, until it returns `false`.
pub(crate) fn for_each_member(
    json: &[u8],
    i: usize,
    mut f: impl FnMut(Range<usize>, Range<usize>) -> bool,
) {
    let mut j = i + 1;
    loop {
        j = skip_space(json, j);
        match json.get(j) {
            Some(b'"') => {
                let key = j..skip_string(json, j + 1);
                j = skip_space(json, key.end);
                if json.get(j) != Some(&b':') {
                    return;
                }
                j = skip_space(json, j + 1);
                if j >= json.len() {
                    return;
                }
                let end = skip_value(json, j);
                if !f(key, j..end) {
                    return;
                }
                j = end;
            }
            Some(b',') => j += 1,
            _ => return,
        }
    }
}

pub(crate) fn count_elements(json: &[u8], i: usize) -> usize {
    let mut count = 0;
    for_each_element(json, i, |_| {
        count += 1;
        true
    });
    count
}
