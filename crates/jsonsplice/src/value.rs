use alloc::{borrow::Cow, format, string::String, vec::Vec};

use crate::builder::append_stringify;

/// A replacement value for a set operation.
///
/// `Raw` bytes are spliced into the document verbatim and must already be
/// encoded JSON. `Str` text is encoded as a JSON string literal (quoted and
/// escaped) first.
///
/// Rust scalars convert directly:
///
/// ```rust
/// use jsonsplice::SetValue;
///
/// assert_eq!(SetValue::from(true), SetValue::raw(&b"true"[..]));
/// assert_eq!(SetValue::from(-7i32), SetValue::raw(&b"-7"[..]));
/// assert_eq!(SetValue::from("hi"), SetValue::string("hi"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetValue<'v> {
    /// Pre-encoded JSON, spliced byte for byte.
    Raw(Cow<'v, [u8]>),
    /// Text to be encoded as a JSON string.
    Str(Cow<'v, str>),
}

impl<'v> SetValue<'v> {
    /// A pre-encoded JSON fragment.
    pub fn raw(bytes: impl Into<Cow<'v, [u8]>>) -> Self {
        SetValue::Raw(bytes.into())
    }

    /// Text that will be written as a JSON string literal.
    pub fn string(text: impl Into<Cow<'v, str>>) -> Self {
        SetValue::Str(text.into())
    }

    /// Encodes any serializable value with `serde_json` and wraps the result
    /// as a raw fragment.
    ///
    /// # Errors
    ///
    /// Propagates the serializer error, e.g. for maps with non-string keys.
    #[cfg(feature = "serde")]
    pub fn serialize<T>(value: &T) -> Result<SetValue<'static>, serde_json::Error>
    where
        T: serde::Serialize + ?Sized,
    {
        serde_json::to_vec(value).map(|bytes| SetValue::Raw(Cow::Owned(bytes)))
    }

    /// Whether the value is written as a quoted JSON string.
    #[must_use]
    pub fn is_stringified(&self) -> bool {
        matches!(self, SetValue::Str(_))
    }

    pub(crate) fn append_to(&self, buf: &mut Vec<u8>) {
        match self {
            SetValue::Raw(raw) => buf.extend_from_slice(raw),
            SetValue::Str(text) => append_stringify(buf, text),
        }
    }

    /// The exact bytes that will land in the document.
    pub(crate) fn encoded(&self) -> Cow<'_, [u8]> {
        match self {
            SetValue::Raw(raw) => Cow::Borrowed(raw),
            SetValue::Str(_) => {
                let mut buf = Vec::new();
                self.append_to(&mut buf);
                Cow::Owned(buf)
            }
        }
    }
}

impl<'v> From<&'v str> for SetValue<'v> {
    fn from(text: &'v str) -> Self {
        SetValue::Str(Cow::Borrowed(text))
    }
}

impl From<String> for SetValue<'_> {
    fn from(text: String) -> Self {
        SetValue::Str(Cow::Owned(text))
    }
}

impl From<bool> for SetValue<'_> {
    fn from(b: bool) -> Self {
        let raw: &'static [u8] = if b { b"true" } else { b"false" };
        SetValue::Raw(Cow::Borrowed(raw))
    }
}

macro_rules! impl_integer_as_set_value {
    ($($t:ty),+) => {
        $(
            impl From<$t> for SetValue<'_> {
                fn from(n: $t) -> Self {
                    SetValue::Raw(Cow::Owned(format!("{n}").into_bytes()))
                }
            }
        )+
    };
}
impl_integer_as_set_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

// Non-finite floats have no JSON spelling; they become `null`.
macro_rules! impl_float_as_set_value {
    ($($t:ty),+) => {
        $(
            impl From<$t> for SetValue<'_> {
                fn from(n: $t) -> Self {
                    if n.is_finite() {
                        SetValue::Raw(Cow::Owned(format!("{n}").into_bytes()))
                    } else {
                        SetValue::Raw(Cow::Borrowed(b"null"))
                    }
                }
            }
        )+
    };
}
impl_float_as_set_value!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_encode_like_json() {
        assert_eq!(SetValue::from(12u8).encoded().as_ref(), b"12");
        assert_eq!(SetValue::from(-3i64).encoded().as_ref(), b"-3");
        assert_eq!(SetValue::from(false).encoded().as_ref(), b"false");
        assert_eq!(SetValue::from(1.5f64).encoded().as_ref(), b"1.5");
        assert_eq!(SetValue::from(1e21f64).encoded().as_ref(), b"1000000000000000000000");
        assert_eq!(SetValue::from(f64::NAN).encoded().as_ref(), b"null");
        assert_eq!(SetValue::from(f32::INFINITY).encoded().as_ref(), b"null");
    }

    #[test]
    fn strings_are_quoted() {
        let value = SetValue::from("say \"hi\"");
        assert!(value.is_stringified());
        assert_eq!(value.encoded().as_ref(), br#""say \"hi\"""#);
    }

    #[test]
    fn raw_is_verbatim() {
        let value = SetValue::raw(&br#"{"a":[1,2]}"#[..]);
        assert!(!value.is_stringified());
        assert_eq!(value.encoded().as_ref(), br#"{"a":[1,2]}"#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialize_goes_through_serde_json() {
        #[derive(serde::Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }
        let value = SetValue::serialize(&Point { x: 1, y: -2 }).unwrap();
        assert_eq!(value.encoded().as_ref(), br#"{"x":1,"y":-2}"#);
        let value = SetValue::serialize("quoted").unwrap();
        assert_eq!(value, SetValue::raw(&br#""quoted""#[..]));
    }
}
