//! JSON threat protection.
//!
//! A single forward pass over the document that checks the grammar and the
//! configured [`ThreatLimits`] at the same time, without building a tree. The
//! first problem found in byte order is the one reported, whether it is a
//! limit or a syntax error.
//!
//! ```rust
//! use jsonsplice::jtp::{ThreatError, ThreatLimits, ThreatValidator, Verifier};
//!
//! let validator = ThreatValidator::new(ThreatLimits::default().with_max_depth(1));
//! assert_eq!(
//!     validator.verify_str(r#"{"a":{"b":1}}"#),
//!     Err(ThreatError::DepthExceeded { max: 1, found: 2 })
//! );
//! assert_eq!(validator.verify_str(r#"{"a":[]"#), Err(ThreatError::MalformedJson));
//! ```

mod error;
mod limits;

pub use error::ThreatError;
pub use limits::ThreatLimits;

use alloc::vec::Vec;

use crate::scan::{
    scan_false, scan_null, scan_number, scan_string, scan_true, skip_space, utf8_len,
};

/// Something that accepts or rejects a JSON document.
pub trait Verifier {
    /// Checks a document held as bytes.
    ///
    /// # Errors
    ///
    /// Returns the first violation encountered.
    fn verify_bytes(&self, json: &[u8]) -> Result<(), ThreatError>;

    /// Checks a document held as text.
    ///
    /// # Errors
    ///
    /// Returns the first violation encountered.
    fn verify_str(&self, json: &str) -> Result<(), ThreatError> {
        self.verify_bytes(json.as_bytes())
    }
}

/// Validates documents against a fixed set of [`ThreatLimits`].
///
/// Holds no state between calls; one validator can be shared freely across
/// threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreatValidator {
    limits: ThreatLimits,
}

impl ThreatValidator {
    /// Creates a validator enforcing `limits`.
    #[must_use]
    pub const fn new(limits: ThreatLimits) -> Self {
        Self { limits }
    }

    /// The limits this validator enforces.
    #[must_use]
    pub const fn limits(&self) -> &ThreatLimits {
        &self.limits
    }
}

impl From<ThreatLimits> for ThreatValidator {
    fn from(limits: ThreatLimits) -> Self {
        Self::new(limits)
    }
}

impl Verifier for ThreatValidator {
    fn verify_bytes(&self, json: &[u8]) -> Result<(), ThreatError> {
        Walk::new(json, &self.limits).document()
    }
}

/// Checks that `json` is exactly one well-formed JSON value.
///
/// # Errors
///
/// Returns [`ThreatError::MalformedJson`] on any grammar violation.
pub fn validate(json: &[u8]) -> Result<(), ThreatError> {
    Walk::new(json, &ThreatLimits::UNBOUNDED).document()
}

/// Nesting level the walk is left at after a successful pass. Always zero.
#[cfg(any(test, feature = "fuzzing"))]
#[doc(hidden)]
pub fn residual_depth(json: &[u8]) -> Result<usize, ThreatError> {
    let limits = ThreatLimits::UNBOUNDED;
    let mut walk = Walk::new(json, &limits);
    walk.document()?;
    Ok(walk.depth())
}

type Step = Result<usize, ThreatError>;

#[inline]
fn exceeds(max: usize, found: usize) -> bool {
    max > 0 && found > max
}

/// An open container and how many children it has seen so far.
#[derive(Debug, Clone, Copy)]
enum Frame {
    Object { entries: usize },
    Array { children: usize },
}

/// What the walk expects next.
enum Next {
    /// A value starts at or after this offset.
    Value(usize),
    /// A value ended just before this offset.
    End(usize),
}

/// Cursor state for one pass. Open containers live on `stack` rather than
/// the call stack, so nesting is bounded by memory alone.
struct Walk<'a> {
    data: &'a [u8],
    limits: &'a ThreatLimits,
    stack: Vec<Frame>,
}

impl<'a> Walk<'a> {
    fn new(data: &'a [u8], limits: &'a ThreatLimits) -> Self {
        Self {
            data,
            limits,
            stack: Vec::new(),
        }
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn document(&mut self) -> Result<(), ThreatError> {
        let mut next = Next::Value(0);
        loop {
            next = match next {
                Next::Value(i) => self.value(i)?,
                Next::End(end) => {
                    if self.stack.is_empty() {
                        return if skip_space(self.data, end) == self.data.len() {
                            Ok(())
                        } else {
                            Err(ThreatError::MalformedJson)
                        };
                    }
                    self.after(end)?
                }
            };
        }
    }

    /// Reads the value starting at or after `i`. Containers are opened and
    /// left on the stack.
    fn value(&mut self, i: usize) -> Result<Next, ThreatError> {
        let i = skip_space(self.data, i);
        let Some(&b) = self.data.get(i) else {
            return Err(ThreatError::MalformedJson);
        };
        match b {
            b'{' => {
                self.enter(Frame::Object { entries: 0 })?;
                let i = skip_space(self.data, i + 1);
                match self.data.get(i) {
                    Some(b'}') => Ok(Next::End(self.leave(i))),
                    Some(b'"') => Ok(Next::Value(self.member(i)?)),
                    _ => Err(ThreatError::MalformedJson),
                }
            }
            b'[' => {
                self.enter(Frame::Array { children: 0 })?;
                let i = skip_space(self.data, i + 1);
                if self.data.get(i) == Some(&b']') {
                    Ok(Next::End(self.leave(i)))
                } else {
                    Ok(Next::Value(i))
                }
            }
            b'"' => {
                let end = grammar(scan_string(self.data, i + 1))?;
                let found = utf8_len(&self.data[i + 1..end - 1]);
                let max = self.limits.max_string_len;
                if exceeds(max, found) {
                    return Err(ThreatError::StringLenExceeded { max, found });
                }
                Ok(Next::End(end))
            }
            b'-' | b'0'..=b'9' => grammar(scan_number(self.data, i)).map(Next::End),
            b't' => grammar(scan_true(self.data, i + 1)).map(Next::End),
            b'f' => grammar(scan_false(self.data, i + 1)).map(Next::End),
            b'n' => grammar(scan_null(self.data, i + 1)).map(Next::End),
            _ => Err(ThreatError::MalformedJson),
        }
    }

    /// A child of the innermost container ended at `end`: expects a
    /// separator or the closer.
    fn after(&mut self, end: usize) -> Result<Next, ThreatError> {
        let i = skip_space(self.data, end);
        let Some(frame) = self.stack.last_mut() else {
            return Err(ThreatError::MalformedJson);
        };
        match frame {
            Frame::Object { .. } => match self.data.get(i) {
                Some(b'}') => Ok(Next::End(self.leave(i))),
                Some(b',') => {
                    let i = skip_space(self.data, i + 1);
                    if self.data.get(i) != Some(&b'"') {
                        return Err(ThreatError::MalformedJson);
                    }
                    Ok(Next::Value(self.member(i)?))
                }
                _ => Err(ThreatError::MalformedJson),
            },
            Frame::Array { children } => {
                let close = match self.data.get(i) {
                    Some(b']') => true,
                    Some(b',') => false,
                    _ => return Err(ThreatError::MalformedJson),
                };
                *children += 1;
                let found = *children;
                let max = self.limits.max_array_len;
                if exceeds(max, found) {
                    return Err(ThreatError::ArrayLenExceeded { max, found });
                }
                if close {
                    Ok(Next::End(self.leave(i)))
                } else {
                    Ok(Next::Value(i + 1))
                }
            }
        }
    }

    /// `i` is at the opening quote of a key. Returns the offset just past
    /// the colon.
    fn member(&mut self, i: usize) -> Step {
        let key_start = i + 1;
        let key_end = grammar(scan_string(self.data, key_start))?;
        let Some(Frame::Object { entries }) = self.stack.last_mut() else {
            return Err(ThreatError::MalformedJson);
        };
        *entries += 1;
        let found = *entries;
        let max = self.limits.max_entry_count;
        if exceeds(max, found) {
            return Err(ThreatError::EntryCountExceeded { max, found });
        }
        // measured before the value is looked at
        let found = utf8_len(&self.data[key_start..key_end - 1]);
        let max = self.limits.max_key_len;
        if exceeds(max, found) {
            return Err(ThreatError::KeyLenExceeded { max, found });
        }

        let i = skip_space(self.data, key_end);
        if self.data.get(i) != Some(&b':') {
            return Err(ThreatError::MalformedJson);
        }
        Ok(i + 1)
    }

    fn enter(&mut self, frame: Frame) -> Result<(), ThreatError> {
        let found = self.depth() + 1;
        let max = self.limits.max_depth;
        if exceeds(max, found) {
            return Err(ThreatError::DepthExceeded { max, found });
        }
        self.stack.push(frame);
        Ok(())
    }

    /// Consumes the closer at `i`.
    fn leave(&mut self, i: usize) -> usize {
        self.stack.pop();
        i + 1
    }
}

#[inline]
fn grammar((end, ok): (usize, bool)) -> Step {
    if ok {
        Ok(end)
    } else {
        Err(ThreatError::MalformedJson)
    }
}
