//! Path-addressed editing and threat protection for JSON held as raw bytes.
//!
//! Neither half builds a tree. [`set`] and [`delete`] locate the addressed
//! value and splice around it, leaving every other byte of the document as
//! it was:
//!
//! ```rust
//! let json = br#"{"name":{"first":"Tom","last":"Anderson"},"age":37}"#;
//!
//! let json = jsonsplice::set(json, "name.last", "Smith").unwrap();
//! let json = jsonsplice::set(&json, "children.-1", "Sara").unwrap();
//! let json = jsonsplice::delete(&json, "age").unwrap();
//! assert_eq!(
//!     json,
//!     br#"{"name":{"first":"Tom","last":"Smith"},"children":["Sara"]}"#
//! );
//! ```
//!
//! [`jtp`] checks a document against resource limits in one pass:
//!
//! ```rust
//! use jsonsplice::jtp::{ThreatLimits, ThreatValidator, Verifier};
//!
//! let validator = ThreatValidator::new(ThreatLimits::default().with_max_array_len(2));
//! let err = validator.verify_str(r#"["x","y","z"]"#).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "jtp.maxArrayLenReached.Max-[2]-Allowed.Found-[3]: jtp.MalformedJSON"
//! );
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod builder;
mod error;
mod locate;
mod options;
mod path;
mod splice;
mod value;

pub mod jtp;
pub mod scan;

#[cfg(test)]
mod tests;

pub use builder::build;
pub use error::SpliceError;
pub use locate::{Locate, LocateOptions, Located, PathLocator};
pub use options::SetOptions;
pub use path::{segment, ComplexPath, PathSegment};
pub use splice::{
    delete, delete_str, delete_with, set, set_in_place, set_raw, set_raw_str, set_raw_with,
    set_str, set_str_with, set_with, Splicer,
};
pub use value::SetValue;
