use alloc::string::String;

use thiserror::Error;

/// Usage errors reported by set and delete.
///
/// A path that does not exist is not an error for delete: the document comes
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    /// The path was the empty string.
    #[error("path cannot be empty")]
    EmptyPath,
    /// A key or index had to be created under a document that does not start
    /// with a JSON value.
    #[error("json must be an object or array")]
    NotContainer,
    /// An array was addressed with something other than an index or `-1`.
    #[error("cannot set array element for non-numeric key '{0}'")]
    NonNumericIndex(String),
    /// Delete was asked to follow a wildcard or query path.
    #[error("cannot delete value from a complex path")]
    ComplexDelete,
    /// An index asked for more `null` padding elements than can be allocated.
    #[error("cannot allocate {0} null padding elements")]
    PaddingTooLarge(usize),
}
