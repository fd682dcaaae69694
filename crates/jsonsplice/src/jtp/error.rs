use thiserror::Error;

/// Why a document was rejected.
///
/// Limit violations carry the configured maximum and the measured value that
/// went over it. They render with the malformed sentinel as their suffix, so
/// log lines can be matched on `jtp.MalformedJSON` alone. Use
/// [`is_limit`](Self::is_limit) to tell the two kinds apart:
///
/// ```rust
/// use jsonsplice::jtp::ThreatError;
///
/// let err = ThreatError::ArrayLenExceeded { max: 2, found: 3 };
/// assert_eq!(
///     err.to_string(),
///     "jtp.maxArrayLenReached.Max-[2]-Allowed.Found-[3]: jtp.MalformedJSON"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ThreatError {
    /// The bytes are not a single well-formed JSON value.
    #[error("jtp.MalformedJSON")]
    MalformedJson,
    /// Containers nest deeper than allowed.
    #[error("jtp.maxDepthReached.Max-[{max}]-Allowed.Found-[{found}]: jtp.MalformedJSON")]
    DepthExceeded {
        /// Configured ceiling.
        max: usize,
        /// Depth reached.
        found: usize,
    },
    /// An array has too many elements.
    #[error("jtp.maxArrayLenReached.Max-[{max}]-Allowed.Found-[{found}]: jtp.MalformedJSON")]
    ArrayLenExceeded {
        /// Configured ceiling.
        max: usize,
        /// Elements counted when the check failed.
        found: usize,
    },
    /// An object key is too long.
    #[error("jtp.maxKeyLenReached.Max-[{max}]-Allowed.Found-[{found}]: jtp.MalformedJSON")]
    KeyLenExceeded {
        /// Configured ceiling.
        max: usize,
        /// Characters in the key.
        found: usize,
    },
    /// A string value is too long.
    #[error("jtp.maxStringLenReached.Max-[{max}]-Allowed.Found-[{found}]: jtp.MalformedJSON")]
    StringLenExceeded {
        /// Configured ceiling.
        max: usize,
        /// Characters in the string.
        found: usize,
    },
    /// An object has too many entries.
    #[error("jtp.maxEntryCountReached.Max-[{max}]-Allowed.Found-[{found}]: jtp.MalformedJSON")]
    EntryCountExceeded {
        /// Configured ceiling.
        max: usize,
        /// Entries counted when the check failed.
        found: usize,
    },
}

impl ThreatError {
    /// Whether a configured limit, rather than the grammar, rejected the
    /// document.
    #[must_use]
    pub const fn is_limit(&self) -> bool {
        !matches!(self, ThreatError::MalformedJson)
    }

    /// The configured maximum, for limit violations.
    #[must_use]
    pub const fn max(&self) -> Option<usize> {
        match *self {
            ThreatError::MalformedJson => None,
            ThreatError::DepthExceeded { max, .. }
            | ThreatError::ArrayLenExceeded { max, .. }
            | ThreatError::KeyLenExceeded { max, .. }
            | ThreatError::StringLenExceeded { max, .. }
            | ThreatError::EntryCountExceeded { max, .. } => Some(max),
        }
    }

    /// The measured value, for limit violations.
    #[must_use]
    pub const fn found(&self) -> Option<usize> {
        match *self {
            ThreatError::MalformedJson => None,
            ThreatError::DepthExceeded { found, .. }
            | ThreatError::ArrayLenExceeded { found, .. }
            | ThreatError::KeyLenExceeded { found, .. }
            | ThreatError::StringLenExceeded { found, .. }
            | ThreatError::EntryCountExceeded { found, .. } => Some(found),
        }
    }
}
