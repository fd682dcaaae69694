/// Resource ceilings enforced by [`ThreatValidator`](super::ThreatValidator).
///
/// A zero in any field disables that check, so the default value only
/// validates grammar.
///
/// # Examples
///
/// ```rust
/// use jsonsplice::jtp::ThreatLimits;
///
/// let limits = ThreatLimits::default()
///     .with_max_array_len(6)
///     .with_max_depth(7)
///     .with_max_key_len(20)
///     .with_max_string_len(50);
/// assert_eq!(limits.max_entry_count, 0);
/// ```
///
/// With the `serde` feature every field is optional when deserializing:
///
/// ```json
/// { "max_depth": 16, "max_string_len": 4096 }
/// ```
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(default))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ThreatLimits {
    /// Maximum nesting of objects and arrays. The root container is depth 1.
    pub max_depth: usize,
    /// Maximum number of elements in any single array.
    pub max_array_len: usize,
    /// Maximum length of an object key, in characters.
    pub max_key_len: usize,
    /// Maximum length of a string value, in characters.
    pub max_string_len: usize,
    /// Maximum number of key/value pairs in any single object.
    pub max_entry_count: usize,
}

impl ThreatLimits {
    /// No limits at all; only the grammar is checked.
    pub const UNBOUNDED: Self = Self {
        max_depth: 0,
        max_array_len: 0,
        max_key_len: 0,
        max_string_len: 0,
        max_entry_count: 0,
    };

    /// Sets [`max_depth`](Self::max_depth).
    #[must_use]
    pub const fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// Sets [`max_array_len`](Self::max_array_len).
    #[must_use]
    pub const fn with_max_array_len(mut self, max: usize) -> Self {
        self.max_array_len = max;
        self
    }

    /// Sets [`max_key_len`](Self::max_key_len).
    #[must_use]
    pub const fn with_max_key_len(mut self, max: usize) -> Self {
        self.max_key_len = max;
        self
    }

    /// Sets [`max_string_len`](Self::max_string_len).
    #[must_use]
    pub const fn with_max_string_len(mut self, max: usize) -> Self {
        self.max_string_len = max;
        self
    }

    /// Sets [`max_entry_count`](Self::max_entry_count).
    #[must_use]
    pub const fn with_max_entry_count(mut self, max: usize) -> Self {
        self.max_entry_count = max;
        self
    }

    /// Whether every limit is disabled.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.max_depth == 0
            && self.max_array_len == 0
            && self.max_key_len == 0
            && self.max_string_len == 0
            && self.max_entry_count == 0
    }
}
