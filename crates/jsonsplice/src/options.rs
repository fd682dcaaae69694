/// Options for set and delete operations.
///
/// # Examples
///
/// ```rust
/// use jsonsplice::{set_with, SetOptions};
///
/// let options = SetOptions {
///     optimistic: true,
///     ..Default::default()
/// };
/// let json = set_with(br#"{"name":"Tom"}"#, "name", "Sara", options).unwrap();
/// assert_eq!(json, br#"{"name":"Sara"}"#);
/// ```
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Whether to try a single locate of the whole path before falling back
    /// to the segment-by-segment algorithm.
    ///
    /// This pays off when the value usually already exists, such as when the
    /// same document shape is updated over and over. The shortcut only
    /// applies to paths made of plain key characters (or any path in raw
    /// mode) and never to deletes.
    ///
    /// # Default
    ///
    /// `false`
    pub optimistic: bool,

    /// Whether [`set_in_place`](crate::set_in_place) may overwrite the
    /// caller's buffer instead of building a new one.
    ///
    /// Only takes effect together with `optimistic`, when the optimistic
    /// locate finds the value. The bytes after the value are shifted in
    /// place and the buffer grows only if the new value is longer than the
    /// old one. The copy-returning functions ignore it.
    ///
    /// # Default
    ///
    /// `false`
    pub replace_in_place: bool,

    /// Whether the whole path is one literal key.
    ///
    /// Dots, backslashes and query characters lose their meaning, so keys
    /// like `"a.b*"` can be addressed without escaping.
    ///
    /// # Default
    ///
    /// `false`
    pub raw_path: bool,
}
