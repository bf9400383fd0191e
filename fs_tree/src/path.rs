//! Path splitting and name validity
//!
//! Paths are slash-delimited. `"."` and `".."` are not special-cased here:
//! resolution treats them as ordinary child lookups, relying on the
//! reserved entries every directory carries.

pub const SEPARATOR: char = '/';

/// Splits off the first segment of a relative path
///
/// Returns `(segment, remainder)`; the remainder is empty for a terminal
/// segment. A trailing separator yields an empty remainder, so `"sub/"`
/// resolves the same as `"sub"`.
pub fn split_first(path: &str) -> (&str, &str) {
    match path.find(SEPARATOR) {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => (path, ""),
    }
}

/// Splits a path into its parent prefix and local name at the last separator
///
/// The prefix keeps its trailing separator so it resolves to the parent
/// directory; `None` means the path has no separator and names an entry of
/// the base directory.
pub fn split_parent(path: &str) -> (Option<&str>, &str) {
    match path.rfind(SEPARATOR) {
        Some(idx) => (Some(&path[..idx + 1]), &path[idx + 1..]),
        None => (None, path),
    }
}

/// Validates a name for a newly created entry
///
/// Reserved names and separator-bearing strings cannot be created.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(SEPARATOR)
        && !name.contains('\0')
}
