//! Artifact name policy.
//!
//! Names are used directly as file names inside a collection directory, so
//! anything that could escape that directory is rejected.

/// Check that a name cannot traverse out of its collection directory
pub fn is_safe(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

/// Stricter check applied when a name is about to be written.
/// Hidden names are refused since listings never show them.
pub fn is_valid_new_name(name: &str) -> bool {
    is_safe(name)
        && !name.starts_with('.')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}
