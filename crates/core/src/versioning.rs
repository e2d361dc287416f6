//! Version-numbering rules for append-only template histories.
//!
//! The current version of a template is never stored as a counter. It is
//! derived from the highest stored version row, and the next number is
//! always `max + 1`. Uniqueness is enforced by the database, which lets a
//! racing writer fail and retry with a recomputed number.

use crate::error::CoreError;

/// The first version number assigned to a new history.
pub const FIRST_VERSION: i32 = 1;

/// Upper bound on attempts to insert a version row after unique-constraint
/// conflicts. Exhausting it is fatal for the request.
pub const MAX_APPEND_ATTEMPTS: u32 = 5;

/// Compute the next version number from the highest existing one.
///
/// `None` means the history is empty, so numbering starts at [`FIRST_VERSION`].
/// A history already at `i32::MAX` cannot grow and yields
/// [`CoreError::Internal`].
pub fn next_version_number(current_max: Option<i32>) -> Result<i32, CoreError> {
    match current_max {
        Some(max) => max.checked_add(1).ok_or_else(|| {
            CoreError::Internal(format!("Version number space exhausted at {max}"))
        }),
        None => Ok(FIRST_VERSION),
    }
}

/// Check that a list of version numbers, sorted ascending, is exactly
/// `1..=k` for some `k >= 1`: no gaps, no duplicates, never empty.
pub fn is_contiguous_history(sorted_versions: &[i32]) -> bool {
    if sorted_versions.is_empty() {
        return false;
    }
    sorted_versions
        .iter()
        .enumerate()
        .all(|(idx, &v)| i64::from(v) == idx as i64 + i64::from(FIRST_VERSION))
}
