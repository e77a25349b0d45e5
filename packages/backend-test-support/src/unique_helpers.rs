//! Test helpers for generating unique test data
//!
//! Display names are capped at 20 characters by the game, so uniqueness comes
//! from a process-wide counter rather than a long random suffix.

use std::sync::atomic::{AtomicU32, Ordering};

static NEXT: AtomicU32 = AtomicU32::new(1);

/// Generate a unique display name with the given prefix.
///
/// The prefix is truncated so the result always fits the 20 character limit.
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_name;
///
/// let a = unique_name("player");
/// let b = unique_name("player");
/// assert_ne!(a, b);
/// assert!(a.starts_with("player"));
/// assert!(a.chars().count() <= 20);
/// ```
pub fn unique_name(prefix: &str) -> String {
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    let suffix = format!("-{n}");
    let keep = 20usize.saturating_sub(suffix.chars().count());
    let head: String = prefix.chars().take(keep).collect();
    format!("{head}{suffix}")
}

/// Generate `count` unique display names sharing a prefix.
pub fn unique_names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|_| unique_name(prefix)).collect()
}
