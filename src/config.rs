//! Global configuration for GRIT algebra runtime behavior.
//!
//! The algebra itself is lenient about inverted intervals (`start > end`).
//! Whether the BED reader lets them through is a process-wide policy, set
//! once at startup and read during parsing.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag for strict coordinate validation in the BED reader.
static STRICT_COORDINATES: AtomicBool = AtomicBool::new(false);

/// Enable or disable strict coordinate validation.
///
/// When enabled, the BED reader rejects lines whose start is greater than
/// their end. When disabled (the default) such lines are parsed into
/// negative-length records and the algebra processes them as they are.
///
/// # Example
///
/// ```
/// use grit_algebra::config;
///
/// config::set_strict_coordinates(true);
/// assert!(config::is_strict_coordinates());
/// config::set_strict_coordinates(false);
/// ```
#[inline]
pub fn set_strict_coordinates(enabled: bool) {
    STRICT_COORDINATES.store(enabled, Ordering::Release);
}

/// Check if strict coordinate validation is enabled.
#[inline]
pub fn is_strict_coordinates() -> bool {
    STRICT_COORDINATES.load(Ordering::Acquire)
}

/// Returns true if `start..end` passes the current coordinate policy.
#[inline]
pub fn accepts_coordinates(start: i64, end: i64) -> bool {
    !is_strict_coordinates() || start <= end
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_lenient_mode() {
        set_strict_coordinates(false);
        assert!(!is_strict_coordinates());
        assert!(accepts_coordinates(200, 100));
    }

    #[test]
    #[serial]
    fn test_strict_mode() {
        set_strict_coordinates(true);
        assert!(accepts_coordinates(100, 200));
        assert!(accepts_coordinates(100, 100)); // zero-length is fine
        assert!(!accepts_coordinates(200, 100));
        set_strict_coordinates(false); // Reset
    }
}
