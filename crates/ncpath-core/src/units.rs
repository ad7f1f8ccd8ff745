//! Numeric output formatting.
//!
//! All emitted G-code words use fixed notation with six decimal places,
//! trailing zeros and any trailing decimal point stripped. This matches the
//! output contract of the planners exactly, so it lives here rather than in
//! each generator.

/// Format a value in fixed notation with up to six decimals.
///
/// ```
/// use ncpath_core::units::r6;
/// assert_eq!(r6(1.5), "1.5");
/// assert_eq!(r6(10.0), "10");
/// assert_eq!(r6(0.1234567), "0.123457");
/// ```
pub fn r6(value: f64) -> String {
    let mut s = format!("{:.6}", value);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_trailing_zeros() {
        assert_eq!(r6(1.500000), "1.5");
        assert_eq!(r6(-2.250000), "-2.25");
        assert_eq!(r6(0.000001), "0.000001");
    }

    #[test]
    fn test_strips_trailing_point() {
        assert_eq!(r6(5.0), "5");
        assert_eq!(r6(-10.0), "-10");
        assert_eq!(r6(0.0), "0");
    }

    #[test]
    fn test_rounds_to_six_places() {
        assert_eq!(r6(1.23456789), "1.234568");
        assert_eq!(r6(1.0000004), "1");
    }
}
