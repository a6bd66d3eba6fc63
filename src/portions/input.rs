//! Form input parsing
//!
//! The calculator only shows results when both inputs are positive numbers.

/// Parse form text into a positive, finite number
///
/// Examples:
/// - "10" -> Some(10.0)
/// - " 12.5 " -> Some(12.5)
/// - "", "abc", "0", "-4", "NaN" -> None
pub fn parse_positive(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Some(value),
        _ => None,
    }
}

/// Parse both form inputs; `None` unless both are usable
pub fn parse_inputs(weight: &str, age_weeks: &str) -> Option<(f64, f64)> {
    Some((parse_positive(weight)?, parse_positive(age_weeks)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_numbers() {
        assert_eq!(parse_positive("10"), Some(10.0));
        assert_eq!(parse_positive(" 12.5 "), Some(12.5));
        assert_eq!(parse_positive("0.25"), Some(0.25));
    }

    #[test]
    fn test_parse_rejects_unusable_text() {
        assert_eq!(parse_positive(""), None);
        assert_eq!(parse_positive("   "), None);
        assert_eq!(parse_positive("abc"), None);
        assert_eq!(parse_positive("10 lbs"), None);
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("-4"), None);
        assert_eq!(parse_positive("NaN"), None);
        assert_eq!(parse_positive("inf"), None);
    }

    #[test]
    fn test_parse_inputs_requires_both() {
        assert_eq!(parse_inputs("10", "9"), Some((10.0, 9.0)));
        assert_eq!(parse_inputs("10", ""), None);
        assert_eq!(parse_inputs("", "9"), None);
    }
}
