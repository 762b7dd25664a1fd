//! Parameter value validation against declared constraints.
//!
//! Validation is pure and deterministic, and collects every failure rather
//! than stopping at the first, so interactive callers can surface one
//! combined message before re-prompting.

use crate::template::ParameterConstraint;
use regex::Regex;

/// A single failed constraint check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Which constraint failed (`type`, `min_length`, `allowed_values`, ...)
    pub field: &'static str,
    /// Actionable message describing the expected value
    pub message: String,
}

impl ValidationFailure {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parameter value against its declared constraint.
///
/// Returns every failed check; an empty result means the value is valid.
pub fn validate(value: &str, constraint: &ParameterConstraint) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();
    let parsed = value.parse::<f64>();

    if constraint.is_numeric() && parsed.is_err() {
        failures.push(ValidationFailure::new(
            "type",
            format!("'{value}' is not a valid {}", constraint.param_type),
        ));
    }

    if let Some(min) = constraint.min_length {
        if value.chars().count() < min {
            failures.push(ValidationFailure::new(
                "min_length",
                format!("value must be at least {min} characters"),
            ));
        }
    }
    if let Some(max) = constraint.max_length {
        if value.chars().count() > max {
            failures.push(ValidationFailure::new(
                "max_length",
                format!("value must be at most {max} characters"),
            ));
        }
    }

    if constraint.min_value.is_some() || constraint.max_value.is_some() {
        match parsed {
            Ok(number) => {
                if let Some(min) = constraint.min_value {
                    if number < min {
                        failures.push(ValidationFailure::new(
                            "min_value",
                            format!("value must be at least {min}"),
                        ));
                    }
                }
                if let Some(max) = constraint.max_value {
                    if number > max {
                        failures.push(ValidationFailure::new(
                            "max_value",
                            format!("value must be at most {max}"),
                        ));
                    }
                }
            }
            // Numeric-typed values already failed the type check above
            Err(_) if !constraint.is_numeric() => {
                failures.push(ValidationFailure::new(
                    "value",
                    format!("'{value}' is not numeric and cannot satisfy the declared range"),
                ));
            }
            Err(_) => {}
        }
    }

    if let Some(allowed) = &constraint.allowed_values {
        if !allowed.iter().any(|candidate| candidate == value) {
            failures.push(ValidationFailure::new(
                "allowed_values",
                format!("value must be one of: {}", allowed.join(", ")),
            ));
        }
    }

    if let Some(pattern) = &constraint.allowed_pattern {
        // The whole value must match, so anchor the declared pattern
        match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(regex) => {
                if !regex.is_match(value) {
                    let message = constraint
                        .constraint_description
                        .clone()
                        .unwrap_or_else(|| format!("value must match pattern: {pattern}"));
                    failures.push(ValidationFailure::new("allowed_pattern", message));
                }
            }
            Err(error) => {
                failures.push(ValidationFailure::new(
                    "allowed_pattern",
                    format!("template declares an invalid pattern '{pattern}': {error}"),
                ));
            }
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint() -> ParameterConstraint {
        ParameterConstraint::default()
    }

    #[test]
    fn test_unconstrained_value_is_valid() {
        assert!(validate("anything", &constraint()).is_empty());
    }

    #[test]
    fn test_numeric_type() {
        let c = ParameterConstraint {
            param_type: "Number".to_string(),
            ..constraint()
        };
        assert!(validate("42", &c).is_empty());
        assert!(validate("4.5", &c).is_empty());

        let failures = validate("forty-two", &c);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "type");
    }

    #[test]
    fn test_length_bounds() {
        let c = ParameterConstraint {
            min_length: Some(3),
            max_length: Some(5),
            ..constraint()
        };
        assert_eq!(validate("ab", &c)[0].field, "min_length");
        assert!(validate("abc", &c).is_empty());
        assert!(validate("abcde", &c).is_empty());
        assert_eq!(validate("abcdef", &c)[0].field, "max_length");
    }

    #[test]
    fn test_value_bounds() {
        let c = ParameterConstraint {
            param_type: "Number".to_string(),
            min_value: Some(1.0),
            max_value: Some(10.0),
            ..constraint()
        };
        assert_eq!(validate("0", &c)[0].field, "min_value");
        assert!(validate("1", &c).is_empty());
        assert!(validate("10", &c).is_empty());
        assert_eq!(validate("11", &c)[0].field, "max_value");
    }

    #[test]
    fn test_value_bounds_on_garbage_reports_type_only_for_numeric() {
        let c = ParameterConstraint {
            param_type: "Number".to_string(),
            min_value: Some(1.0),
            ..constraint()
        };
        let failures = validate("abc", &c);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "type");
    }

    #[test]
    fn test_allowed_values() {
        let c = ParameterConstraint {
            allowed_values: Some(vec!["A".to_string(), "B".to_string()]),
            ..constraint()
        };
        assert!(validate("A", &c).is_empty());
        let failures = validate("C", &c);
        assert_eq!(failures[0].field, "allowed_values");
        assert!(failures[0].message.contains("A, B"));
    }

    #[test]
    fn test_allowed_pattern_is_anchored() {
        let c = ParameterConstraint {
            allowed_pattern: Some("[a-z]+".to_string()),
            ..constraint()
        };
        assert!(validate("abc", &c).is_empty());
        // A partial match is not a full match
        assert_eq!(validate("abc123", &c)[0].field, "allowed_pattern");
    }

    #[test]
    fn test_pattern_failure_surfaces_constraint_description() {
        let c = ParameterConstraint {
            allowed_pattern: Some("[a-z]+".to_string()),
            constraint_description: Some("lowercase letters only".to_string()),
            ..constraint()
        };
        assert_eq!(validate("ABC", &c)[0].message, "lowercase letters only");
    }

    #[test]
    fn test_collects_all_failures() {
        let c = ParameterConstraint {
            param_type: "Number".to_string(),
            min_length: Some(5),
            allowed_values: Some(vec!["11111".to_string()]),
            ..constraint()
        };
        let failures = validate("abc", &c);
        let fields: Vec<&str> = failures.iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["type", "min_length", "allowed_values"]);
    }
}
