//! Compiled template model.
//!
//! A [`Template`] wraps the declarative tree produced by the template
//! compiler: a mapping of `Parameters`, `Resources`, `Outputs`, and friends.
//! The tree is held as JSON; declaration order of parameters is preserved.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// A compiled template, ready for scrubbing and submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    root: Map<String, Value>,
}

impl Template {
    /// Parse a template from its JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Build a template from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTemplate`] if the root is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(Error::MalformedTemplate),
        }
    }

    /// The template's top-level description, if declared.
    pub fn description(&self) -> Option<&str> {
        self.root.get("Description").and_then(Value::as_str)
    }

    /// Serialize the template body for submission.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    /// Serialize the template body for display.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Declared parameters with their constraints, in declaration order.
    pub fn parameters(&self) -> Vec<(String, ParameterConstraint)> {
        let Some(Value::Object(params)) = self.root.get("Parameters") else {
            return Vec::new();
        };
        params
            .iter()
            .map(|(name, options)| (name.clone(), ParameterConstraint::from_value(options)))
            .collect()
    }

    /// Mutable access to the `Parameters` block, if present.
    pub(crate) fn parameters_block_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.root.get_mut("Parameters").and_then(Value::as_object_mut)
    }

    /// Immutable access to the `Parameters` block, if present.
    pub(crate) fn parameters_block(&self) -> Option<&Map<String, Value>> {
        self.root.get("Parameters").and_then(Value::as_object)
    }
}

/// Constraint metadata extracted from a declared template parameter.
///
/// Immutable once extracted; all fields mirror the declarative schema's
/// parameter attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterConstraint {
    /// Declared parameter type (`String`, `Number`, ...)
    pub param_type: String,
    /// Default value, stringified when declared as a number or bool
    pub default: Option<String>,
    /// Whether the value should be masked in output
    pub no_echo: bool,
    /// Exact set of permitted values, in declared order
    pub allowed_values: Option<Vec<String>>,
    /// Pattern the whole value must match
    pub allowed_pattern: Option<String>,
    /// Minimum value length in characters
    pub min_length: Option<usize>,
    /// Maximum value length in characters
    pub max_length: Option<usize>,
    /// Minimum numeric value
    pub min_value: Option<f64>,
    /// Maximum numeric value
    pub max_value: Option<f64>,
    /// Human description of the parameter
    pub description: Option<String>,
    /// Message to surface when a constraint check fails
    pub constraint_description: Option<String>,
}

impl ParameterConstraint {
    /// Extract constraint metadata from a parameter declaration block.
    ///
    /// Missing attributes are left unset; scalar attributes declared with a
    /// lenient type (a numeric bound written as a string, a stringly bool)
    /// are coerced rather than rejected.
    pub fn from_value(options: &Value) -> Self {
        Self {
            param_type: options
                .get("Type")
                .and_then(Value::as_str)
                .unwrap_or("String")
                .to_string(),
            default: options.get("Default").and_then(scalar_to_string),
            no_echo: options
                .get("NoEcho")
                .map(|v| v.as_bool().unwrap_or(v.as_str() == Some("true")))
                .unwrap_or(false),
            allowed_values: options.get("AllowedValues").and_then(Value::as_array).map(
                |values| values.iter().filter_map(scalar_to_string).collect(),
            ),
            allowed_pattern: options
                .get("AllowedPattern")
                .and_then(Value::as_str)
                .map(str::to_string),
            min_length: integer_attribute(options, "MinLength"),
            max_length: integer_attribute(options, "MaxLength"),
            min_value: number_attribute(options, "MinValue"),
            max_value: number_attribute(options, "MaxValue"),
            description: options
                .get("Description")
                .and_then(Value::as_str)
                .map(str::to_string),
            constraint_description: options
                .get("ConstraintDescription")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Whether the declared type requires a numeric value.
    pub fn is_numeric(&self) -> bool {
        self.param_type == "Number"
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer_attribute(options: &Value, key: &str) -> Option<usize> {
    let value = options.get(key)?;
    value
        .as_u64()
        .map(|n| n as usize)
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn number_attribute(options: &Value, key: &str) -> Option<f64> {
    let value = options.get(key)?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(Template::from_value(json!([1, 2, 3])).is_err());
        assert!(Template::from_value(json!("template")).is_err());
    }

    #[test]
    fn test_parameters_preserve_declaration_order() {
        let template = Template::from_json(
            r#"{"Parameters": {
                "Zebra": {"Type": "String"},
                "Alpha": {"Type": "Number"},
                "Middle": {"Type": "String"}
            }}"#,
        )
        .unwrap();

        let names: Vec<String> = template
            .parameters()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["Zebra", "Alpha", "Middle"]);
    }

    #[test]
    fn test_parameters_absent_block() {
        let template = Template::from_json(r#"{"Resources": {}}"#).unwrap();
        assert!(template.parameters().is_empty());
    }

    #[test]
    fn test_constraint_extraction() {
        let options = json!({
            "Type": "Number",
            "Default": 5,
            "NoEcho": true,
            "AllowedValues": [1, 2, 5],
            "MinValue": 1,
            "MaxValue": "10",
            "Description": "Node count",
            "ConstraintDescription": "must be between 1 and 10"
        });

        let constraint = ParameterConstraint::from_value(&options);
        assert!(constraint.is_numeric());
        assert_eq!(constraint.default.as_deref(), Some("5"));
        assert!(constraint.no_echo);
        assert_eq!(
            constraint.allowed_values,
            Some(vec!["1".to_string(), "2".to_string(), "5".to_string()])
        );
        assert_eq!(constraint.min_value, Some(1.0));
        assert_eq!(constraint.max_value, Some(10.0));
        assert_eq!(
            constraint.constraint_description.as_deref(),
            Some("must be between 1 and 10")
        );
    }

    #[test]
    fn test_constraint_defaults() {
        let constraint = ParameterConstraint::from_value(&json!({}));
        assert_eq!(constraint.param_type, "String");
        assert!(!constraint.is_numeric());
        assert!(constraint.default.is_none());
        assert!(!constraint.no_echo);
        assert!(constraint.allowed_values.is_none());
    }

    #[test]
    fn test_length_bounds_accept_string_declarations() {
        let constraint =
            ParameterConstraint::from_value(&json!({"MinLength": "3", "MaxLength": 5}));
        assert_eq!(constraint.min_length, Some(3));
        assert_eq!(constraint.max_length, Some(5));
    }
}
