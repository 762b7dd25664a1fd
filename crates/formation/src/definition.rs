//! Stack definition building.
//!
//! Merges a compiled template with operator-supplied options into the exact
//! payload the remote API expects. Building never prompts; interactive
//! callers resolve missing parameters first and the builder only checks
//! completeness.

use crate::error::{Error, Result};
use crate::scrubber::scrub;
use crate::template::Template;
use serde::{Deserialize, Serialize};

/// One resolved parameter in a stack definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackParameter {
    /// Declared parameter name
    pub parameter_key: String,
    /// Resolved value
    pub parameter_value: String,
}

/// The payload submitted to the remote API for create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackDefinition {
    /// Serialized, scrubbed template body
    pub template_body: String,
    /// Resolved parameters, in template declaration order
    pub parameters: Vec<StackParameter>,
    /// Deduplicated capability opt-ins
    pub capabilities: Vec<String>,
    /// Deduplicated notification targets
    pub notification_targets: Vec<String>,
    /// Whether the remote side should skip rollback on failure
    pub disable_rollback: bool,
    /// Server-side operation timeout, omitted for the remote default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_in_minutes: Option<u32>,
}

/// Operator-supplied options merged into a definition.
#[derive(Debug, Clone, PartialEq)]
pub struct StackOptions {
    /// Parameter name/value pairs resolved from flags, config, or prompts
    pub parameters: Vec<(String, String)>,
    /// Capability opt-ins, possibly with duplicates
    pub capabilities: Vec<String>,
    /// Notification targets, possibly with duplicates
    pub notification_targets: Vec<String>,
    /// Rollback-on-failure intent (rollback enabled by default)
    pub rollback: bool,
    /// Stack operation timeout in minutes
    pub timeout_in_minutes: Option<u32>,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            parameters: Vec::new(),
            capabilities: Vec::new(),
            notification_targets: Vec::new(),
            rollback: true,
            timeout_in_minutes: None,
        }
    }
}

impl StackOptions {
    /// Look up an already-resolved parameter value.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Record a resolved parameter value, replacing any earlier resolution.
    pub fn set_parameter(&mut self, name: &str, value: &str) {
        match self.parameters.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => value.clone_into(existing),
            None => self.parameters.push((name.to_string(), value.to_string())),
        }
    }
}

/// Build a submission-ready stack definition.
///
/// The template is scrubbed in place first. Every declared parameter must
/// resolve to an operator-supplied value or a template default, and the
/// resulting mapping contains exactly the declared names.
///
/// # Errors
///
/// Returns [`Error::MissingParameters`] when required parameters remain
/// unresolved, and [`Error::InvalidTimeout`] for a zero timeout.
pub fn build(template: &mut Template, options: &StackOptions) -> Result<StackDefinition> {
    scrub(template);

    let mut parameters = Vec::new();
    let mut missing = Vec::new();
    for (name, constraint) in template.parameters() {
        let resolved = options
            .parameter(&name)
            .map(str::to_string)
            .or_else(|| constraint.default.clone());
        match resolved {
            Some(value) => parameters.push(StackParameter {
                parameter_key: name,
                parameter_value: value,
            }),
            None => missing.push(name),
        }
    }
    if !missing.is_empty() {
        return Err(Error::MissingParameters { names: missing });
    }

    if options.timeout_in_minutes == Some(0) {
        return Err(Error::InvalidTimeout);
    }

    Ok(StackDefinition {
        template_body: template.to_json()?,
        parameters,
        capabilities: dedup_preserving_order(&options.capabilities),
        notification_targets: dedup_preserving_order(&options.notification_targets),
        disable_rollback: !options.rollback,
        timeout_in_minutes: options.timeout_in_minutes,
    })
}

fn dedup_preserving_order(items: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(item) {
            seen.push(item.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        Template::from_json(
            r#"{"Parameters": {
                "InstanceType": {
                    "Type": "String",
                    "AllowedValues": ["t2.micro", "t2.small"],
                    "X-Generator": "sparkle"
                },
                "NodeCount": {"Type": "Number", "Default": 2}
            },
            "Resources": {}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_build_resolves_declared_parameters() {
        let mut template = template();
        let mut options = StackOptions::default();
        options.set_parameter("InstanceType", "t2.micro");

        let definition = build(&mut template, &options).unwrap();
        let keys: Vec<&str> = definition
            .parameters
            .iter()
            .map(|p| p.parameter_key.as_str())
            .collect();
        assert_eq!(keys, vec!["InstanceType", "NodeCount"]);
        assert_eq!(definition.parameters[0].parameter_value, "t2.micro");
        // NodeCount falls back to the template default
        assert_eq!(definition.parameters[1].parameter_value, "2");
    }

    #[test]
    fn test_build_fails_on_unresolved_required_parameter() {
        let mut template = template();
        let err = build(&mut template, &StackOptions::default()).unwrap_err();
        match err {
            Error::MissingParameters { names } => assert_eq!(names, vec!["InstanceType"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_scrubs_template_body() {
        let mut template = template();
        let mut options = StackOptions::default();
        options.set_parameter("InstanceType", "t2.small");

        let definition = build(&mut template, &options).unwrap();
        assert!(!definition.template_body.contains("X-Generator"));
    }

    #[test]
    fn test_build_dedups_capabilities_and_notifications() {
        let mut template = Template::from_json(r#"{"Resources": {}}"#).unwrap();
        let options = StackOptions {
            capabilities: vec![
                "CAPABILITY_IAM".to_string(),
                "CAPABILITY_NAMED".to_string(),
                "CAPABILITY_IAM".to_string(),
            ],
            notification_targets: vec!["arn:a".to_string(), "arn:a".to_string()],
            ..StackOptions::default()
        };

        let definition = build(&mut template, &options).unwrap();
        assert_eq!(definition.capabilities, vec!["CAPABILITY_IAM", "CAPABILITY_NAMED"]);
        assert_eq!(definition.notification_targets, vec!["arn:a"]);
    }

    #[test]
    fn test_build_negates_rollback_intent() {
        let mut template = Template::from_json(r#"{"Resources": {}}"#).unwrap();
        let definition = build(&mut template, &StackOptions::default()).unwrap();
        assert!(!definition.disable_rollback);

        let mut template = Template::from_json(r#"{"Resources": {}}"#).unwrap();
        let options = StackOptions {
            rollback: false,
            ..StackOptions::default()
        };
        let definition = build(&mut template, &options).unwrap();
        assert!(definition.disable_rollback);
    }

    #[test]
    fn test_build_rejects_zero_timeout() {
        let mut template = Template::from_json(r#"{"Resources": {}}"#).unwrap();
        let options = StackOptions {
            timeout_in_minutes: Some(0),
            ..StackOptions::default()
        };
        assert!(matches!(
            build(&mut template, &options),
            Err(Error::InvalidTimeout)
        ));
    }

    #[test]
    fn test_timeout_omitted_when_unset() {
        let mut template = Template::from_json(r#"{"Resources": {}}"#).unwrap();
        let definition = build(&mut template, &StackOptions::default()).unwrap();
        assert!(definition.timeout_in_minutes.is_none());

        let serialized = serde_json::to_string(&definition).unwrap();
        assert!(!serialized.contains("TimeoutInMinutes"));
    }

    #[test]
    fn test_set_parameter_replaces_existing_value() {
        let mut options = StackOptions::default();
        options.set_parameter("Key", "first");
        options.set_parameter("Key", "second");
        assert_eq!(options.parameter("Key"), Some("second"));
        assert_eq!(options.parameters.len(), 1);
    }
}
