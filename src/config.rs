//! Layered configuration.
//!
//! Options resolve flag > config file. The file lives at
//! `~/.config/stratus/config.toml` and every section is optional; a missing
//! file yields the defaults. The resolved [`Settings`] value is built once
//! at startup and passed by reference into the commands.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{Cli, ListArgs, StackArgs};
use cloudkit::{ConnectionRegistry, Credentials, DEFAULT_EVENT_ATTRIBUTES, Poller};
use formation::StackOptions;

/// Display attributes shown by `list` when none are configured
pub const DEFAULT_LIST_ATTRIBUTES: [&str; 3] = ["StackName", "StackStatus", "CreationTime"];

/// Every display attribute a stack summary carries
pub const ALL_LIST_ATTRIBUTES: [&str; 6] = [
    "StackName",
    "StackId",
    "StackStatus",
    "CreationTime",
    "LastUpdatedTime",
    "TemplateDescription",
];

// ============================================================================
// Config file schema
// ============================================================================

/// The on-disk configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StratusConfig {
    /// Remote credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Orchestration endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Directory searched for templates when no path is given
    #[serde(default)]
    pub templates_directory: Option<String>,

    /// Default stack submission options
    #[serde(default)]
    pub options: OptionsConfig,

    /// Whether submissions poll events by default
    #[serde(default)]
    pub poll: Option<bool>,

    /// Seconds between poll ticks
    #[serde(default)]
    pub poll_interval_seconds: Option<u64>,

    /// Whether missing parameters are prompted for interactively
    #[serde(default)]
    pub interactive_parameters: Option<bool>,

    /// Display attributes for event output
    #[serde(default)]
    pub attributes: Option<Vec<String>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub access_key_id: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Pre-resolved parameter values
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Capabilities allowed on every submission
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Notification targets attached to every submission
    #[serde(default)]
    pub notification_targets: Vec<String>,
    /// Stack operation timeout in minutes
    #[serde(default)]
    pub timeout_in_minutes: Option<u32>,
    /// Roll back failed operations (enabled unless set to false)
    #[serde(default)]
    pub rollback: Option<bool>,
}

impl StratusConfig {
    /// Load the config from `~/.config/stratus/config.toml`
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        let config_path = home.join(".config").join("stratus").join("config.toml");
        Self::load_from(&config_path)
    }

    /// Load the config from an explicit path, defaulting when absent
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Could not read config file: {}", config_path.display()))?;
        toml::from_str(&content).context("Invalid TOML format in stratus config")
    }
}

// ============================================================================
// Resolved settings
// ============================================================================

/// Config file plus CLI-global overrides, resolved once at startup
pub struct Settings {
    config: StratusConfig,
    key: Option<String>,
    secret: Option<String>,
    region: Option<String>,
    endpoint: Option<String>,
}

impl Settings {
    /// Layer the CLI's global flags over the loaded config
    pub fn resolve(cli: &Cli, config: StratusConfig) -> Self {
        Self {
            config,
            key: cli.key.clone(),
            secret: cli.secret.clone(),
            region: cli.region.clone(),
            endpoint: cli.endpoint.clone(),
        }
    }

    /// Resolved credentials, flag > config
    pub fn credentials(&self) -> Result<Credentials> {
        let access_key_id = self
            .key
            .clone()
            .or_else(|| self.config.credentials.access_key_id.clone())
            .context("access key id not configured; pass --key or set [credentials] in config")?;
        let secret_key = self
            .secret
            .clone()
            .or_else(|| self.config.credentials.secret_key.clone())
            .context("secret key not configured; pass --secret or set [credentials] in config")?;
        let region = self
            .region
            .clone()
            .or_else(|| self.config.credentials.region.clone())
            .context("region not configured; pass --region or set [credentials] in config")?;
        Ok(Credentials {
            access_key_id,
            secret_key,
            region,
        })
    }

    /// A connection registry over the resolved credentials
    pub fn registry(&self) -> Result<ConnectionRegistry> {
        let mut registry = ConnectionRegistry::new(self.credentials()?);
        if let Some(endpoint) = self.endpoint.clone().or_else(|| self.config.endpoint.clone()) {
            registry = registry.with_orchestration_endpoint(endpoint);
        }
        Ok(registry)
    }

    /// Directory searched for templates, flag > config > ./templates
    pub fn templates_directory(&self, flag: Option<&Path>) -> PathBuf {
        if let Some(path) = flag {
            return path.to_path_buf();
        }
        match &self.config.templates_directory {
            Some(configured) => PathBuf::from(shellexpand::tilde(configured).as_ref()),
            None => PathBuf::from("templates"),
        }
    }

    /// Merge config-level and flag-level submission options
    pub fn stack_options(&self, args: &StackArgs) -> Result<StackOptions> {
        let mut options = StackOptions {
            capabilities: self
                .config
                .options
                .capabilities
                .iter()
                .chain(args.capabilities.iter())
                .cloned()
                .collect(),
            notification_targets: self
                .config
                .options
                .notification_targets
                .iter()
                .chain(args.notifications.iter())
                .cloned()
                .collect(),
            rollback: if args.no_rollback {
                false
            } else {
                self.config.options.rollback.unwrap_or(true)
            },
            timeout_in_minutes: args.timeout.or(self.config.options.timeout_in_minutes),
            ..StackOptions::default()
        };
        for (key, value) in &self.config.options.parameters {
            options.set_parameter(key, value);
        }
        for raw in &args.parameters {
            let (key, value) = parse_parameter(raw)?;
            options.set_parameter(key, value);
        }
        Ok(options)
    }

    /// Whether missing parameters should be prompted for
    pub fn interactive_parameters(&self, args: &StackArgs) -> bool {
        !args.no_parameter_prompts && self.config.interactive_parameters.unwrap_or(true)
    }

    /// Whether a submission should poll events afterwards
    pub fn poll(&self, args: &StackArgs) -> bool {
        !args.no_poll && self.config.poll.unwrap_or(true)
    }

    /// Seconds between poll ticks, flag > config > poller default
    pub fn poll_interval(&self, flag_seconds: Option<u64>) -> Duration {
        flag_seconds
            .or(self.config.poll_interval_seconds)
            .map(Duration::from_secs)
            .unwrap_or(Poller::DEFAULT_INTERVAL)
    }

    /// Display attributes for event output
    pub fn event_attributes(&self, overrides: &[String]) -> Vec<String> {
        if !overrides.is_empty() {
            return overrides.to_vec();
        }
        self.config.attributes.clone().unwrap_or_else(|| {
            DEFAULT_EVENT_ATTRIBUTES
                .iter()
                .map(|a| (*a).to_string())
                .collect()
        })
    }

    /// Display attributes for stack listings
    pub fn list_attributes(&self, args: &ListArgs) -> Vec<String> {
        if args.all_attributes {
            return ALL_LIST_ATTRIBUTES.iter().map(|a| (*a).to_string()).collect();
        }
        if !args.attributes.is_empty() {
            return args.attributes.clone();
        }
        DEFAULT_LIST_ATTRIBUTES
            .iter()
            .map(|a| (*a).to_string())
            .collect()
    }
}

/// Split a `KEY:VALUE` parameter flag; the value may itself contain colons
fn parse_parameter(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once(':') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("invalid parameter '{raw}', expected KEY:VALUE"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn stack_args(cli: &Cli) -> &StackArgs {
        match &cli.command {
            crate::cli::Command::Create(args) => args,
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_parse_parameter() {
        assert_eq!(parse_parameter("Key:value").unwrap(), ("Key", "value"));
        // Values keep embedded colons
        assert_eq!(
            parse_parameter("Target:arn:svc:topic").unwrap(),
            ("Target", "arn:svc:topic")
        );
        assert!(parse_parameter("novalue").is_err());
        assert!(parse_parameter(":orphan").is_err());
    }

    #[test]
    fn test_flag_credentials_override_config() {
        let cli = cli(&["stratus", "-K", "FLAG", "-S", "s", "-r", "eu-west-1", "list"]);
        let config = StratusConfig {
            credentials: CredentialsConfig {
                access_key_id: Some("CONFIG".to_string()),
                secret_key: Some("configsecret".to_string()),
                region: Some("us-east-1".to_string()),
            },
            ..StratusConfig::default()
        };
        let settings = Settings::resolve(&cli, config);

        let credentials = settings.credentials().unwrap();
        assert_eq!(credentials.access_key_id, "FLAG");
        assert_eq!(credentials.region, "eu-west-1");
    }

    #[test]
    fn test_missing_credentials_are_an_error() {
        let cli = cli(&["stratus", "list"]);
        let settings = Settings::resolve(&cli, StratusConfig::default());
        let err = settings.credentials().unwrap_err();
        assert!(err.to_string().contains("access key id"));
    }

    #[test]
    fn test_stack_options_merge_flags_over_config() {
        let cli = cli(&[
            "stratus", "create", "web", "-p", "KeyName:flag", "-C", "CAPABILITY_IAM",
        ]);
        let mut config = StratusConfig::default();
        config
            .options
            .parameters
            .insert("KeyName".to_string(), "config".to_string());
        config
            .options
            .parameters
            .insert("Zone".to_string(), "a".to_string());
        config.options.capabilities.push("CAPABILITY_NAMED".to_string());

        let settings = Settings::resolve(&cli, config);
        let options = settings.stack_options(stack_args(&cli)).unwrap();

        assert_eq!(options.parameter("KeyName"), Some("flag"));
        assert_eq!(options.parameter("Zone"), Some("a"));
        assert_eq!(options.capabilities, vec!["CAPABILITY_NAMED", "CAPABILITY_IAM"]);
        assert!(options.rollback);
    }

    #[test]
    fn test_no_rollback_flag_wins() {
        let cli = cli(&["stratus", "create", "web", "--no-rollback"]);
        let settings = Settings::resolve(&cli, StratusConfig::default());
        let options = settings.stack_options(stack_args(&cli)).unwrap();
        assert!(!options.rollback);
    }

    #[test]
    fn test_prompting_toggles() {
        let cli1 = cli(&["stratus", "create", "web"]);
        let settings = Settings::resolve(&cli1, StratusConfig::default());
        assert!(settings.interactive_parameters(stack_args(&cli1)));
        assert!(settings.poll(stack_args(&cli1)));

        let cli2 = cli(&["stratus", "create", "web", "--no-parameter-prompts", "--no-poll"]);
        let settings = Settings::resolve(&cli2, StratusConfig::default());
        assert!(!settings.interactive_parameters(stack_args(&cli2)));
        assert!(!settings.poll(stack_args(&cli2)));

        // Config can disable prompting globally
        let cli = cli(&["stratus", "create", "web"]);
        let config = StratusConfig {
            interactive_parameters: Some(false),
            ..StratusConfig::default()
        };
        let settings = Settings::resolve(&cli, config);
        assert!(!settings.interactive_parameters(stack_args(&cli)));
    }

    #[test]
    fn test_event_attributes_fall_back_to_defaults() {
        let cli = cli(&["stratus", "list"]);
        let settings = Settings::resolve(&cli, StratusConfig::default());
        assert_eq!(
            settings.event_attributes(&[]),
            DEFAULT_EVENT_ATTRIBUTES
                .iter()
                .map(|a| (*a).to_string())
                .collect::<Vec<_>>()
        );

        let overrides = vec!["EventId".to_string()];
        assert_eq!(settings.event_attributes(&overrides), overrides);
    }

    #[test]
    fn test_load_from_missing_file_defaults() {
        let config = StratusConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(config.credentials.access_key_id.is_none());
        assert!(config.poll.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            poll = false
            [credentials]
            access_key_id = "AKID"
            region = "us-east-1"
            [options]
            rollback = false
            [options.parameters]
            KeyName = "ops"
            "#,
        )
        .unwrap();

        let config = StratusConfig::load_from(&path).unwrap();
        assert_eq!(config.poll, Some(false));
        assert_eq!(config.credentials.access_key_id.as_deref(), Some("AKID"));
        assert_eq!(config.options.rollback, Some(false));
        assert_eq!(
            config.options.parameters.get("KeyName").map(String::as_str),
            Some("ops")
        );
    }
}
