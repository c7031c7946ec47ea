//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `WC_*`
//! environment variables, and merging them with proper precedence rules.

use crate::error::WhoisCheckError;
use crate::providers::{ProviderRegistry, ProviderSpec, ResponseFormat};
use crate::types::LookupConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for lookup options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,

    /// Replacement provider list, in trial order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<ProviderEntry>>,
}

/// Default lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Per-provider timeout (e.g., "500ms", "10s", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Artificial delay of the offline provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_delay: Option<String>,

    /// Synthesize placeholder records for unknown domains in demo mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_placeholder: Option<bool>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Print JSON instead of text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Pretty-print JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_pretty: Option<bool>,

    /// Colored, sectioned text output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

/// One `[[providers]]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderEntry {
    pub name: String,
    pub endpoint: String,
    pub format: ResponseFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_format: Option<ResponseFormat>,
}

impl ProviderEntry {
    fn to_spec(&self) -> ProviderSpec {
        let spec = ProviderSpec::new(self.name.clone(), self.endpoint.clone(), self.format.clone());
        match &self.upstream_endpoint {
            Some(endpoint) => spec.via(
                endpoint.clone(),
                self.upstream_format.clone().unwrap_or(ResponseFormat::Wrapped),
            ),
            None => spec,
        }
    }
}

impl FileConfig {
    /// Apply `[defaults]` on top of `config`.
    pub fn apply_to(&self, mut config: LookupConfig) -> LookupConfig {
        if let Some(defaults) = &self.defaults {
            if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_duration_string) {
                config.timeout = timeout;
            }
            if let Some(delay) = defaults
                .offline_delay
                .as_deref()
                .and_then(parse_duration_string)
            {
                config.offline_delay = delay;
            }
            if let Some(placeholder) = defaults.demo_placeholder {
                config.offline_placeholder = placeholder;
            }
        }
        config
    }

    /// Build the configured provider registry, if the file defines one.
    pub fn registry(&self) -> Result<Option<ProviderRegistry>, WhoisCheckError> {
        match &self.providers {
            Some(entries) => {
                let specs = entries.iter().map(ProviderEntry::to_spec).collect();
                ProviderRegistry::new(specs).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, WhoisCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(WhoisCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            WhoisCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config, then `~/.whois-check.toml`, then a file in the current
    /// directory; later files override earlier ones.
    pub fn discover_and_load(&self) -> Result<FileConfig, WhoisCheckError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "ignoring config file: {}", e);
                }
            }
        }

        if self.verbose {
            for path in &loaded_files {
                tracing::info!(path = %path.display(), "loaded config file");
            }
        }

        Ok(merged_config)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./whois-check.toml", "./.whois-check.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".whois-check.toml", "whois-check.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("whois-check").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations; values from `higher` win.
    ///
    /// A provider list is replaced as a whole, never merged entry by entry.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.timeout.is_some() {
                        lower_defaults.timeout = higher_defaults.timeout;
                    }
                    if higher_defaults.offline_delay.is_some() {
                        lower_defaults.offline_delay = higher_defaults.offline_delay;
                    }
                    if higher_defaults.demo_placeholder.is_some() {
                        lower_defaults.demo_placeholder = higher_defaults.demo_placeholder;
                    }
                    Some(lower_defaults)
                }
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            output: match (lower.output, higher.output) {
                (Some(mut lower_output), Some(higher_output)) => {
                    if higher_output.json.is_some() {
                        lower_output.json = higher_output.json;
                    }
                    if higher_output.json_pretty.is_some() {
                        lower_output.json_pretty = higher_output.json_pretty;
                    }
                    if higher_output.pretty.is_some() {
                        lower_output.pretty = higher_output.pretty;
                    }
                    Some(lower_output)
                }
                (lower_output, higher_output) => higher_output.or(lower_output),
            },
            providers: higher.providers.or(lower.providers),
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), WhoisCheckError> {
        if let Some(defaults) = &config.defaults {
            if let Some(timeout_str) = &defaults.timeout {
                match parse_duration_string(timeout_str) {
                    Some(d) if !d.is_zero() => {}
                    _ => {
                        return Err(WhoisCheckError::config(format!(
                            "Invalid timeout '{}'. Use a non-zero value like '500ms', '10s', '1m'",
                            timeout_str
                        )))
                    }
                }
            }

            if let Some(delay_str) = &defaults.offline_delay {
                if parse_duration_string(delay_str).is_none() {
                    return Err(WhoisCheckError::config(format!(
                        "Invalid offline_delay '{}'. Use a value like '0s', '250ms', '1s'",
                        delay_str
                    )));
                }
            }
        }

        if let Some(providers) = &config.providers {
            if providers.is_empty() {
                return Err(WhoisCheckError::config(
                    "The providers list cannot be empty",
                ));
            }

            for entry in providers {
                if entry.name.trim().is_empty() {
                    return Err(WhoisCheckError::config("Provider names cannot be empty"));
                }
                if entry.endpoint.trim().is_empty() {
                    return Err(WhoisCheckError::config(format!(
                        "Provider '{}' has an empty endpoint",
                        entry.name
                    )));
                }
                if entry.format.is_proxy() && entry.upstream_endpoint.is_none() {
                    return Err(WhoisCheckError::config(format!(
                        "Proxy provider '{}' needs upstream_endpoint",
                        entry.name
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub timeout: Option<Duration>,
    pub offline_delay: Option<Duration>,
    pub demo_placeholder: Option<bool>,
    pub json: Option<bool>,
    pub pretty: Option<bool>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Apply the lookup-related variables on top of `config`.
    pub fn apply_to(&self, mut config: LookupConfig) -> LookupConfig {
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(delay) = self.offline_delay {
            config.offline_delay = delay;
        }
        if let Some(placeholder) = self.demo_placeholder {
            config.offline_placeholder = placeholder;
        }
        config
    }
}

/// Load configuration from `WC_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

fn load_env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("WC_TIMEOUT") {
        match parse_duration_string(&val) {
            Some(timeout) if !timeout.is_zero() => {
                tracing::debug!("using WC_TIMEOUT={}", val);
                env_config.timeout = Some(timeout);
            }
            _ => tracing::warn!("invalid WC_TIMEOUT='{}', use a value like '10s'", val),
        }
    }

    if let Some(val) = lookup("WC_OFFLINE_DELAY") {
        match parse_duration_string(&val) {
            Some(delay) => {
                tracing::debug!("using WC_OFFLINE_DELAY={}", val);
                env_config.offline_delay = Some(delay);
            }
            None => tracing::warn!("invalid WC_OFFLINE_DELAY='{}', use a value like '1s'", val),
        }
    }

    env_config.demo_placeholder = lookup_bool(&lookup, "WC_DEMO_PLACEHOLDER");
    env_config.json = lookup_bool(&lookup, "WC_JSON");
    env_config.pretty = lookup_bool(&lookup, "WC_PRETTY");

    if let Some(config_path) = lookup("WC_CONFIG") {
        if !config_path.trim().is_empty() {
            tracing::debug!("using WC_CONFIG={}", config_path);
            env_config.config = Some(config_path);
        }
    }

    env_config
}

fn lookup_bool<F>(lookup: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(key)?;
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("invalid {}='{}', use true/false", key, val);
            None
        }
    }
}

/// Parse a duration like "250ms", "5s", "2m". A bare number means seconds.
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    if let Some(ms) = value.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = value.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        value.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_duration_string() {
        assert_eq!(parse_duration_string("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration_string("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration_string("0s"), Some(Duration::ZERO));
        assert_eq!(parse_duration_string("soon"), None);
        assert_eq!(parse_duration_string("307445734561825862m"), None);
        assert_eq!(
            parse_duration_string("18446744073709551615s"),
            Some(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
timeout = "3s"
offline_delay = "0s"
demo_placeholder = false

[output]
json = true
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let lookup = config.apply_to(LookupConfig::default());
        assert_eq!(lookup.timeout, Duration::from_secs(3));
        assert_eq!(lookup.offline_delay, Duration::ZERO);
        assert!(!lookup.offline_placeholder);
        assert_eq!(config.output.as_ref().unwrap().json, Some(true));
        assert!(config.registry().unwrap().is_none());
    }

    #[test]
    fn test_load_provider_list() {
        let temp_file = write_config(
            r#"
[[providers]]
name = "WhoisAPI"
endpoint = "https://api.example/whois"
format = "whoisapi"

[[providers]]
name = "Proxy"
endpoint = "https://proxy.example/get?url="
format = "proxy"
upstream_endpoint = "https://whois.freeapi.app/api/whois"
upstream_format = "freeapi"

[[providers]]
name = "Demo Mode"
endpoint = "demo"
format = "demo"
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();
        let registry = config.registry().unwrap().unwrap();

        assert_eq!(registry.len(), 3);
        assert!(registry.ends_with_offline());
        let proxy = &registry.providers()[1];
        assert_eq!(proxy.format, ResponseFormat::ProxyEnvelope);
        assert_eq!(proxy.upstream.as_ref().unwrap().format, ResponseFormat::Wrapped);
    }

    #[test]
    fn test_unknown_format_tag_is_kept() {
        let temp_file = write_config(
            r#"
[[providers]]
name = "Future API"
endpoint = "https://future.example"
format = "graphql"
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();
        let registry = config.registry().unwrap().unwrap();
        assert_eq!(
            registry.providers()[0].format,
            ResponseFormat::Unsupported("graphql".to_string())
        );
    }

    #[test]
    fn test_invalid_timeout() {
        let temp_file = write_config("[defaults]\ntimeout = \"0s\"\n");
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_proxy_needs_upstream() {
        let temp_file = write_config(
            r#"
[[providers]]
name = "Proxy"
endpoint = "https://proxy.example/?"
format = "corsproxy"
"#,
        );
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let manager = ConfigManager::new(false);
        let err = manager.load_file("/nonexistent/whois-check.toml").unwrap_err();
        assert!(matches!(err, WhoisCheckError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("10s".to_string()),
                offline_delay: Some("1s".to_string()),
                ..Default::default()
            }),
            providers: Some(vec![ProviderEntry {
                name: "Demo Mode".to_string(),
                endpoint: "demo".to_string(),
                format: ResponseFormat::Offline,
                upstream_endpoint: None,
                upstream_format: None,
            }]),
            ..Default::default()
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("3s".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.timeout.as_deref(), Some("3s")); // Higher wins
        assert_eq!(defaults.offline_delay.as_deref(), Some("1s")); // Lower preserved
        assert_eq!(merged.providers.unwrap().len(), 1);
    }

    #[test]
    fn test_env_config() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("WC_TIMEOUT", "750ms"),
            ("WC_OFFLINE_DELAY", "nonsense"),
            ("WC_DEMO_PLACEHOLDER", "off"),
            ("WC_JSON", "yes"),
        ]);
        let env_config = load_env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env_config.timeout, Some(Duration::from_millis(750)));
        assert_eq!(env_config.offline_delay, None);
        assert_eq!(env_config.demo_placeholder, Some(false));
        assert_eq!(env_config.json, Some(true));
        assert_eq!(env_config.pretty, None);

        let lookup = env_config.apply_to(LookupConfig::default());
        assert_eq!(lookup.timeout, Duration::from_millis(750));
        assert_eq!(lookup.offline_delay, Duration::from_secs(1));
        assert!(!lookup.offline_placeholder);
    }
}
