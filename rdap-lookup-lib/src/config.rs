//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `RDAP_*`
//! environment variables, merging them with proper precedence rules and
//! applying the result onto a [`LookupConfig`].
//!
//! Precedence, lowest to highest: built-in defaults, configuration files,
//! environment variables. Command-line flags are applied on top by the CLI.

use crate::error::RdapLookupError;
use crate::types::LookupConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound accepted for `max_redirects` from files and environment.
pub const MAX_REDIRECTS_LIMIT: usize = 20;

/// Configuration loaded from TOML files.
///
/// ```toml
/// [query]
/// max_redirects = 3
/// timeout = "10s"
/// user_agent = "my-tool/1.0"
///
/// [bootstrap]
/// file = "/etc/rdap/dns.json"
///
/// [output]
/// pretty = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Query behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryConfig>,

    /// Bootstrap registry source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<BootstrapConfig>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// `[query]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Redirect/referral bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_redirects: Option<usize>,

    /// Request timeout (as string, e.g., "5s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// `[bootstrap]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Bootstrap snapshot to use instead of the embedded one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Pretty-print JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

impl FileConfig {
    /// Overlay the file's settings onto `config`.
    ///
    /// Only validated configurations should be applied; an unparseable
    /// timeout is skipped.
    pub fn apply_to(&self, mut config: LookupConfig) -> LookupConfig {
        if let Some(query) = &self.query {
            if let Some(max_redirects) = query.max_redirects {
                config.max_redirects = max_redirects;
            }
            if let Some(timeout) = query.timeout.as_deref().and_then(parse_timeout_string) {
                config.timeout = Some(timeout);
            }
            if let Some(user_agent) = &query.user_agent {
                config.user_agent = user_agent.clone();
            }
        }

        if let Some(file) = self.bootstrap.as_ref().and_then(|b| b.file.clone()) {
            config.bootstrap_file = Some(file);
        }

        config
    }

    /// Pretty-printing preference, if the file sets one.
    pub fn pretty(&self) -> Option<bool> {
        self.output.as_ref().and_then(|o| o.pretty)
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Report loaded files at `info` rather than `debug` level
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if reading, parsing or
    /// validation fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, RdapLookupError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RdapLookupError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            RdapLookupError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            RdapLookupError::config(format!(
                "Failed to parse TOML configuration '{}': {}",
                path.display(),
                e
            ))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Files that exist but fail to load are reported as errors rather than
    /// skipped.
    ///
    /// # Returns
    ///
    /// Merged configuration from all discovered files.
    pub fn discover_and_load(&self) -> Result<FileConfig, RdapLookupError> {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        let mut merged_config = FileConfig::default();
        for path in candidates.into_iter().flatten() {
            let config = self.load_file(&path)?;
            if self.verbose {
                info!(path = %path.display(), "Loaded configuration file");
            } else {
                debug!(path = %path.display(), "Loaded configuration file");
            }
            merged_config = self.merge_configs(merged_config, config);
        }

        Ok(merged_config)
    }

    /// `./rdap-lookup.toml` in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let path = Path::new("./rdap-lookup.toml");
        path.exists().then(|| path.to_path_buf())
    }

    /// `~/.rdap-lookup.toml`.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".rdap-lookup.toml");
        path.exists().then_some(path)
    }

    /// `$XDG_CONFIG_HOME/rdap-lookup/config.toml`, falling back to `~/.config`.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("rdap-lookup").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`, field
    /// by field.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            query: match (lower.query, higher.query) {
                (Some(mut lower_query), Some(higher_query)) => {
                    if higher_query.max_redirects.is_some() {
                        lower_query.max_redirects = higher_query.max_redirects;
                    }
                    if higher_query.timeout.is_some() {
                        lower_query.timeout = higher_query.timeout;
                    }
                    if higher_query.user_agent.is_some() {
                        lower_query.user_agent = higher_query.user_agent;
                    }
                    Some(lower_query)
                }
                (lower_query, higher_query) => higher_query.or(lower_query),
            },
            bootstrap: match (lower.bootstrap, higher.bootstrap) {
                (Some(lower_bootstrap), Some(higher_bootstrap)) => Some(BootstrapConfig {
                    file: higher_bootstrap.file.or(lower_bootstrap.file),
                }),
                (lower_bootstrap, higher_bootstrap) => higher_bootstrap.or(lower_bootstrap),
            },
            output: match (lower.output, higher.output) {
                (Some(lower_output), Some(higher_output)) => Some(OutputConfig {
                    pretty: higher_output.pretty.or(lower_output.pretty),
                }),
                (lower_output, higher_output) => higher_output.or(lower_output),
            },
        }
    }

    /// Validate a configuration for common issues.
    pub fn validate_config(&self, config: &FileConfig) -> Result<(), RdapLookupError> {
        if let Some(query) = &config.query {
            if let Some(max_redirects) = query.max_redirects {
                if max_redirects > MAX_REDIRECTS_LIMIT {
                    return Err(RdapLookupError::config(format!(
                        "max_redirects must be between 0 and {}",
                        MAX_REDIRECTS_LIMIT
                    )));
                }
            }

            if let Some(timeout_str) = &query.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(RdapLookupError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout_str
                    )));
                }
            }

            if let Some(user_agent) = &query.user_agent {
                if user_agent.trim().is_empty() {
                    return Err(RdapLookupError::config("user_agent cannot be empty"));
                }
            }
        }

        if let Some(file) = config.bootstrap.as_ref().and_then(|b| b.file.as_ref()) {
            if file.as_os_str().is_empty() {
                return Err(RdapLookupError::config("bootstrap file path cannot be empty"));
            }
        }

        Ok(())
    }
}

/// Environment variable configuration.
///
/// Mirrors the file settings through `RDAP_*` variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub max_redirects: Option<usize>,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub bootstrap_file: Option<PathBuf>,
    pub pretty: Option<bool>,
}

impl EnvConfig {
    /// Build from a variable lookup function.
    ///
    /// Invalid values are logged as warnings and ignored.
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env_config = EnvConfig::default();

        // RDAP_MAX_REDIRECTS - redirect/referral bound
        if let Some(val) = get("RDAP_MAX_REDIRECTS") {
            match val.trim().parse::<usize>() {
                Ok(max) if max <= MAX_REDIRECTS_LIMIT => env_config.max_redirects = Some(max),
                _ => warn!(
                    "Ignoring invalid RDAP_MAX_REDIRECTS='{}', must be 0-{}",
                    val, MAX_REDIRECTS_LIMIT
                ),
            }
        }

        // RDAP_TIMEOUT - request timeout
        if let Some(val) = get("RDAP_TIMEOUT") {
            match parse_timeout_string(&val) {
                Some(timeout) => env_config.timeout = Some(timeout),
                None => warn!(
                    "Ignoring invalid RDAP_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                    val
                ),
            }
        }

        // RDAP_USER_AGENT
        if let Some(val) = get("RDAP_USER_AGENT") {
            if val.trim().is_empty() {
                warn!("Ignoring empty RDAP_USER_AGENT");
            } else {
                env_config.user_agent = Some(val);
            }
        }

        // RDAP_BOOTSTRAP_FILE - bootstrap snapshot path
        if let Some(val) = get("RDAP_BOOTSTRAP_FILE") {
            if !val.trim().is_empty() {
                env_config.bootstrap_file = Some(PathBuf::from(val.trim()));
            }
        }

        // RDAP_PRETTY - pretty JSON output
        if let Some(val) = get("RDAP_PRETTY") {
            match parse_bool(&val) {
                Some(pretty) => env_config.pretty = Some(pretty),
                None => warn!("Ignoring invalid RDAP_PRETTY='{}', use true/false", val),
            }
        }

        env_config
    }

    /// Overlay the environment settings onto `config`.
    pub fn apply_to(&self, mut config: LookupConfig) -> LookupConfig {
        if let Some(max_redirects) = self.max_redirects {
            config.max_redirects = max_redirects;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = Some(timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(file) = &self.bootstrap_file {
            config.bootstrap_file = Some(file.clone());
        }
        config
    }
}

/// Load configuration from the process environment.
///
/// Parses all `RDAP_*` environment variables; see [`EnvConfig::from_vars`].
pub fn load_env_config() -> EnvConfig {
    EnvConfig::from_vars(|name| env::var(name).ok())
}

/// Parse a timeout such as "5s", "2m" or a bare number of seconds.
///
/// Zero and malformed values yield `None`.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let seconds = if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        // Assume seconds if no unit
        timeout_str.parse::<u64>().ok()
    }?;

    (seconds > 0).then(|| Duration::from_secs(seconds))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio_test::{assert_err, assert_ok};

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("30S"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string(" 5 "), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("0s"), None);
        assert_eq!(parse_timeout_string("5ms"), None);
        assert_eq!(parse_timeout_string("invalid"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[query]
max_redirects = 3
timeout = "10s"
user_agent = "test-agent/1.0"

[bootstrap]
file = "/tmp/dns.json"

[output]
pretty = false
"#,
        );

        let manager = ConfigManager::new(false);
        let config = assert_ok!(manager.load_file(temp_file.path()));

        let query = config.query.clone().unwrap();
        assert_eq!(query.max_redirects, Some(3));
        assert_eq!(query.timeout.as_deref(), Some("10s"));
        assert_eq!(config.pretty(), Some(false));

        let lookup = config.apply_to(LookupConfig::default());
        assert_eq!(lookup.max_redirects, 3);
        assert_eq!(lookup.timeout, Some(Duration::from_secs(10)));
        assert_eq!(lookup.user_agent, "test-agent/1.0");
        assert_eq!(lookup.bootstrap_file, Some(PathBuf::from("/tmp/dns.json")));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let manager = ConfigManager::new(false);

        let temp_file = write_config("[query]\nmax_redirects = 50\n");
        assert_eq!(assert_err!(manager.load_file(temp_file.path())).kind(), "config");

        let temp_file = write_config("[query]\ntimeout = \"soon\"\n");
        assert_eq!(assert_err!(manager.load_file(temp_file.path())).kind(), "config");

        let temp_file = write_config("[query]\nmax_redirects = \"five\"\n");
        assert_eq!(assert_err!(manager.load_file(temp_file.path())).kind(), "config");

        let temp_file = write_config("[querry]\nmax_redirects = 2\n");
        assert_eq!(assert_err!(manager.load_file(temp_file.path())).kind(), "config");

        let err = assert_err!(manager.load_file("/nonexistent/rdap-lookup.toml"));
        assert_eq!(err.kind(), "file");
    }

    #[test]
    fn test_empty_config_changes_nothing() {
        let temp_file = write_config("");
        let config = assert_ok!(ConfigManager::new(false).load_file(temp_file.path()));
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.apply_to(LookupConfig::default()), LookupConfig::default());
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            query: Some(QueryConfig {
                max_redirects: Some(2),
                timeout: Some("5s".to_string()),
                user_agent: None,
            }),
            bootstrap: Some(BootstrapConfig {
                file: Some(PathBuf::from("/lower.json")),
            }),
            output: Some(OutputConfig { pretty: Some(true) }),
        };
        let higher = FileConfig {
            query: Some(QueryConfig {
                max_redirects: Some(7),
                timeout: None,
                user_agent: Some("higher".to_string()),
            }),
            bootstrap: None,
            output: Some(OutputConfig { pretty: None }),
        };

        let merged = manager.merge_configs(lower, higher);
        let query = merged.query.clone().unwrap();
        assert_eq!(query.max_redirects, Some(7));
        assert_eq!(query.timeout.as_deref(), Some("5s"));
        assert_eq!(query.user_agent.as_deref(), Some("higher"));
        assert_eq!(
            merged.bootstrap.and_then(|b| b.file),
            Some(PathBuf::from("/lower.json"))
        );
        assert_eq!(merged.output.and_then(|o| o.pretty), Some(true));
    }

    #[test]
    fn test_env_config_parsing() {
        let env_config = EnvConfig::from_vars(vars(&[
            ("RDAP_MAX_REDIRECTS", "2"),
            ("RDAP_TIMEOUT", "1m"),
            ("RDAP_USER_AGENT", "env-agent"),
            ("RDAP_BOOTSTRAP_FILE", "/env/dns.json"),
            ("RDAP_PRETTY", "no"),
        ]));

        assert_eq!(env_config.max_redirects, Some(2));
        assert_eq!(env_config.timeout, Some(Duration::from_secs(60)));
        assert_eq!(env_config.user_agent.as_deref(), Some("env-agent"));
        assert_eq!(env_config.bootstrap_file, Some(PathBuf::from("/env/dns.json")));
        assert_eq!(env_config.pretty, Some(false));
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let env_config = EnvConfig::from_vars(vars(&[
            ("RDAP_MAX_REDIRECTS", "100"),
            ("RDAP_TIMEOUT", "later"),
            ("RDAP_USER_AGENT", "  "),
            ("RDAP_PRETTY", "maybe"),
        ]));
        assert_eq!(env_config, EnvConfig::default());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = FileConfig {
            query: Some(QueryConfig {
                max_redirects: Some(3),
                timeout: Some("10s".to_string()),
                user_agent: Some("file-agent".to_string()),
            }),
            ..Default::default()
        };
        let env_config = EnvConfig::from_vars(vars(&[("RDAP_MAX_REDIRECTS", "1")]));

        let config = env_config.apply_to(file.apply_to(LookupConfig::default()));
        assert_eq!(config.max_redirects, 1);
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.user_agent, "file-agent");
    }
}
