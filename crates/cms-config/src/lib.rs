//! Configuration management for CMS template helpers.
//!
//! Parses `cms.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Command-line style overrides can be applied during load via [`Overrides`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `routing.host`
//! - `routing.base_url`

mod expand;

use std::path::{Path, PathBuf};

use cms_core::{DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, RequestContext};
use serde::Deserialize;

/// Settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Override the debug flag.
    pub debug: Option<bool>,
    /// Override the routing host.
    pub host: Option<String>,
    /// Override the template directory.
    pub template_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cms.toml";

/// Default template used for breadcrumbs.
pub const DEFAULT_BREADCRUMB_TEMPLATE: &str = "page/breadcrumb.html";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template helper configuration.
    pub templating: TemplatingConfig,
    /// Static routing context for URL generation.
    pub routing: RoutingConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Template helper configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplatingConfig {
    /// Surface helper misuse (e.g. linking a dynamic page) as errors.
    pub debug: bool,
    /// Template rendered by the breadcrumb function.
    pub breadcrumb_template: String,
    /// Directory to load templates from, relative to the config file.
    pub template_dir: Option<PathBuf>,
}

impl Default for TemplatingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            breadcrumb_template: DEFAULT_BREADCRUMB_TEMPLATE.to_owned(),
            template_dir: None,
        }
    }
}

/// Routing configuration used when there is no live request.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path prefix the application is mounted under.
    pub base_url: String,
    /// Host for absolute URLs; empty disables absolute URLs.
    pub host: String,
    /// `http` or `https`.
    pub scheme: String,
    pub http_port: u16,
    pub https_port: u16,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            host: String::new(),
            scheme: "http".to_owned(),
            http_port: DEFAULT_HTTP_PORT,
            https_port: DEFAULT_HTTPS_PORT,
        }
    }
}

impl RoutingConfig {
    /// Request context described by this configuration.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new()
            .with_base_url(self.base_url.clone())
            .with_host(self.host.clone())
            .with_scheme(self.scheme.clone())
            .with_http_port(self.http_port)
            .with_https_port(self.https_port)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`routing.host`").
        field: String,
        /// Error message (e.g., "${`CMS_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a port field to be non-zero.
fn require_port(port: u16, field: &str) -> Result<(), ConfigError> {
    if port == 0 {
        return Err(ConfigError::Validation(format!("{field} cannot be 0")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `cms.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&Overrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
        }

        Ok(config)
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(debug) = overrides.debug {
            self.templating.debug = debug;
        }
        if let Some(host) = &overrides.host {
            self.routing.host.clone_from(host);
        }
        if let Some(template_dir) = &overrides.template_dir {
            self.templating.template_dir = Some(template_dir.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(
            &self.templating.breadcrumb_template,
            "templating.breadcrumb_template",
        )?;
        self.validate_routing()
    }

    fn validate_routing(&self) -> Result<(), ConfigError> {
        let routing = &self.routing;

        if routing.scheme != "http" && routing.scheme != "https" {
            return Err(ConfigError::Validation(format!(
                "routing.scheme must be http or https, got {:?}",
                routing.scheme
            )));
        }
        require_port(routing.http_port, "routing.http_port")?;
        require_port(routing.https_port, "routing.https_port")?;

        // Base URL is prepended to page paths that already start with a slash
        if !routing.base_url.is_empty()
            && (!routing.base_url.starts_with('/') || routing.base_url.ends_with('/'))
        {
            return Err(ConfigError::Validation(
                "routing.base_url must start with / and not end with /".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.routing.host = expand::expand_env(&self.routing.host, "routing.host")?;
        self.routing.base_url = expand::expand_env(&self.routing.base_url, "routing.base_url")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(dir) = &self.templating.template_dir
            && dir.is_relative()
        {
            self.templating.template_dir = Some(config_dir.join(dir));
        }
    }
}
