//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `url`
//! - `server.host`
//! - `docs.edit_url`
//! - `plugins.analytics.tracking_id`
//! - `deploy.remote`

mod expand;
mod theme;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use theme::{
    ColorsConfig, FooterConfig, FooterLink, FooterLinkColumn, FooterStyle, NavbarConfig,
    NavbarItem, NavbarPosition, PrismConfig, ThemeConfig,
};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub out_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "folio.toml";

/// What to do when a link cannot be resolved at build time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokenLinkPolicy {
    /// Fail the build.
    #[default]
    Throw,
    /// Log a warning and continue.
    Warn,
    /// Skip silently.
    Ignore,
}

/// Site configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site title (required).
    pub title: String,
    /// Short subtitle shown on the landing page.
    pub tagline: String,
    /// Production origin, e.g. `https://example.github.io`.
    pub url: String,
    /// Path prefix the site is served under.
    pub base_url: String,
    /// Hosting organization (GitHub user or org).
    pub organization_name: Option<String>,
    /// Hosting project (repository name).
    pub project_name: Option<String>,
    /// Emit `page/index.html` (true) or `page.html` (false).
    pub trailing_slash: bool,
    /// Policy for links to documents that don't exist.
    pub on_broken_links: BrokenLinkPolicy,
    /// Policy for relative `.md` links that don't resolve.
    pub on_broken_markdown_links: BrokenLinkPolicy,
    /// Locale configuration.
    pub i18n: I18nConfig,
    /// Docs preset options (paths are relative strings from TOML).
    pub docs: DocsConfig,
    /// Build output options.
    build: BuildConfigRaw,
    /// Plugin configuration.
    pub plugins: PluginsConfig,
    /// Theme configuration.
    pub theme: ThemeConfig,
    /// Server configuration for `start` and `serve`.
    pub server: ServerConfig,
    /// Deployment configuration.
    pub deploy: DeployConfig,

    /// Resolved absolute paths (set after loading).
    #[serde(skip)]
    pub paths: ResolvedPaths,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Locale configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Locale used for the HTML `lang` attribute.
    pub default_locale: String,
    /// All declared locales.
    pub locales: Vec<String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_owned(),
            locales: Vec::new(),
        }
    }
}

/// Docs preset configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Content directory, relative to the config file.
    pub path: String,
    /// Navigation descriptor, relative to the config file.
    pub sidebar_path: String,
    /// Route prefix for documents (empty serves docs at the site root).
    pub route_base_path: String,
    /// Base URL for "Edit this page" links.
    pub edit_url: Option<String>,
    /// Show last update time on pages.
    ///
    /// Reserved: accepted in the file, but pages never embed timestamps so
    /// rebuilds stay byte-identical.
    pub show_last_update_time: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            path: "docs".to_owned(),
            sidebar_path: "sidebars.yaml".to_owned(),
            route_base_path: "docs".to_owned(),
            edit_url: None,
            show_last_update_time: false,
        }
    }
}

impl DocsConfig {
    /// Route prefix without surrounding slashes.
    #[must_use]
    pub fn route_base(&self) -> &str {
        self.route_base_path.trim_matches('/')
    }
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    out_dir: Option<String>,
}

/// Resolved paths, absolute when loaded from a file.
#[derive(Debug, Default)]
pub struct ResolvedPaths {
    /// Directory containing the Markdown corpus.
    pub source_dir: PathBuf,
    /// Navigation descriptor file.
    pub sidebar_path: PathBuf,
    /// Build output directory.
    pub out_dir: PathBuf,
    /// Project data directory (`.folio/`).
    pub project_dir: PathBuf,
}

impl ResolvedPaths {
    /// Output directory used by the dev server (`.folio/dev/`).
    #[must_use]
    pub fn dev_dir(&self) -> PathBuf {
        self.project_dir.join("dev")
    }
}

/// Plugin configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Analytics tracking snippet (optional section).
    pub analytics: Option<AnalyticsConfig>,
}

/// Analytics plugin configuration.
#[derive(Debug, Deserialize)]
pub struct AnalyticsConfig {
    /// Tracking ID, e.g. `G-XXXXXXX`.
    pub tracking_id: String,
    /// Ask the tracker to anonymize client IPs.
    #[serde(default = "default_true")]
    pub anonymize_ip: bool,
}

fn default_true() -> bool {
    true
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Deployment configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Git remote to push to. Derived from organization/project when unset.
    pub remote: Option<String>,
    /// Branch holding the published site.
    pub branch: String,
    /// Commit message for deploy commits.
    pub message: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            remote: None,
            branch: "gh-pages".to_owned(),
            message: "Deploy website".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// No config file in the directory or any of its parents.
    #[error("No {CONFIG_FILENAME} found in {} or any parent directory", .0.display())]
    NoConfigFile(PathBuf),
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
        /// Config field path (e.g., "`deploy.remote`").
        field: String,
        /// Error message (e.g., "${`DEPLOY_REMOTE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Search for the config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, no config file
    /// is found, parsing fails, or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else {
            let cwd = std::env::current_dir()?;
            let discovered = discover_config(&cwd).ok_or(ConfigError::NoConfigFile(cwd))?;
            Self::load_from_file(&discovered)?
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text rooted at `base_dir`.
    ///
    /// Performs env expansion and path resolution but not validation.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or env expansion fails.
    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.normalize();
        config.resolve_paths(base_dir);
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.paths.source_dir.clone_from(source_dir);
        }
        if let Some(out_dir) = &settings.out_dir {
            self.paths.out_dir.clone_from(out_dir);
        }
    }

    /// Full public URL of the site root (`url` + `base_url`).
    #[must_use]
    pub fn site_url(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.base_url)
    }

    /// Git remote used by `deploy`.
    ///
    /// Uses `deploy.remote` when set, otherwise derives a GitHub remote from
    /// `organization_name` and `project_name`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no remote can be determined.
    pub fn deploy_remote(&self) -> Result<String, ConfigError> {
        if let Some(remote) = &self.deploy.remote {
            require_non_empty(remote, "deploy.remote")?;
            return Ok(remote.clone());
        }
        match (&self.organization_name, &self.project_name) {
            (Some(org), Some(project)) if !org.is_empty() && !project.is_empty() => {
                Ok(format!("https://github.com/{org}/{project}.git"))
            }
            _ => Err(ConfigError::Validation(
                "deploy requires deploy.remote or organization_name and project_name".to_owned(),
            )),
        }
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            title: String::new(),
            tagline: String::new(),
            url: String::new(),
            base_url: "/".to_owned(),
            organization_name: None,
            project_name: None,
            trailing_slash: true,
            on_broken_links: BrokenLinkPolicy::Throw,
            on_broken_markdown_links: BrokenLinkPolicy::Warn,
            i18n: I18nConfig::default(),
            docs: DocsConfig::default(),
            build: BuildConfigRaw::default(),
            plugins: PluginsConfig::default(),
            theme: ThemeConfig::default(),
            server: ServerConfig::default(),
            deploy: DeployConfig::default(),
            paths: ResolvedPaths::default(),
            config_path: None,
        };
        config.normalize();
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Fill derived defaults that depend on other fields.
    fn normalize(&mut self) {
        if !self.base_url.is_empty() && !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        if self.i18n.locales.is_empty() {
            self.i18n.locales = vec![self.i18n.default_locale.clone()];
        }
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_i18n()?;
        self.theme.validate()?;
        self.validate_server()?;
        Ok(())
    }

    /// Validate site identity fields.
    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.url, "url")?;
        require_http_url(&self.url, "url")?;

        let after_scheme = self.url.split_once("://").map_or("", |(_, rest)| rest);
        if after_scheme.trim_end_matches('/').contains('/') {
            return Err(ConfigError::Validation(
                "url must not contain a path, use base_url instead".to_owned(),
            ));
        }

        require_non_empty(&self.base_url, "base_url")?;
        if !self.base_url.starts_with('/') {
            return Err(ConfigError::Validation(
                "base_url must start with '/'".to_owned(),
            ));
        }

        if let Some(analytics) = &self.plugins.analytics {
            require_non_empty(&analytics.tracking_id, "plugins.analytics.tracking_id")?;
        }
        if let Some(edit_url) = &self.docs.edit_url {
            require_http_url(edit_url, "docs.edit_url")?;
        }
        Ok(())
    }

    /// Validate locale settings.
    fn validate_i18n(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.i18n.default_locale, "i18n.default_locale")?;
        if !self.i18n.locales.contains(&self.i18n.default_locale) {
            return Err(ConfigError::Validation(format!(
                "i18n.locales must contain the default locale '{}'",
                self.i18n.default_locale
            )));
        }
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.url = expand::expand_env(&self.url, "url")?;
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref edit_url) = self.docs.edit_url {
            self.docs.edit_url = Some(expand::expand_env(edit_url, "docs.edit_url")?);
        }

        if let Some(ref mut analytics) = self.plugins.analytics {
            analytics.tracking_id =
                expand::expand_env(&analytics.tracking_id, "plugins.analytics.tracking_id")?;
        }

        if let Some(ref remote) = self.deploy.remote {
            self.deploy.remote = Some(expand::expand_env(remote, "deploy.remote")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.paths = ResolvedPaths {
            source_dir: config_dir.join(&self.docs.path),
            sidebar_path: config_dir.join(&self.docs.sidebar_path),
            out_dir: config_dir.join(self.build.out_dir.as_deref().unwrap_or("build")),
            project_dir: config_dir.join(".folio"),
        };
    }
}
