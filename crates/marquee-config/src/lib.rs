//! Configuration management for marquee.
//!
//! Parses `marquee.toml` with serde and discovers it in the current
//! directory or any parent. Relative paths are resolved against the
//! directory holding the config file.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in:
//! - `server.host`
//! - `deploy.endpoint`
//! - every string value of the `[app]` table
//!
//! ## Deployment targets
//!
//! Target-dependent values (`S3_BUCKETS`, `S3_BASE_URL`, `DEBUG`) are computed
//! on demand from a [`DeploymentTarget`] by [`Config::target_settings`], and
//! the flattened client configuration by [`Config::client_config`].

mod expand;
mod target;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

pub use target::{DeploymentTarget, TargetSettings};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override CSV data directory.
    pub data_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "marquee.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project naming.
    pub project: ProjectConfig,
    /// Development server configuration.
    pub server: ServerConfig,
    /// Directory layout (relative strings from TOML).
    paths: PathsConfigRaw,
    /// External compiler locations (relative strings from TOML).
    compilers: CompilersConfigRaw,
    /// Buckets per deployment target.
    pub targets: TargetsConfig,
    /// Publishing options.
    pub deploy: DeployConfig,
    /// Free-form client configuration merged into `APP_CONFIG`.
    pub app: Map<String, Value>,

    /// Resolved directory layout (set after loading).
    #[serde(skip)]
    pub paths_resolved: PathsConfig,
    /// Resolved compiler locations (set after loading).
    #[serde(skip)]
    pub compilers_resolved: CompilersConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Project naming.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name (`PROJECT_NAME`).
    pub name: String,
    /// Name used as the S3 key prefix; defaults to `name`.
    deployed_name: Option<String>,
}

impl ProjectConfig {
    /// Name the site is deployed under.
    #[must_use]
    pub fn deployed_name(&self) -> &str {
        self.deployed_name.as_deref().unwrap_or(&self.name)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "marquee".to_owned(),
            deployed_name: None,
        }
    }
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
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PathsConfigRaw {
    data_dir: Option<String>,
    www_dir: Option<String>,
    templates_dir: Option<String>,
    less_dir: Option<String>,
    jst_dir: Option<String>,
    gzip_dir: Option<String>,
}

/// Resolved directory layout with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct PathsConfig {
    /// CSV datasets (`<identifier>.csv`).
    pub data_dir: PathBuf,
    /// Static files; also the default render output root.
    pub www_dir: PathBuf,
    /// Page templates.
    pub templates_dir: PathBuf,
    /// LESS sources.
    pub less_dir: PathBuf,
    /// JST template sources.
    pub jst_dir: PathBuf,
    /// Gzipped mirror of `www_dir` used for publishing.
    pub gzip_dir: PathBuf,
}

impl PathsConfig {
    /// Where `awards.json` is written.
    #[must_use]
    pub fn awards_json(&self) -> PathBuf {
        self.www_dir.join("live-data").join("awards.json")
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CompilersConfigRaw {
    lessc: Option<String>,
    jst: Option<String>,
}

/// Resolved compiler executables.
#[derive(Debug, Default, Clone)]
pub struct CompilersConfig {
    /// LESS compiler (reads source on stdin).
    pub lessc: PathBuf,
    /// JST package compiler.
    pub jst: PathBuf,
}

/// Buckets for each deployed target.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TargetsConfig {
    pub production: TargetConfig,
    pub staging: TargetConfig,
}

/// Buckets for a single target.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TargetConfig {
    /// S3 bucket names.
    pub s3_buckets: Vec<String>,
}

/// Publishing options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// AWS region.
    pub region: String,
    /// S3-compatible endpoint URL.
    pub endpoint: Option<String>,
    /// `Cache-Control: max-age` for uploaded objects, in seconds.
    pub cache_max_age: u32,
    /// File extensions that are gzipped before upload.
    pub gzip_types: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_owned(),
            endpoint: None,
            cache_max_age: 5,
            gzip_types: ["html", "js", "json", "css", "xml", "txt"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
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
    /// Unrecognized deployment target name.
    #[error("Unknown deployment target: {0} (expected production, staging or development)")]
    UnknownTarget(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`MARQUEE_HOST`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `marquee.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Create default config with paths relative to the given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            project: ProjectConfig::default(),
            server: ServerConfig::default(),
            paths: PathsConfigRaw::default(),
            compilers: CompilersConfigRaw::default(),
            targets: TargetsConfig::default(),
            deploy: DeployConfig::default(),
            app: Map::new(),
            paths_resolved: PathsConfig::default(),
            compilers_resolved: CompilersConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Settings for the given deployment target.
    #[must_use]
    pub fn target_settings(&self, target: DeploymentTarget) -> TargetSettings {
        let s3_buckets = match target {
            DeploymentTarget::Production => self.targets.production.s3_buckets.clone(),
            DeploymentTarget::Staging => self.targets.staging.s3_buckets.clone(),
            DeploymentTarget::Development => Vec::new(),
        };

        let s3_base_url = match (target.is_deployed(), s3_buckets.first()) {
            (true, Some(bucket)) => format!("http://{bucket}/{}", self.project.deployed_name()),
            _ => format!("http://127.0.0.1:{}", self.server.port),
        };

        TargetSettings {
            s3_buckets,
            s3_base_url,
            debug: target != DeploymentTarget::Production,
        }
    }

    /// Buckets for a deployed target.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for the development target or when
    /// no buckets are configured.
    pub fn require_buckets(&self, target: DeploymentTarget) -> Result<Vec<String>, ConfigError> {
        if !target.is_deployed() {
            return Err(ConfigError::Validation(
                "the development target cannot be deployed".to_owned(),
            ));
        }
        let buckets = self.target_settings(target).s3_buckets;
        if buckets.is_empty() {
            return Err(ConfigError::Validation(format!(
                "targets.{target}.s3_buckets is empty"
            )));
        }
        Ok(buckets)
    }

    /// Flatten project, target and `[app]` values into one JSON object.
    ///
    /// This is what the client sees as `window.APP_CONFIG`. Keys from
    /// `[app]` are inserted last and win over computed ones.
    #[must_use]
    pub fn client_config(&self, target: DeploymentTarget) -> Map<String, Value> {
        let settings = self.target_settings(target);

        let mut map = Map::new();
        map.insert("PROJECT_NAME".to_owned(), self.project.name.clone().into());
        map.insert(
            "DEPLOYED_NAME".to_owned(),
            self.project.deployed_name().into(),
        );
        map.insert("DEPLOYMENT_TARGET".to_owned(), target.as_str().into());
        map.insert("S3_BUCKETS".to_owned(), settings.s3_buckets.into());
        map.insert("S3_BASE_URL".to_owned(), settings.s3_base_url.into());
        map.insert("DEBUG".to_owned(), settings.debug.into());

        for (key, value) in &self.app {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(data_dir) = &settings.data_dir {
            self.paths_resolved.data_dir.clone_from(data_dir);
        }
    }

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

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

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
        require_non_empty(&self.project.name, "project.name")?;
        require_non_empty(self.project.deployed_name(), "project.deployed_name")?;
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        for (name, target) in [
            ("production", &self.targets.production),
            ("staging", &self.targets.staging),
        ] {
            if target.s3_buckets.iter().any(String::is_empty) {
                return Err(ConfigError::Validation(format!(
                    "targets.{name}.s3_buckets cannot contain empty names"
                )));
            }
        }

        if let Some(endpoint) = &self.deploy.endpoint {
            require_http_url(endpoint, "deploy.endpoint")?;
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(endpoint) = &self.deploy.endpoint {
            let expanded = expand::expand_env(endpoint, "deploy.endpoint")?;
            // An empty expansion (`${S3_ENDPOINT:-}`) means "no custom endpoint".
            self.deploy.endpoint = (!expanded.is_empty()).then_some(expanded);
        }

        for (key, value) in &mut self.app {
            expand::expand_json(value, &format!("app.{key}"))?;
        }

        Ok(())
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.paths_resolved = PathsConfig {
            data_dir: resolve(self.paths.data_dir.as_deref(), "data"),
            www_dir: resolve(self.paths.www_dir.as_deref(), "www"),
            templates_dir: resolve(self.paths.templates_dir.as_deref(), "templates"),
            less_dir: resolve(self.paths.less_dir.as_deref(), "less"),
            jst_dir: resolve(self.paths.jst_dir.as_deref(), "jst"),
            gzip_dir: resolve(self.paths.gzip_dir.as_deref(), "gzip"),
        };

        self.compilers_resolved = CompilersConfig {
            lessc: resolve(
                self.compilers.lessc.as_deref(),
                "node_modules/less/bin/lessc",
            ),
            jst: resolve(
                self.compilers.jst.as_deref(),
                "node_modules/universal-jst/bin/jst.js",
            ),
        };
    }
}
