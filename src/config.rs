//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//! Both binaries read the same file so the routing key and store
//! credentials live in one place.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Proxy server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream routing API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_routing_url")]
    pub base_url: String,

    #[serde(default = "default_profile")]
    pub profile: String,

    pub api_key: Option<String>,

    /// Unset means the upstream call may block indefinitely
    pub request_timeout_secs: Option<u64>,
}

fn default_routing_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_profile() -> String {
    "foot-walking".to_string()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_routing_url(),
            profile: default_profile(),
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

/// Which document store the seeder writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Firestore,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "firestore" => Ok(StoreBackend::Firestore),
            other => Err(ConfigError::Invalid(format!(
                "unknown store backend '{}' (expected sqlite or firestore)",
                other
            ))),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,

    #[serde(default)]
    pub firestore: FirestoreConfig,
}

fn default_collection() -> String {
    "routes".to_string()
}

fn default_sqlite_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("trailhead").join("documents.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./trailhead_documents.db".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            collection: default_collection(),
            sqlite_path: default_sqlite_path(),
            firestore: FirestoreConfig::default(),
        }
    }
}

/// Firestore REST credentials
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreConfig {
    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_firestore_url")]
    pub base_url: String,

    /// Web API key, sent as the `key` query parameter
    pub api_key: Option<String>,

    /// OAuth access token, sent as a bearer token; preferred over `api_key`
    pub access_token: Option<String>,
}

fn default_firestore_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            base_url: default_firestore_url(),
            api_key: None,
            access_token: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load an explicit file if given, otherwise search the default locations
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Self::load_default(),
        }
    }

    /// Load from default locations or environment
    ///
    /// The first file that exists wins. A file that exists but fails to
    /// load is an error rather than a silent fall back to defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("trailhead").join("config.toml")),
            Some(PathBuf::from("/etc/trailhead/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        Self::load_first(config_paths.iter().flatten())
    }

    fn load_first<'a, I>(paths: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        for path in paths {
            if path.exists() {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                return Ok(config);
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub(crate) fn apply_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(host) = var("TRAILHEAD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("TRAILHEAD_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("TRAILHEAD_PORT is not a port: {}", port)))?;
        }

        // Routing overrides
        if let Some(key) = var("ORS_API_KEY") {
            self.routing.api_key = Some(key);
        }
        if let Some(url) = var("TRAILHEAD_ROUTING_URL") {
            self.routing.base_url = url;
        }

        // Store overrides
        if let Some(backend) = var("TRAILHEAD_STORE_BACKEND") {
            self.store.backend = backend.parse()?;
        }
        if let Some(path) = var("TRAILHEAD_SQLITE_PATH") {
            self.store.sqlite_path = path;
        }
        if let Some(project) = var("FIRESTORE_PROJECT_ID") {
            self.store.firestore.project_id = project;
        }
        if let Some(key) = var("FIRESTORE_API_KEY") {
            self.store.firestore.api_key = Some(key);
        }
        if let Some(token) = var("FIRESTORE_ACCESS_TOKEN") {
            self.store.firestore.access_token = Some(token);
        }

        // Logging overrides
        if let Some(level) = var("TRAILHEAD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TRAILHEAD_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Trailhead Configuration
#
# Environment variables override these settings:
# - ORS_API_KEY
# - TRAILHEAD_HOST
# - TRAILHEAD_PORT
# - TRAILHEAD_ROUTING_URL
# - TRAILHEAD_STORE_BACKEND
# - TRAILHEAD_SQLITE_PATH
# - FIRESTORE_PROJECT_ID
# - FIRESTORE_API_KEY
# - FIRESTORE_ACCESS_TOKEN
# - TRAILHEAD_LOG_LEVEL
# - TRAILHEAD_LOG_FORMAT

[server]
# Proxy server host
host = "127.0.0.1"

# Proxy server port
port = 5000

[routing]
# OpenRouteService base URL
base_url = "https://api.openrouteservice.org"

# Directions profile
profile = "foot-walking"

# API key (prefer the ORS_API_KEY environment variable)
# api_key = ""

# Upstream request timeout in seconds (unset = wait indefinitely)
# request_timeout_secs = 30

[store]
# Document store backend: sqlite or firestore
backend = "sqlite"

# Collection the seeder writes to
collection = "routes"

# SQLite database file (sqlite backend)
sqlite_path = "./trailhead_documents.db"

[store.firestore]
# Firebase project id
project_id = ""

# Web API key or OAuth access token
# api_key = ""
# access_token = ""

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.addr(), "127.0.0.1:5000");
        assert_eq!(config.routing.profile, "foot-walking");
        assert!(config.routing.api_key.is_none());
        assert!(config.routing.request_timeout_secs.is_none());
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.collection, "routes");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.routing.base_url, "https://api.openrouteservice.org");
        assert_eq!(config.store.sqlite_path, "./trailhead_documents.db");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse(
            r#"
            [routing]
            api_key = "secret"

            [store]
            backend = "firestore"
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.api_key.as_deref(), Some("secret"));
        assert_eq!(config.routing.profile, "foot-walking");
        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ORS_API_KEY", "env-key"),
            ("TRAILHEAD_PORT", "8080"),
            ("TRAILHEAD_STORE_BACKEND", "Firestore"),
            ("FIRESTORE_PROJECT_ID", "hiking-app"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.routing.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.store.firestore.project_id, "hiking-app");
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(|k| (k == "TRAILHEAD_PORT").then(|| "abc".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/trailhead.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_broken_file_is_not_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let broken = dir.path().join("config.toml");
        std::fs::write(
            &broken,
            "[store]\nbackend = \"firestor\"\n\n[routing]\napi_key = \"k\"\n",
        )
        .unwrap();

        let result = Config::load_first([&missing, &broken]);
        match result {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, broken),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_first_existing_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        std::fs::write(&first, "[server]\nport = 6001\n").unwrap();
        std::fs::write(&second, "[server\n").unwrap();

        let config = Config::load_first([&missing, &first, &second]).unwrap();
        assert_eq!(config.server.port, 6001);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 6000\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 6000);
    }
}
