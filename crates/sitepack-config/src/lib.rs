//! Configuration management for sitepack.
//!
//! Parses `sitepack.toml` configuration files with serde and provides
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
//! - `server.host`
//! - `export.asset_base_url`
//! - `export.root_folder`
//! - `store.builds_dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Override the directory holding build records.
    pub builds_dir: Option<PathBuf>,
    pub asset_base_url: Option<String>,
    pub root_folder: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sitepack.toml";

/// Highest DEFLATE level accepted by `export.compression_level`.
const MAX_COMPRESSION_LEVEL: i64 = 9;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site generation settings.
    pub export: ExportConfig,
    /// Server configuration.
    pub server: ServerConfig,
    /// Build store configuration (paths are relative strings from TOML).
    store: StoreConfigRaw,
    /// Component registry extension (paths are relative strings from TOML).
    components: ComponentsConfigRaw,

    /// Resolved store configuration (set after loading).
    #[serde(skip)]
    pub store_resolved: StoreConfig,
    /// Resolved components configuration (set after loading).
    #[serde(skip)]
    pub components_resolved: ComponentsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site generation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// URL prefix for asset files. Must end with `/`.
    pub asset_base_url: String,
    /// Folder every archive entry is nested under.
    pub root_folder: Option<String>,
    /// DEFLATE level, 0 to 9.
    pub compression_level: i64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            asset_base_url: "/assets/".to_owned(),
            root_folder: None,
            compression_level: 6,
        }
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7980,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StoreConfigRaw {
    builds_dir: Option<String>,
}

/// Resolved build store configuration with absolute paths.
#[derive(Debug, Default)]
pub struct StoreConfig {
    /// Directory holding build record JSON files.
    pub builds_dir: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ComponentsConfigRaw {
    registry: Option<String>,
}

/// Resolved component registry configuration.
#[derive(Debug, Default)]
pub struct ComponentsConfig {
    /// JSON document extending the built-in component libraries.
    pub registry: Option<PathBuf>,
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
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`SITEPACK_HOST`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sitepack.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, so CLI
    /// arguments take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
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
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(builds_dir) = &settings.builds_dir {
            self.store_resolved.builds_dir.clone_from(builds_dir);
        }
        if let Some(url) = &settings.asset_base_url {
            self.export.asset_base_url.clone_from(url);
        }
        if let Some(folder) = &settings.root_folder {
            self.export.root_folder = Some(folder.clone());
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

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            export: ExportConfig::default(),
            server: ServerConfig::default(),
            store: StoreConfigRaw::default(),
            components: ComponentsConfigRaw::default(),
            store_resolved: StoreConfig {
                builds_dir: base.join("builds"),
            },
            components_resolved: ComponentsConfig::default(),
            config_path: None,
        }
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
    /// Called automatically after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_export()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_export(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.export.asset_base_url, "export.asset_base_url")?;
        if !self.export.asset_base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "export.asset_base_url must end with /".to_owned(),
            ));
        }
        if !(0..=MAX_COMPRESSION_LEVEL).contains(&self.export.compression_level) {
            return Err(ConfigError::Validation(format!(
                "export.compression_level must be between 0 and {MAX_COMPRESSION_LEVEL}"
            )));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.export.asset_base_url =
            expand::expand_env(&self.export.asset_base_url, "export.asset_base_url")?;
        if let Some(ref folder) = self.export.root_folder {
            self.export.root_folder = Some(expand::expand_env(folder, "export.root_folder")?);
        }
        if let Some(ref dir) = self.store.builds_dir {
            self.store.builds_dir = Some(expand::expand_env(dir, "store.builds_dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.store_resolved = StoreConfig {
            builds_dir: config_dir.join(self.store.builds_dir.as_deref().unwrap_or("builds")),
        };
        self.components_resolved = ComponentsConfig {
            registry: self
                .components
                .registry
                .as_deref()
                .map(|registry| config_dir.join(registry)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/site"));

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7980);
        assert_eq!(config.export.asset_base_url, "/assets/");
        assert_eq!(config.export.compression_level, 6);
        assert!(config.export.root_folder.is_none());
        assert_eq!(config.store_resolved.builds_dir, PathBuf::from("/site/builds"));
        assert!(config.components_resolved.registry.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.server.port, 7980);
        assert_eq!(config.export.asset_base_url, "/assets/");
    }

    #[test]
    fn test_parse_export_config() {
        let toml = r#"
[export]
asset_base_url = "https://cdn.acme.test/"
root_folder = "site"
compression_level = 9
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.export.asset_base_url, "https://cdn.acme.test/");
        assert_eq!(config.export.root_folder.as_deref(), Some("site"));
        assert_eq!(config.export.compression_level, 9);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[store]
builds_dir = "data/builds"

[components]
registry = "components.json"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.store_resolved.builds_dir,
            PathBuf::from("/project/data/builds")
        );
        assert_eq!(
            config.components_resolved.registry,
            Some(PathBuf::from("/project/components.json"))
        );
    }

    #[test]
    fn test_load_from_explicit_path() {
        let (dir, path) = write_config(
            r#"
[server]
port = 9000

[store]
builds_dir = "published"
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.store_resolved.builds_dir, dir.path().join("published"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/sitepack.toml")), None);

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let (_dir, path) = write_config("[server\nport = ");

        let result = Config::load(Some(&path), None);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_cli_settings_override_file() {
        let (_dir, path) = write_config(
            r#"
[server]
host = "0.0.0.0"
port = 9000
"#,
        );
        let settings = CliSettings {
            port: Some(8080),
            builds_dir: Some(PathBuf::from("/srv/builds")),
            asset_base_url: Some("/static/".to_owned()),
            root_folder: Some("acme".to_owned()),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store_resolved.builds_dir, PathBuf::from("/srv/builds"));
        assert_eq!(config.export.asset_base_url, "/static/");
        assert_eq!(config.export.root_folder.as_deref(), Some("acme"));
    }

    #[test]
    fn test_cli_settings_are_validated() {
        let (_dir, path) = write_config("");
        let settings = CliSettings {
            asset_base_url: Some("/static".to_owned()),
            ..Default::default()
        };

        let result = Config::load(Some(&path), Some(&settings));

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("SITEPACK_TEST_HOST", "0.0.0.0");
            std::env::remove_var("SITEPACK_TEST_BUILDS");
        }
        let toml = r#"
[server]
host = "${SITEPACK_TEST_HOST}"

[store]
builds_dir = "${SITEPACK_TEST_BUILDS:-var/builds}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.builds_dir.as_deref(), Some("var/builds"));
        unsafe {
            std::env::remove_var("SITEPACK_TEST_HOST");
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default();
        config.server.port = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default();
        config.server.host = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_validate_asset_base_url_trailing_slash() {
        let mut config = Config::default();
        config.export.asset_base_url = "https://cdn.acme.test".to_owned();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("export.asset_base_url"));
    }

    #[test]
    fn test_validate_compression_level_range() {
        let mut config = Config::default();
        config.export.compression_level = 10;
        assert!(config.validate().is_err());

        config.export.compression_level = -1;
        assert!(config.validate().is_err());

        config.export.compression_level = 0;
        assert!(config.validate().is_ok());
    }
}
