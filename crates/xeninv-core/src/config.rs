//! Inventory source configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compose::ComposeConfig;
use crate::error::CoreError;

/// Environment variable overriding `api_host`
pub const ENV_HOST: &str = "XENINV_HOST";
/// Environment variable overriding `user`
pub const ENV_USER: &str = "XENINV_USER";
/// Environment variable overriding `password`
pub const ENV_PASSWORD: &str = "XENINV_PASSWORD";
/// Environment variable pointing at the configuration file
pub const ENV_CONFIG: &str = "XENINV_CONFIG";

/// Recognized configuration options for one inventory source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// XenServer / Xen Orchestra API host
    #[serde(default)]
    pub api_host: String,
    /// API user
    #[serde(default)]
    pub user: String,
    /// API password
    #[serde(default)]
    pub password: String,
    /// Connect over HTTPS
    #[serde(default = "default_true")]
    pub use_ssl: bool,
    /// Verify the TLS certificate when using HTTPS
    #[serde(default = "default_true")]
    pub validate_certs: bool,
    /// Key VM entries by UUID instead of name label
    #[serde(default = "default_true")]
    pub use_vm_uuid: bool,
    /// Key host entries by UUID instead of name label
    #[serde(default = "default_true")]
    pub use_host_uuid: bool,
    /// User-defined composition rules (groups, keyed_groups, compose, strict)
    #[serde(flatten)]
    pub composition: ComposeConfig,
    /// Enable the on-disk snapshot cache
    #[serde(default)]
    pub cache: bool,
    /// Snapshot cache time-to-live in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Snapshot cache directory; defaults to the platform cache dir
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    3600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: String::new(),
            user: String::new(),
            password: String::new(),
            use_ssl: true,
            validate_certs: true,
            use_vm_uuid: true,
            use_host_uuid: true,
            composition: ComposeConfig::default(),
            cache: false,
            cache_ttl_secs: default_cache_ttl(),
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, apply environment overrides and
    /// validate required options.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the file cannot be read or parsed, or
    /// if a required option is missing.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("cannot parse {}: {e}", path.display())))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from the path in `XENINV_CONFIG` or from well-known locations.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if no configuration file is found or the
    /// found file is invalid.
    pub fn load_default() -> Result<Self, CoreError> {
        if let Ok(path) = std::env::var(ENV_CONFIG) {
            return Self::load(&PathBuf::from(path));
        }

        let paths = [
            PathBuf::from("xeninv.toml"),
            PathBuf::from("/etc/xeninv/xeninv.toml"),
            dirs::config_dir()
                .map(|p| p.join("xeninv/xeninv.toml"))
                .unwrap_or_default(),
        ];

        for path in paths {
            if path.exists() {
                return Self::load(&path);
            }
        }

        Err(CoreError::Config(
            "no configuration file found (set XENINV_CONFIG or create xeninv.toml)".to_string(),
        ))
    }

    /// Let environment variables override file-provided credentials
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var(ENV_HOST) {
            self.api_host = host;
        }
        if let Ok(user) = std::env::var(ENV_USER) {
            self.user = user;
        }
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            self.password = password;
        }
    }

    /// Check that required options are present
    ///
    /// # Errors
    /// Returns `CoreError::Config` naming the first missing option.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (option, value) in [
            ("api_host", &self.api_host),
            ("user", &self.user),
            ("password", &self.password),
        ] {
            if value.is_empty() {
                return Err(CoreError::Config(format!(
                    "required option '{option}' is not set"
                )));
            }
        }
        Ok(())
    }

    /// Directory used by the snapshot cache
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("xeninv")
        })
    }
}
