//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: CRUD_, nested keys separated by `__`)
//! 2. Current working directory: ./crud.toml
//! 3. XDG config directory: ~/.config/crud-actions/{service_name}/crud.toml
//! 4. System directory: /etc/crud-actions/{service_name}/crud.toml
//! 5. Default values
//!
//! Per-action settings live in `[actions.<handleAction>]` tables and are
//! layered onto the matching action by
//! [`CrudDispatcher::apply_config`](crate::dispatcher::CrudDispatcher::apply_config):
//!
//! ```toml
//! [service]
//! name = "blog"
//! log_level = "debug"
//!
//! [actions.view]
//! validateId = "uuid"
//!
//! [actions.delete.messages.success]
//! text = "Removed {name}"
//! ```
//!
//! Environment keys are lower-cased up to the action name; setting names
//! below it keep their case, so `CRUD_SERVICE__LOG_LEVEL=debug` sets
//! `service.log_level` and `CRUD_ACTIONS__VIEW__validateId=uuid` sets
//! `actions.view.validateId`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::{Uncased, UncasedStr},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// File name looked up in every config directory
pub const CONFIG_FILE: &str = "crud.toml";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "CRUD_";

const APP_DIR: &str = "crud-actions";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrudConfig {
    /// Service configuration
    pub service: ServiceConfig,

    /// Settings per action, keyed by the action's `handleAction`
    #[serde(default)]
    pub actions: BTreeMap<String, Map<String, Value>>,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .split("__")
        .map(env_key)
        .lowercase(false)
}

/// Lower-case the section and action name of an env key, keeping the case of
/// camelCase action settings
fn env_key(key: &UncasedStr) -> Uncased<'_> {
    let segments: Vec<&str> = key.as_str().split('.').collect();
    let folded = match segments.first() {
        Some(section) if section.eq_ignore_ascii_case("actions") => 2,
        _ => segments.len(),
    };

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if i < folded {
                segment.to_ascii_lowercase()
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
        .into()
}

impl CrudConfig {
    /// Load configuration from all sources
    ///
    /// The service name is inferred from the binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| APP_DIR.to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Self::named(service_name)));

        // Lowest priority first so later files override earlier ones
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(env_provider());

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Skips the directory search. Environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(env_provider())
            .extract()?;

        Ok(config)
    }

    /// Config paths for a service, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_DIR);
        let config_file_path = Path::new(service_name).join(CONFIG_FILE);
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(APP_DIR)
                .join(service_name)
                .join(CONFIG_FILE),
        );

        paths
    }

    /// Where the config file should be placed for a service
    ///
    /// Returns: ~/.config/crud-actions/{service_name}/crud.toml
    pub fn recommended_path(service_name: &str) -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_DIR);
        let config_file_path = Path::new(service_name).join(CONFIG_FILE);

        xdg_dirs
            .place_config_file(&config_file_path)
            .map_err(|e| Error::Internal(format!("Failed to create config directory: {}", e)))
    }

    /// Settings table for an action, if configured
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&Map<String, Value>> {
        self.actions.get(name)
    }

    fn named(service_name: &str) -> Self {
        Self {
            service: ServiceConfig {
                name: service_name.to_string(),
                log_level: default_log_level(),
            },
            actions: BTreeMap::new(),
        }
    }
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self::named(APP_DIR)
    }
}
