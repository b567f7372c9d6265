//! Configuration management with layered loading
//!
//! Global order precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/annosort/annosort.toml`
//! 3. Environment variables: `ANNOSORT_*` prefix
//!
//! The project order lives in `<project_dir>/.annotation-sorting.json` and
//! shadows the global order as a whole when its list is non-empty.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::ApplicationError;
use crate::domain::{OrderConfig, UNMATCHED_LAST};

/// File name of the per-project order, relative to the project root.
pub const PROJECT_SETTINGS_FILENAME: &str = ".annotation-sorting.json";

/// Compiled default priority list.
pub const DEFAULT_ANNOTATION_ORDER: &[&str] = &[
    "Override",
    "Deprecated",
    "SuppressWarnings",
    "FunctionalInterface",
    "SafeVarargs",
    "org.springframework.stereotype.*",
    "org.springframework.web.bind.annotation.*",
    "org.springframework.beans.factory.annotation.*",
    "org.springframework.context.annotation.*",
    "org.springframework.*",
    "org.springframework.boot.autoconfigure.*",
    "org.springframework.boot.*",
    "javax.validation.*",
    "jakarta.validation.*",
    "javax.persistence.*",
    "jakarta.persistence.*",
    "com.fasterxml.jackson.*",
    "lombok.*",
    "lombok.extern.*",
    "org.junit.*",
    "org.springframework.test.*",
    "java.lang.*",
    "javax.*",
    "jakarta.*",
];

/// Global ordering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Patterns in priority order
    pub annotation_order: Vec<String>,
    /// Rank of unmatched markers; -1 places them after every pattern
    pub unmatched_position: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            annotation_order: DEFAULT_ANNOTATION_ORDER
                .iter()
                .map(|p| p.to_string())
                .collect(),
            unmatched_position: UNMATCHED_LAST,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub annotation_order: Option<Vec<String>>,
    pub unmatched_position: Option<i32>,
}

/// Get the XDG config directory for annosort.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "annosort").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("annosort.toml"))
}

/// Get the path to the project order file.
pub fn project_settings_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_SETTINGS_FILENAME)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Parse the JSON project order. Missing fields default to `[]` and `-1`.
pub fn parse_project_settings(content: &str) -> Result<OrderConfig, ApplicationError> {
    serde_json::from_str(content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", PROJECT_SETTINGS_FILENAME, e),
    })
}

/// Serialize an order as pretty JSON in the project file format.
pub fn project_settings_json(order: &OrderConfig) -> Result<String, ApplicationError> {
    serde_json::to_string_pretty(order).map_err(|e| ApplicationError::Config {
        message: format!("serialize {}: {}", PROJECT_SETTINGS_FILENAME, e),
    })
}

impl Settings {
    /// Apply global config onto defaults.
    ///
    /// The list uses REPLACE semantics: a configured list completely replaces
    /// the default one, since list order carries the meaning.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            annotation_order: global
                .annotation_order
                .clone()
                .unwrap_or_else(|| self.annotation_order.clone()),
            unmatched_position: global
                .unmatched_position
                .unwrap_or(self.unmatched_position),
        }
    }

    /// Load settings with layered precedence from the XDG location.
    pub fn load() -> Self {
        Self::load_with(global_config_path().as_deref())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `global_path` - Global config file; skipped when `None` or missing
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config file (keys present REPLACE defaults)
    /// 3. Environment variables: `ANNOSORT_*` prefix (REPLACES - explicit override)
    ///
    /// A layer that cannot be read is logged and skipped; loading never fails.
    pub fn load_with(global_path: Option<&Path>) -> Self {
        let mut current = Self::default();

        if let Some(path) = global_path.filter(|p| p.exists()) {
            match load_raw_settings(path) {
                Ok(raw) => current = current.apply_global(&raw),
                Err(e) => warn!("ignoring global config, using defaults: {}", e),
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply ANNOSORT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Self {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ANNOSORT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("annotation_order")
                    .try_parsing(true),
            )
            .build();
        let config = match config {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring ANNOSORT_* environment: {}", config_err(e));
                return settings;
            }
        };

        if let Ok(val) = config.get::<Vec<String>>("annotation_order") {
            settings.annotation_order = val;
        }
        match config.get::<i32>("unmatched_position") {
            Ok(val) => settings.unmatched_position = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => warn!("ignoring ANNOSORT_UNMATCHED_POSITION: {}", config_err(e)),
        }

        settings
    }

    /// The global order in domain form.
    pub fn order_config(&self) -> OrderConfig {
        OrderConfig::new(
            self.annotation_order.iter().collect(),
            self.unmatched_position,
        )
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        let patterns = DEFAULT_ANNOTATION_ORDER
            .iter()
            .map(|p| format!("#   \"{}\",", p))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"# annosort configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/annosort/annosort.toml  (defines your baseline)
#   Env:     ANNOSORT_* environment variables  (explicit overrides)
#   Project: <project_dir>/{project} (replaces the global order when non-empty)
#
# Patterns match, in this order of preference:
#   - the exact qualified name:  "javax.persistence.Entity"
#   - the exact simple name:     "Entity"
#   - a package wildcard:        "javax.persistence.*"

# Markers in priority order (earlier ranks higher)
# annotation_order = [
{patterns}
# ]

# Rank of markers matching no pattern; -1 places them last
# unmatched_position = -1
"#,
            project = PROJECT_SETTINGS_FILENAME,
            patterns = patterns,
        )
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
