//! Configuration file support for ktf

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub diagnostics: Diagnostics,

    #[serde(default)]
    pub behavior: Behavior,
}

/// Default values for common operations
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Defaults {
    /// Optional path to a kubeconfig file.
    /// If not set, in-cluster credentials are tried first, then the default
    /// kubeconfig loading rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_path: Option<String>,
}

/// Diagnostics collection settings
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Diagnostics {
    /// Optional base directory for diagnostics dumps.
    /// If not set, dumps go to the system temp directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
}

/// Behavior settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Behavior {
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            show_progress: default_true(),
        }
    }
}

impl Settings {
    /// Load settings from file or return defaults
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_file() {
            Self::load_from_file(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Find config file in standard locations
    /// Priority:
    /// 1. .ktf.toml in current directory
    /// 2. ~/.config/ktf/config.toml (XDG config directory)
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory
        let local_config = PathBuf::from(".ktf.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("ktf").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }

    /// Save settings to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example config file content
    pub fn example_config() -> String {
        r#"# ktf configuration file
# Place this file at ~/.config/ktf/config.toml or .ktf.toml in your project

[defaults]
# kubeconfig_path = "/path/to/kubeconfig"  # Optional: explicit kubeconfig. Defaults to in-cluster, then standard loading rules.

[diagnostics]
# out_dir = "/tmp/ktf-dumps"  # Optional: base directory for diagnostics dumps. Defaults to the system temp directory.

[behavior]
show_progress = true
"#
        .to_string()
    }
}
