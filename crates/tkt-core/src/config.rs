//! Configuration for tkt
//!
//! Stored in <config dir>/tkt/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "tkt";
const CONFIG_FILE: &str = "config.toml";
const DATA_FILE: &str = "tickets.json";

/// tkt configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot file; defaults to <data dir>/tkt/tickets.json
    pub data_file: Option<PathBuf>,

    /// Insert demo tickets when the store is created
    pub seed_demo_data: bool,

    /// Technicians tickets can be assigned to
    pub technicians: Vec<String>,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            seed_demo_data: true,
            technicians: ["Quang", "Nhựt", "Nhật", "Hiếu", "An"]
                .into_iter()
                .map(String::from)
                .collect(),
            display: DisplayConfig::default(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use colors in output
    pub colors: bool,

    /// Date format for display (strftime)
    pub date_format: String,

    /// Appended to formatted fees
    pub currency_suffix: String,

    /// Digit group separator for fees
    pub thousands_separator: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            date_format: "%d/%m/%Y %H:%M".to_string(),
            currency_suffix: "đ".to_string(),
            thousands_separator: ".".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Snapshot file to use: the configured one or the platform default
    pub fn data_path(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join(DATA_FILE)
        })
    }

    /// Whether `name` is a configured technician
    ///
    /// An empty list accepts any name.
    pub fn is_technician(&self, name: &str) -> bool {
        self.technicians.is_empty() || self.technicians.iter().any(|t| t == name)
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# tkt configuration

# Snapshot file (defaults to <data dir>/tkt/tickets.json)
# data_file = "/var/lib/tkt/tickets.json"

# Insert five demo tickets the first time the store is created
seed_demo_data = true

# Technicians tickets can be assigned to (empty list = any name)
technicians = ["Quang", "Nhựt", "Nhật", "Hiếu", "An"]

[display]
# Use colors in output
colors = true

# Date format for display (strftime format)
date_format = "%d/%m/%Y %H:%M"

# Appended to formatted fees
currency_suffix = "đ"

# Digit group separator for fees
thousands_separator = "."
"#
        .to_string()
    }
}
