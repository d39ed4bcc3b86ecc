//! Configuration handling for swtab CLI
//!
//! Supports loading configuration from swtab.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CliError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Field delimiter of the output table (a single ASCII character)
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Write a header row
    #[serde(default = "default_true")]
    pub header: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Maximum number of alignments to read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Minimum sw_zscore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zscore: Option<f64>,

    /// Keep only the first alignment of each query
    #[serde(default)]
    pub top_alignment: bool,
}

fn default_delimiter() -> String { ",".to_string() }
fn default_true() -> bool { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            header: true,
        }
    }
}

impl OutputConfig {
    /// The delimiter as the single byte the table writer expects.
    pub fn delimiter_byte(&self) -> Result<u8, CliError> {
        parse_delimiter(&self.delimiter)
    }
}

/// Accept one ASCII character, or the escapes `\t` and `tab`.
pub fn parse_delimiter(value: &str) -> Result<u8, CliError> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ if value.len() == 1 && value.is_ascii() => Ok(value.as_bytes()[0]),
        _ => Err(CliError::config(format!(
            "delimiter must be a single ASCII character, got {:?}",
            value
        ))),
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::debug!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find swtab.toml in current directory
                let default_path = PathBuf::from("swtab.toml");
                if default_path.exists() {
                    log::debug!("Loading configuration from: swtab.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(CliError::from)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        config.output.delimiter_byte()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default configuration")
    }
}
