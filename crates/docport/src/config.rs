use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tool configuration loaded from `docport.toml`.
///
/// Loaded once per invocation and passed explicitly into each operation;
/// nothing here is mutated after load.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// External stylesheet referenced by the page shell.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    #[serde(default)]
    pub drive: DriveSection,
}

/// Google Drive API settings.
#[derive(Debug, Deserialize)]
pub struct DriveSection {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Path to the saved access token; `~` expands to the home directory.
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

impl Default for DriveSection {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_file: default_token_file(),
        }
    }
}

impl Config {
    /// Loads configuration from the given file.
    ///
    /// Falls back to defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))
        } else {
            toml::from_str("").context("failed to construct default config")
        }
    }
}

fn default_stylesheet() -> String {
    String::from("https://cdn.jsdelivr.net/npm/water.css@2/out/water.css")
}

fn default_api_base() -> String {
    String::from("https://www.googleapis.com")
}

fn default_token_file() -> String {
    String::from("~/.docport/token.txt")
}
