//! Engine settings loaded from TOML.
//!
//! Defaults are embedded via `include_str!("default_settings.toml")`; a
//! user-provided TOML file replaces them wholesale. Settings are parsed and
//! validated up front so later table loads fail only for resource reasons.

use serde::Deserialize;

use crate::dict::DirSource;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub data: DataSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    pub dir: String,
    pub simplified_file: String,
    pub traditional_file: String,
}

impl Settings {
    /// Read and parse a settings file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        parse_settings_toml(&content)
    }

    /// A `DirSource` over the configured data directory and file names.
    pub fn source(&self) -> DirSource {
        DirSource::with_files(
            &self.data.dir,
            &self.data.simplified_file,
            &self.data.traditional_file,
        )
    }
}

impl Default for Settings {
    fn default() -> Self {
        parse_settings_toml(DEFAULT_SETTINGS_TOML).expect("embedded settings TOML must be valid")
    }
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    let non_empty = [
        ("data.dir", &s.data.dir),
        ("data.simplified_file", &s.data.simplified_file),
        ("data.traditional_file", &s.data.traditional_file),
    ];
    for (field, value) in non_empty {
        if value.is_empty() {
            return Err(SettingsError::InvalidValue {
                field: field.to_string(),
                reason: "must not be empty".to_string(),
            });
        }
    }
    Ok(())
}
