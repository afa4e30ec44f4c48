//! TOML configuration.
//!
//! ```toml
//! database_path = "/var/lib/formanswers/formanswers.sqlite3"
//!
//! [export]
//! use_submit_uid = true
//! default_charset = "windows-1252"
//! csv_delimiter = ";"
//! sheet_name = "Answers"
//! ```
//!
//! Every key is optional.

use formanswers_logging::formanswers_home;
use formanswers_protocol::defaults::{DEFAULT_CHARSET, DEFAULT_CSV_DELIMITER, DEFAULT_SHEET_NAME};
use formanswers_sinks::{Charset, ExportSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DATABASE_FILE_NAME: &str = "formanswers.sqlite3";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormAnswersConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Put the per-form running number into tabular exports.
    #[serde(default)]
    pub use_submit_uid: bool,

    #[serde(default = "default_charset")]
    pub default_charset: String,

    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,

    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

fn default_database_path() -> PathBuf {
    formanswers_home()
        .map(|home| home.join(DATABASE_FILE_NAME))
        .unwrap_or_else(|_| PathBuf::from(DATABASE_FILE_NAME))
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

fn default_csv_delimiter() -> char {
    DEFAULT_CSV_DELIMITER
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

impl Default for FormAnswersConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            use_submit_uid: false,
            default_charset: default_charset(),
            csv_delimiter: default_csv_delimiter(),
            sheet_name: default_sheet_name(),
        }
    }
}

impl FormAnswersConfig {
    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: FormAnswersConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicitly named file, or `<home>/config.toml` if it exists.
    ///
    /// Only the default location may be absent; a missing explicit file is an
    /// error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match formanswers_home() {
            Ok(home) => {
                let path = home.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let delimiter = self.export.csv_delimiter;
        if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
            return Err(ConfigError::Invalid(format!(
                "export.csv_delimiter must be a single ASCII character other than quote or newline, got {:?}",
                delimiter
            )));
        }
        if Charset::from_label(&self.export.default_charset).is_none() {
            return Err(ConfigError::Invalid(format!(
                "export.default_charset '{}' is not supported (utf-8, iso-8859-1, windows-1252, us-ascii)",
                self.export.default_charset
            )));
        }
        Ok(())
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            use_submit_uid: self.export.use_submit_uid,
            default_charset: self.export.default_charset.clone(),
            csv_delimiter: self.export.csv_delimiter,
            sheet_name: self.export.sheet_name.clone(),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = FormAnswersConfig::default();
        assert!(config.database_path.ends_with(DATABASE_FILE_NAME));
        assert!(!config.export.use_submit_uid);
        assert_eq!(config.export.default_charset, "iso-8859-1");
        assert_eq!(config.export.csv_delimiter, ',');
        assert_eq!(config.export_settings(), ExportSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: FormAnswersConfig = toml::from_str(
            r#"
            [export]
            use_submit_uid = true
            csv_delimiter = ";"
            "#,
        )
        .unwrap();
        assert!(config.export.use_submit_uid);
        assert_eq!(config.export.csv_delimiter, ';');
        assert_eq!(config.export.sheet_name, "Export");
        assert!(config.database_path.ends_with(DATABASE_FILE_NAME));
    }

    #[test]
    fn test_load_rejects_unknown_charset() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[export]\ndefault_charset = \"shift_jis\"\n").unwrap();

        let err = FormAnswersConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "database_path = [").unwrap();

        assert!(matches!(
            FormAnswersConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = FormAnswersConfig::discover(Some(&tmp.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = FormAnswersConfig::default();
        config.database_path = PathBuf::from("/tmp/answers.sqlite3");
        config.export.sheet_name = "Answers".to_string();

        let parsed: FormAnswersConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
