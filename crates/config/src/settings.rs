// Report settings
// Loaded from ~/.config/labsheet/settings.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the monthly report files
    pub output_dir: PathBuf,

    /// Report template (.xlsx); its first sheet is cloned for every test date
    pub template_path: PathBuf,

    /// Parse the template once per process instead of once per submission
    pub cache_template: bool,

    /// Report files are named `{file_prefix}_{YYYY-MM}.xlsx`
    pub file_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            template_path: PathBuf::from("templates/laporan_template.xlsx"),
            cache_template: true,
            file_prefix: "laporan".to_string(),
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# Directory holding the monthly report files
output_dir = "output"

# Report template; its first sheet is cloned for every test date
template_path = "templates/laporan_template.xlsx"

# Parse the template once per process
cache_template = true

# Report files are named <file_prefix>_<YYYY-MM>.xlsx
file_prefix = "laporan"
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("labsheet");
        config_dir.join("settings.toml")
    }

    /// Load settings from `path`. A missing file yields the defaults; a file
    /// that exists but does not parse is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the commented default file unless one already exists.
    pub fn create_default_file(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        let write_error = |e: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, DEFAULT_CONFIG).map_err(write_error)?;
        Ok(true)
    }

    /// Template path resolved against `base` when relative.
    pub fn resolved_template_path(&self, base: &Path) -> PathBuf {
        if self.template_path.is_absolute() {
            self.template_path.clone()
        } else {
            base.join(&self.template_path)
        }
    }
}
