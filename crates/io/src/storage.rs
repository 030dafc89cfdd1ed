//! Durable storage for report files.
//!
//! Storage is keyed by bare file name under one root. Writes are atomic with
//! respect to the final name: bytes go to a hidden temp file in the same
//! directory, then a rename publishes them.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use labsheet_engine::error::{ReportError, Result};

/// Whole-file store keyed by file name.
pub trait ReportStorage: Send + Sync {
    fn exists(&self, name: &str) -> bool;

    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Replace the file in one step; readers see either the old or the new
    /// contents, never a partial write.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()>;

    fn delete(&self, name: &str) -> Result<()>;

    /// Report file names, sorted.
    fn list(&self) -> Result<Vec<String>>;

    /// Location of `name` for display and lock keys.
    fn path_of(&self, name: &str) -> PathBuf;
}

/// True when `name` is a plain file name that stays inside the root.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && !name.starts_with('.')
}

/// Filesystem storage rooted at the output directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn checked_path(&self, name: &str) -> Result<PathBuf> {
        if !is_safe_file_name(name) {
            return Err(ReportError::Validation(format!("invalid report file name '{name}'")));
        }
        Ok(self.root.join(name))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.root.join(format!(".{name}.tmp"))
    }
}

impl ReportStorage for FsStorage {
    fn exists(&self, name: &str) -> bool {
        self.checked_path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.checked_path(name)?;
        fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReportError::NotFound(name.to_string())
            } else {
                ReportError::resource(&format!("Failed to read {}", path.display()), e)
            }
        })
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.checked_path(name)?;
        fs::create_dir_all(&self.root).map_err(|e| {
            ReportError::resource(&format!("Failed to create {}", self.root.display()), e)
        })?;

        let temp = self.temp_path(name);
        if temp.exists() {
            log::info!("Removing stale temp file {}", temp.display());
            fs::remove_file(&temp).map_err(|e| {
                ReportError::resource(&format!("Failed to remove {}", temp.display()), e)
            })?;
        }

        let written = fs::File::create(&temp)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(ReportError::resource(&format!("Failed to write {}", path.display()), e));
        }

        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.checked_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ReportError::resource(&format!("Failed to delete {}", path.display()), e)),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ReportError::resource(&format!("Failed to list {}", self.root.display()), e))
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.') && name.to_ascii_lowercase().ends_with(".xlsx"))
            .collect();
        names.sort();
        Ok(names)
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
