//! Template providers.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use labsheet_engine::error::{ReportError, Result};
use labsheet_engine::template::TemplateSheet;

use crate::xlsx;

/// Supplies the template every report sheet is cloned from.
pub trait TemplateSource: Send + Sync {
    fn load(&self) -> Result<TemplateSheet>;
}

/// An already parsed template serves itself.
impl TemplateSource for TemplateSheet {
    fn load(&self) -> Result<TemplateSheet> {
        Ok(self.clone())
    }
}

/// Template read from an `.xlsx` file on every load.
#[derive(Debug, Clone)]
pub struct XlsxTemplateFile {
    path: PathBuf,
}

impl XlsxTemplateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateSource for XlsxTemplateFile {
    fn load(&self) -> Result<TemplateSheet> {
        let bytes = fs::read(&self.path).map_err(|e| {
            ReportError::resource(&format!("Failed to read template {}", self.path.display()), e)
        })?;
        xlsx::read_template(&bytes).map_err(|e| match e {
            ReportError::Resource(msg) => {
                ReportError::Resource(format!("Template {}: {msg}", self.path.display()))
            }
            other => other,
        })
    }
}

/// Parses once, then hands out cheap clones sharing the parsed sheet.
///
/// A failed load is not cached; the next call tries again.
pub struct CachedTemplate<S> {
    inner: S,
    cell: OnceCell<TemplateSheet>,
}

impl<S: TemplateSource> CachedTemplate<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cell: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<S: TemplateSource> TemplateSource for CachedTemplate<S> {
    fn load(&self) -> Result<TemplateSheet> {
        if let Some(template) = self.cell.get() {
            log::debug!("Template cache hit");
            return Ok(template.clone());
        }
        self.cell.get_or_try_init(|| self.inner.load()).cloned()
    }
}
