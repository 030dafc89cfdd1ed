use thiserror::Error;

/// Coarse category of a [`ReportError`], used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Resource,
    NotFound,
}

#[derive(Debug, Error)]
pub enum ReportError {
    /// Malformed submission: mismatched field lists, bad date, missing action.
    #[error("invalid submission: {0}")]
    Validation(String),
    /// A sheet with this name already exists in the target workbook.
    #[error("sheet '{sheet}' already exists")]
    DuplicateSheet { sheet: String },
    /// An append targeted a month that has no workbook yet.
    #[error("report file '{file}' does not exist; create the workbook first")]
    WorkbookMissing { file: String },
    /// A create targeted a month that already has a workbook and replacing was not allowed.
    #[error("report file '{file}' already exists; create_workbook would replace every sheet in it")]
    WorkbookExists { file: String },
    /// Template or storage could not be read or written.
    #[error("{0}")]
    Resource(String),
    /// Requested report file is not present under the output root.
    #[error("file not found: {0}")]
    NotFound(String),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateSheet { .. } | Self::WorkbookMissing { .. } | Self::WorkbookExists { .. } => {
                ErrorKind::Conflict
            }
            Self::Resource(_) => ErrorKind::Resource,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }

    pub fn resource(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Resource(format!("{context}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
