//! `labsheet-engine`: report model and the two core algorithms:
//! template replication and specimen row assembly.
//!
//! Pure crate: no file or network I/O.

pub mod assemble;
pub mod cell;
pub mod cell_id;
pub mod error;
pub mod layout;
pub mod record;
pub mod sheet;
pub mod template;
pub mod workbook;

pub use cell_id::CellRef;
pub use error::{ErrorKind, ReportError};
pub use record::{ReportAction, ReportBatch, ReportHeader, SpecimenRecord, SubmissionForm, TestDate};
pub use sheet::Sheet;
pub use template::{clone_template, TemplateSheet};
pub use workbook::Workbook;
