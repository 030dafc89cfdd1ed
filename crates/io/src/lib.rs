// File I/O: xlsx templates and reports, durable storage, monthly report store

pub mod lock;
pub mod storage;
pub mod store;
pub mod template;
pub mod xlsx;
pub mod xlsx_sheet;
pub mod xlsx_styles;

pub use lock::PathLocks;
pub use storage::{FsStorage, ReportStorage};
pub use store::{ReportStore, ReportSummary};
pub use template::{CachedTemplate, TemplateSource, XlsxTemplateFile};
