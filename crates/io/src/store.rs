//! Monthly report workbooks: create, append, reopen and list.
//!
//! One file per calendar month (`{prefix}_{YYYY-MM}.xlsx`), one sheet per
//! test date (`DD-MM-YYYY`). Every submission is a read-modify-persist on that
//! file, serialized per path and assembled fully in memory before the single
//! atomic write.

use std::path::PathBuf;
use std::time::Instant;

use labsheet_engine::assemble::{fill_header, fill_rows, DATA_START_ROW};
use labsheet_engine::error::{ReportError, Result};
use labsheet_engine::record::{ReportAction, ReportBatch, TestDate};
use labsheet_engine::sheet::Sheet;
use labsheet_engine::template::clone_template;
use labsheet_engine::workbook::Workbook;

use crate::lock::PathLocks;
use crate::storage::{is_safe_file_name, ReportStorage};
use crate::template::TemplateSource;
use crate::xlsx;

pub const DEFAULT_FILE_PREFIX: &str = "laporan";

/// A report file and the test dates it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub file_name: String,
    pub sheets: Vec<String>,
}

pub struct ReportStore {
    storage: Box<dyn ReportStorage>,
    template: Box<dyn TemplateSource>,
    file_prefix: String,
    locks: PathLocks,
}

impl ReportStore {
    pub fn new(storage: impl ReportStorage + 'static, template: impl TemplateSource + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            template: Box::new(template),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            locks: PathLocks::new(),
        }
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Monthly file name for a test date.
    pub fn file_name_for(&self, date: &TestDate) -> String {
        format!("{}_{}.xlsx", self.file_prefix, date.month_key())
    }

    pub fn report_exists(&self, date: &TestDate) -> bool {
        self.storage.exists(&self.file_name_for(date))
    }

    /// Apply one submission and return the path of the monthly file.
    ///
    /// On any error nothing is written: the file keeps its previous contents
    /// (or stays absent).
    pub fn submit(&self, batch: &ReportBatch) -> Result<PathBuf> {
        self.submit_with(batch, true)
    }

    /// Same as [`ReportStore::submit`], except that a create over an existing
    /// month fails with `WorkbookExists`. The existence check holds the path lock.
    pub fn submit_no_replace(&self, batch: &ReportBatch) -> Result<PathBuf> {
        self.submit_with(batch, false)
    }

    fn submit_with(&self, batch: &ReportBatch, allow_replace: bool) -> Result<PathBuf> {
        let file_name = self.file_name_for(&batch.test_date);
        if !is_safe_file_name(&file_name) {
            return Err(ReportError::Validation(format!("invalid report file name '{file_name}'")));
        }
        let path = self.storage.path_of(&file_name);

        self.locks.with_lock(&path, || -> Result<PathBuf> {
            let start_time = Instant::now();
            match batch.action {
                ReportAction::CreateWorkbook => self.create_workbook(&file_name, batch, allow_replace)?,
                ReportAction::AppendSheet => self.append_sheet(&file_name, batch)?,
            }
            log::debug!(
                "{} {} for {} in {} ms",
                batch.action,
                file_name,
                batch.test_date,
                start_time.elapsed().as_millis()
            );
            Ok(path.clone())
        })
    }

    fn create_workbook(&self, file_name: &str, batch: &ReportBatch, allow_replace: bool) -> Result<()> {
        let sheet_name = batch.test_date.sheet_name();
        let replacing = self.storage.exists(file_name);
        if replacing && !allow_replace {
            log::warn!("Create of {sheet_name} rejected: {file_name} already exists");
            return Err(ReportError::WorkbookExists {
                file: file_name.to_string(),
            });
        }

        let template = self.template.load()?;
        let mut workbook = template.instantiate(&sheet_name)?;
        if let Some(sheet) = workbook.sheet_mut(0) {
            fill(sheet, batch);
        }
        let bytes = xlsx::write_workbook(&workbook)?;
        self.storage.write_atomic(file_name, &bytes)?;
        if replacing {
            log::info!("Replaced {file_name} with a new workbook starting at sheet {sheet_name}");
        } else {
            log::info!("Created {file_name} with sheet {sheet_name}");
        }
        Ok(())
    }

    fn append_sheet(&self, file_name: &str, batch: &ReportBatch) -> Result<()> {
        let sheet_name = batch.test_date.sheet_name();
        if !self.storage.exists(file_name) {
            log::warn!("Append of {sheet_name} rejected: {file_name} does not exist");
            return Err(ReportError::WorkbookMissing {
                file: file_name.to_string(),
            });
        }

        let bytes = self.storage.read(file_name)?;
        let mut workbook = xlsx::read_workbook(&bytes)?;
        if workbook.sheet_name_exists(&sheet_name) {
            log::warn!("Append rejected: {file_name} already has sheet {sheet_name}");
            return Err(ReportError::DuplicateSheet { sheet: sheet_name });
        }

        let template = self.template.load()?;
        let sheet = workbook.add_sheet(&sheet_name)?;
        clone_template(&template, sheet);
        fill(sheet, batch);

        let bytes = xlsx::write_workbook(&workbook)?;
        self.storage.write_atomic(file_name, &bytes)?;
        log::info!(
            "Appended sheet {sheet_name} to {file_name} ({} sheets)",
            workbook.sheet_count()
        );
        Ok(())
    }

    /// Raw bytes of a report file, for download.
    pub fn open_report(&self, file_name: &str) -> Result<Vec<u8>> {
        if !is_safe_file_name(file_name) || !self.storage.exists(file_name) {
            return Err(ReportError::NotFound(file_name.to_string()));
        }
        self.storage.read(file_name)
    }

    /// Parse a report file into a workbook.
    pub fn load_report(&self, file_name: &str) -> Result<Workbook> {
        let bytes = self.open_report(file_name)?;
        xlsx::read_workbook(&bytes)
    }

    /// Every report file with its sheet names. Unreadable files are skipped.
    pub fn list_reports(&self) -> Result<Vec<ReportSummary>> {
        let mut reports = Vec::new();
        for file_name in self.storage.list()? {
            let sheets = self
                .storage
                .read(&file_name)
                .and_then(|bytes| xlsx::read_sheet_names(&bytes));
            match sheets {
                Ok(sheets) => reports.push(ReportSummary { file_name, sheets }),
                Err(e) => log::warn!("Skipping unreadable report {file_name}: {e}"),
            }
        }
        Ok(reports)
    }
}

fn fill(sheet: &mut Sheet, batch: &ReportBatch) {
    fill_header(sheet, &batch.header, batch.test_date);
    let rows = fill_rows(sheet, DATA_START_ROW, &batch.records);
    log::debug!("Filled sheet {} with {rows} record(s)", sheet.name);
}
