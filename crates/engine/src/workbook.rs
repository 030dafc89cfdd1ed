use crate::error::{ReportError, Result};
use crate::sheet::Sheet;

/// Characters xlsx forbids in sheet names.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Maximum sheet name length in xlsx.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Check a sheet name against xlsx naming rules.
pub fn is_valid_sheet_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && name.chars().count() <= MAX_SHEET_NAME_LEN
        && !name.contains(FORBIDDEN_SHEET_CHARS)
        && !name.starts_with('\'')
        && !name.ends_with('\'')
}

/// Sheet names are unique case-insensitively.
fn normalize_sheet_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// An ordered set of uniquely named sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    active_sheet: usize,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        let key = normalize_sheet_name(name);
        self.sheets.iter().find(|s| normalize_sheet_name(&s.name) == key)
    }

    /// Check if a sheet name already exists (case-insensitive)
    pub fn sheet_name_exists(&self, name: &str) -> bool {
        self.sheet_by_name(name).is_some()
    }

    pub fn active_sheet_index(&self) -> usize {
        self.active_sheet
    }

    /// Append an empty sheet. Existing names are rejected, never overwritten.
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        self.push_sheet(Sheet::new(name))?;
        let last = self.sheets.len() - 1;
        Ok(&mut self.sheets[last])
    }

    /// Append a fully built sheet under the same naming rules as [`Workbook::add_sheet`].
    pub fn push_sheet(&mut self, sheet: Sheet) -> Result<()> {
        if !is_valid_sheet_name(&sheet.name) {
            return Err(ReportError::Validation(format!(
                "'{}' is not a valid sheet name",
                sheet.name
            )));
        }
        if self.sheet_name_exists(&sheet.name) {
            return Err(ReportError::DuplicateSheet { sheet: sheet.name });
        }
        self.sheets.push(sheet);
        Ok(())
    }
}
