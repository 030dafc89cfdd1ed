use std::collections::{BTreeMap, BTreeSet};

use crate::cell::{Cell, CellStyle, CellValue};
use crate::cell_id::CellRef;
use crate::layout::WorksheetLayout;

static EMPTY_VALUE: CellValue = CellValue::Empty;

/// One worksheet: a sparse cell grid plus its layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<CellRef, Cell>,
    pub layout: WorksheetLayout,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
            layout: WorksheetLayout::default(),
        }
    }

    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    pub fn value(&self, at: CellRef) -> &CellValue {
        self.cells.get(&at).map(|c| &c.value).unwrap_or(&EMPTY_VALUE)
    }

    pub fn style(&self, at: CellRef) -> Option<&CellStyle> {
        self.cells.get(&at).map(|c| &c.style)
    }

    /// Set a value, keeping whatever style the cell already has.
    pub fn set_value(&mut self, at: CellRef, value: impl Into<CellValue>) {
        self.cells.entry(at).or_default().value = value.into();
    }

    pub fn set_style(&mut self, at: CellRef, style: CellStyle) {
        self.cells.entry(at).or_default().style = style;
    }

    pub fn style_mut(&mut self, at: CellRef) -> &mut CellStyle {
        &mut self.cells.entry(at).or_default().style
    }

    pub fn set_number_format(&mut self, at: CellRef, code: &str) {
        self.style_mut(at).number_format = Some(code.to_string());
    }

    /// Cells in row-major order.
    pub fn cells_iter(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells.iter()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Rows that hold at least one non-empty value.
    pub fn populated_rows(&self) -> BTreeSet<u32> {
        self.cells
            .iter()
            .filter(|(_, c)| !c.value.is_empty())
            .map(|(at, _)| at.row)
            .collect()
    }
}
