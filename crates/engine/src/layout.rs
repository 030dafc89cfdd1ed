//! Sheet-level structure that is not attached to any single cell:
//! page setup, margins, sizing maps, merged ranges and embedded images.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::cell::RgbColor;
use crate::cell_id::CellRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSetup {
    pub orientation: Orientation,
    /// xlsx paper size code (9 = A4)
    pub paper_size: Option<u8>,
    /// Print scale in percent
    pub scale: Option<u16>,
    /// Fit-to-pages width/height; only honoured when `SheetProperties::fit_to_page` is set.
    /// A value of 0 means "automatic" for that dimension.
    pub fit_to_width: Option<u16>,
    pub fit_to_height: Option<u16>,
    pub first_page_number: Option<u16>,
    pub over_then_down: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintOptions {
    pub horizontal_centered: bool,
    pub vertical_centered: bool,
    pub grid_lines: bool,
    pub headings: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetProperties {
    pub tab_color: Option<RgbColor>,
    pub fit_to_page: bool,
}

/// Margins in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub header: f64,
    pub footer: f64,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            left: 0.7,
            right: 0.7,
            top: 0.75,
            bottom: 0.75,
            header: 0.3,
            footer: 0.3,
        }
    }
}

/// Header/footer text in Excel's `&L`/`&C`/`&R` control-code syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFooter {
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl HeaderFooter {
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.footer.is_none()
    }
}

/// Rectangular span of cells shown as one, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergedRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl MergedRange {
    pub fn new(first: CellRef, last: CellRef) -> Self {
        Self { first, last }
    }

    /// Parse "A1:N2". A lone reference parses as a single-cell range.
    pub fn from_a1(range: &str) -> Option<Self> {
        match range.split_once(':') {
            Some((a, b)) => Some(Self::new(CellRef::from_a1(a)?, CellRef::from_a1(b)?)),
            None => {
                let cell = CellRef::from_a1(range)?;
                Some(Self::new(cell, cell))
            }
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.first == self.last
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.first.row
            && cell.row <= self.last.row
            && cell.col >= self.first.col
            && cell.col <= self.last.col
    }
}

impl fmt::Display for MergedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

/// Encoded image bytes (PNG/JPEG/...), shared rather than copied between sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource(Arc<[u8]>);

impl ImageSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// True when both handles point at the same buffer.
    pub fn shares_buffer(&self, other: &ImageSource) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Top-left anchor of an image: a cell plus a pixel offset inside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageAnchor {
    pub cell: CellRef,
    pub x_offset: u32,
    pub y_offset: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub source: ImageSource,
    pub anchor: ImageAnchor,
    /// Displayed size in pixels, when the source file recorded one
    pub width_px: Option<f64>,
    pub height_px: Option<f64>,
    pub description: Option<String>,
}

/// Structural, non-cell state of a worksheet.
///
/// The sizing maps are sparse: only explicitly sized columns/rows appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorksheetLayout {
    pub page_setup: PageSetup,
    pub print_options: PrintOptions,
    pub properties: SheetProperties,
    pub margins: Option<PageMargins>,
    pub header_footer: Option<HeaderFooter>,
    /// Column index → width in character units
    pub column_widths: BTreeMap<u16, f64>,
    /// Row index → height in points
    pub row_heights: BTreeMap<u32, f64>,
    pub default_row_height: Option<f64>,
    pub merged_ranges: Vec<MergedRange>,
    pub images: Vec<EmbeddedImage>,
}

impl WorksheetLayout {
    /// Add a merged range unless the identical range is already present.
    pub fn add_merge(&mut self, range: MergedRange) -> bool {
        if self.merged_ranges.contains(&range) {
            return false;
        }
        self.merged_ranges.push(range);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_range_parse() {
        let m = MergedRange::from_a1("A1:N2").unwrap();
        assert_eq!(m.first, CellRef::new(0, 0));
        assert_eq!(m.last, CellRef::new(1, 13));
        assert_eq!(m.to_string(), "A1:N2");
        assert!(m.contains(CellRef::new(1, 5)));
        assert!(!m.contains(CellRef::new(2, 0)));
        assert!(MergedRange::from_a1("B3").unwrap().is_single_cell());
        assert!(MergedRange::from_a1("B3:??").is_none());
    }

    #[test]
    fn test_add_merge_dedups() {
        let mut layout = WorksheetLayout::default();
        let m = MergedRange::from_a1("B21:B22").unwrap();
        assert!(layout.add_merge(m));
        assert!(!layout.add_merge(m));
        assert_eq!(layout.merged_ranges.len(), 1);
    }

    #[test]
    fn test_default_anchor_is_a1() {
        let anchor = ImageAnchor::default();
        assert_eq!(anchor.cell, CellRef::new(0, 0));
        assert_eq!((anchor.x_offset, anchor.y_offset), (0, 0));
    }

    #[test]
    fn test_image_source_sharing() {
        let a = ImageSource::new(vec![1u8, 2, 3]);
        let b = a.clone();
        let c = ImageSource::new(vec![1u8, 2, 3]);
        assert!(a.shares_buffer(&b));
        assert!(!a.shares_buffer(&c));
        assert_eq!(a, c);
    }
}
