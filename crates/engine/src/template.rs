//! Template replication.
//!
//! A `TemplateSheet` is the read-only layout every report sheet must match.
//! [`clone_template`] copies its values, styles and layout into another sheet.

use std::sync::Arc;

use crate::error::Result;
use crate::layout::{EmbeddedImage, WorksheetLayout};
use crate::sheet::Sheet;
use crate::workbook::Workbook;

/// Immutable template. Cloning the handle is cheap and shares the parsed sheet.
#[derive(Debug, Clone)]
pub struct TemplateSheet {
    sheet: Arc<Sheet>,
}

impl TemplateSheet {
    pub fn new(sheet: Sheet) -> Self {
        Self {
            sheet: Arc::new(sheet),
        }
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn layout(&self) -> &WorksheetLayout {
        &self.sheet.layout
    }

    /// Fresh single-sheet workbook whose only sheet is a replica of the template.
    pub fn instantiate(&self, sheet_name: &str) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_sheet(sheet_name)?;
        clone_template(self, sheet);
        Ok(workbook)
    }
}

/// What a clone wrote, for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CloneStats {
    pub cells: usize,
    pub merges: usize,
    pub columns: usize,
    pub rows: usize,
    pub images: usize,
}

/// Replicate `template` into `target`.
///
/// Cell values are written where the template has one; each style sub-record
/// is copied only when the template cell defines it, so anything the caller
/// already put on `target` survives where the template is silent.
pub fn clone_template(template: &TemplateSheet, target: &mut Sheet) -> CloneStats {
    let source = template.sheet();
    let mut stats = CloneStats::default();

    for (at, cell) in source.cells_iter() {
        if !cell.value.is_empty() {
            target.set_value(*at, cell.value.clone());
        }
        cell.style.copy_onto(target.style_mut(*at));
        stats.cells += 1;
    }

    let layout = &source.layout;
    let out = &mut target.layout;

    // Verbatim coordinates, no normalization
    for range in &layout.merged_ranges {
        if out.add_merge(*range) {
            stats.merges += 1;
        }
    }

    out.page_setup = layout.page_setup.clone();
    out.print_options = layout.print_options;
    out.properties = layout.properties;
    out.margins = layout.margins;
    if let Some(header_footer) = &layout.header_footer {
        out.header_footer = Some(header_footer.clone());
    }
    if layout.default_row_height.is_some() {
        out.default_row_height = layout.default_row_height;
    }

    for (&col, &width) in &layout.column_widths {
        if width > 0.0 {
            out.column_widths.insert(col, width);
            stats.columns += 1;
        }
    }

    for (&row, &height) in &layout.row_heights {
        if height > 0.0 {
            out.row_heights.insert(row, height);
            stats.rows += 1;
        }
    }

    for image in &layout.images {
        out.images.push(EmbeddedImage {
            source: image.source.clone(),
            anchor: image.anchor,
            width_px: image.width_px,
            height_px: image.height_px,
            description: image.description.clone(),
        });
        stats.images += 1;
    }

    log::debug!(
        "Cloned template into '{}': {} cells, {} merges, {} columns, {} rows, {} images",
        target.name,
        stats.cells,
        stats.merges,
        stats.columns,
        stats.rows,
        stats.images
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{
        AlignmentStyle, BorderSide, BorderStyle, CellStyle, CellValue, DiagonalDirection, FillStyle,
        FontStyle, HorizontalAlign, PatternKind, RgbColor, Underline, VerticalAlign,
    };
    use crate::cell_id::CellRef;
    use crate::layout::{
        HeaderFooter, ImageAnchor, ImageSource, MergedRange, Orientation, PageMargins, PageSetup,
        PrintOptions, SheetProperties,
    };

    fn sample_template() -> TemplateSheet {
        let mut sheet = Sheet::new("Template");

        let title = CellRef::from_a1("A1").unwrap();
        sheet.set_value(title, "LAPORAN UJI KUAT TEKAN BETON");
        sheet.set_style(
            title,
            CellStyle {
                font: Some(FontStyle {
                    name: Some("Arial".into()),
                    size: Some(14.0),
                    bold: true,
                    underline: Underline::Single,
                    color: Some(RgbColor(0x1F497D)),
                    ..Default::default()
                }),
                alignment: Some(AlignmentStyle {
                    horizontal: HorizontalAlign::Center,
                    vertical: VerticalAlign::Center,
                    wrap_text: true,
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        let header = CellRef::from_a1("B21").unwrap();
        sheet.set_value(header, "Kode");
        sheet.set_style(
            header,
            CellStyle {
                fill: Some(FillStyle {
                    pattern: PatternKind::Solid,
                    start_color: Some(RgbColor(0xD9D9D9)),
                    end_color: Some(RgbColor(0xFFFFFF)),
                }),
                border: Some(BorderStyle {
                    diagonal: BorderSide::thin(),
                    diagonal_direction: Some(DiagonalDirection::Up),
                    ..BorderStyle::box_thin()
                }),
                ..Default::default()
            },
        );

        // Style-only cell
        sheet.style_mut(CellRef::from_a1("C12").unwrap()).font = Some(FontStyle {
            italic: true,
            ..Default::default()
        });

        let layout = &mut sheet.layout;
        layout.merged_ranges.push(MergedRange::from_a1("A1:N2").unwrap());
        layout.merged_ranges.push(MergedRange::from_a1("B21:B22").unwrap());
        layout.page_setup = PageSetup {
            orientation: Orientation::Landscape,
            paper_size: Some(9),
            scale: Some(85),
            ..Default::default()
        };
        layout.print_options = PrintOptions {
            horizontal_centered: true,
            ..Default::default()
        };
        layout.properties = SheetProperties {
            tab_color: Some(RgbColor(0x00B050)),
            fit_to_page: false,
        };
        layout.margins = Some(PageMargins {
            left: 0.5,
            right: 0.5,
            ..Default::default()
        });
        layout.header_footer = Some(HeaderFooter {
            header: Some("&CLaboratorium Beton".into()),
            footer: None,
        });
        layout.column_widths.insert(0, 4.5);
        layout.column_widths.insert(1, 12.0);
        layout.column_widths.insert(13, 0.0);
        layout.row_heights.insert(0, 30.0);
        layout.images.push(EmbeddedImage {
            source: ImageSource::new(vec![0x89u8, b'P', b'N', b'G']),
            anchor: ImageAnchor {
                cell: CellRef::new(0, 0),
                x_offset: 4,
                y_offset: 2,
            },
            width_px: Some(64.0),
            height_px: Some(64.0),
            description: Some("logo".into()),
        });

        TemplateSheet::new(sheet)
    }

    #[test]
    fn test_clone_fidelity() {
        let template = sample_template();
        let mut target = Sheet::new("05-03-2024");
        let stats = clone_template(&template, &mut target);

        for (at, cell) in template.sheet().cells_iter() {
            let cloned = target.cell(*at).unwrap();
            assert_eq!(cloned.value, cell.value, "value at {at}");
            assert_eq!(cloned.style, cell.style, "style at {at}");
        }
        assert_eq!(stats.cells, 3);
        assert_eq!(target.name, "05-03-2024");
    }

    #[test]
    fn test_layout_fidelity() {
        let template = sample_template();
        let mut target = Sheet::new("05-03-2024");
        let stats = clone_template(&template, &mut target);

        let src = template.layout();
        let out = &target.layout;
        assert_eq!(out.merged_ranges, src.merged_ranges);
        assert_eq!(out.page_setup, src.page_setup);
        assert_eq!(out.print_options, src.print_options);
        assert_eq!(out.properties, src.properties);
        assert_eq!(out.margins, src.margins);
        assert_eq!(out.header_footer, src.header_footer);
        assert_eq!(out.row_heights, src.row_heights);

        // Zero widths are not explicit sizes
        assert_eq!(out.column_widths.len(), 2);
        assert_eq!(out.column_widths.get(&1), Some(&12.0));
        assert!(!out.column_widths.contains_key(&13));
        assert_eq!(stats.columns, 2);
        assert_eq!(stats.merges, 2);
    }

    #[test]
    fn test_images_share_source_bytes() {
        let template = sample_template();
        let mut target = Sheet::new("t");
        clone_template(&template, &mut target);

        assert_eq!(target.layout.images.len(), 1);
        let (src, out) = (&template.layout().images[0], &target.layout.images[0]);
        assert!(out.source.shares_buffer(&src.source));
        assert_eq!(out.anchor, src.anchor);
        assert_eq!(out.width_px, Some(64.0));
    }

    #[test]
    fn test_absent_style_parts_preserve_target() {
        let template = sample_template();
        let mut target = Sheet::new("t");

        // Pre-populate C12 with a fill; the template only defines a font there
        let c12 = CellRef::from_a1("C12").unwrap();
        target.style_mut(c12).fill = Some(FillStyle::solid(RgbColor(0xFFFF00)));
        target.set_value(c12, "keep me");

        clone_template(&template, &mut target);

        let cell = target.cell(c12).unwrap();
        assert_eq!(cell.value, CellValue::Text("keep me".into()));
        assert_eq!(cell.style.fill, Some(FillStyle::solid(RgbColor(0xFFFF00))));
        assert!(cell.style.font.as_ref().unwrap().italic);
        assert!(cell.style.border.is_none());
    }

    #[test]
    fn test_empty_template_lays_out_only() {
        let mut sheet = Sheet::new("Template");
        sheet.layout.column_widths.insert(2, 20.0);
        sheet.layout.merged_ranges.push(MergedRange::from_a1("A1:C1").unwrap());
        let template = TemplateSheet::new(sheet);

        let mut target = Sheet::new("t");
        let stats = clone_template(&template, &mut target);
        assert!(target.is_empty());
        assert_eq!(stats.cells, 0);
        assert_eq!(target.layout.column_widths.get(&2), Some(&20.0));
        assert_eq!(target.layout.merged_ranges.len(), 1);
    }

    #[test]
    fn test_cloning_twice_does_not_duplicate_merges() {
        let template = sample_template();
        let mut target = Sheet::new("t");
        clone_template(&template, &mut target);
        clone_template(&template, &mut target);
        assert_eq!(target.layout.merged_ranges.len(), 2);
    }

    #[test]
    fn test_instantiate() {
        let template = sample_template();
        let workbook = template.instantiate("05-03-2024").unwrap();
        assert_eq!(workbook.sheet_names(), vec!["05-03-2024"]);
        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(
            sheet.value(CellRef::new(0, 0)),
            &CellValue::Text("LAPORAN UJI KUAT TEKAN BETON".into())
        );
        assert_eq!(sheet.layout.page_setup.orientation, Orientation::Landscape);
    }
}
