//! Excel (.xlsx) reading and writing.
//!
//! Reading combines calamine (values, formulas) with the crate's own XML
//! parsers (styles, layout, images). Writing goes through rust_xlsxwriter and
//! stays in memory; callers decide where the bytes land.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::time::Instant;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatDiagonalBorder, FormatPattern, FormatUnderline,
    Image, Workbook as XlsxWorkbook, Worksheet,
};
use labsheet_engine::cell::{
    BorderLine, CellStyle, CellValue, DiagonalDirection, HorizontalAlign, PatternKind, RgbColor,
    Underline, VerticalAlign,
};
use labsheet_engine::cell_id::CellRef;
use labsheet_engine::error::{ReportError, Result};
use labsheet_engine::layout::{EmbeddedImage, ImageSource, Orientation, WorksheetLayout};
use labsheet_engine::sheet::Sheet;
use labsheet_engine::template::TemplateSheet;
use labsheet_engine::workbook::Workbook;
use zip::ZipArchive;

use crate::xlsx_sheet::{self, DrawingPicture};
use crate::xlsx_styles::{self, StyleTable};

// =============================================================================
// Reading
// =============================================================================

/// Read a file from a ZIP archive as text.
fn read_zip_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Option<String> {
    let mut file = archive.by_name(path).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).ok()?;
    Some(content)
}

fn read_zip_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Option<Vec<u8>> {
    let mut file = archive.by_name(path).ok()?;
    let mut content = Vec::new();
    file.read_to_end(&mut content).ok()?;
    Some(content)
}

/// An opened xlsx package: calamine for cell data, the raw archive for the
/// parts calamine does not expose.
struct XlsxPackage<'a> {
    cells: Xlsx<Cursor<&'a [u8]>>,
    archive: ZipArchive<Cursor<&'a [u8]>>,
    styles: StyleTable,
    /// Sheet name → worksheet part path
    sheet_paths: HashMap<String, String>,
    /// Media already loaded, so pictures sharing a part share one buffer
    media: HashMap<String, ImageSource>,
}

impl<'a> XlsxPackage<'a> {
    fn open(bytes: &'a [u8]) -> Result<Self> {
        let cells: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| ReportError::resource("Failed to open xlsx", e))?;
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ReportError::resource("Failed to read xlsx as zip", e))?;

        let styles = read_zip_file(&mut archive, "xl/styles.xml")
            .map(|xml| xlsx_styles::parse_styles_xml(&xml))
            .unwrap_or_default();

        let workbook_xml = read_zip_file(&mut archive, "xl/workbook.xml").unwrap_or_default();
        let rels_xml = read_zip_file(&mut archive, "xl/_rels/workbook.xml.rels").unwrap_or_default();
        let rels = xlsx_sheet::parse_relationships(&rels_xml);
        let sheet_paths = xlsx_sheet::parse_workbook_sheets(&workbook_xml)
            .into_iter()
            .filter_map(|(name, rid)| {
                let target = rels.get(&rid)?;
                Some((name, xlsx_sheet::resolve_part_path("xl/workbook.xml", target)))
            })
            .collect();

        Ok(Self {
            cells,
            archive,
            styles,
            sheet_paths,
            media: HashMap::new(),
        })
    }

    fn sheet_names(&self) -> Vec<String> {
        self.cells.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        let mut sheet = Sheet::new(name);

        let range = self
            .cells
            .worksheet_range(name)
            .map_err(|e| ReportError::resource(&format!("Failed to read sheet '{name}'"), e))?;
        if let Some((row0, col0)) = range.start() {
            for (r, c, data) in range.used_cells() {
                let value = data_to_value(data);
                if !value.is_empty() {
                    sheet.set_value(cell_at(row0, col0, r, c), value);
                }
            }
        }

        // Formulas win over their cached results
        let formulas = self
            .cells
            .worksheet_formula(name)
            .map_err(|e| ReportError::resource(&format!("Failed to read formulas of '{name}'"), e))?;
        if let Some((row0, col0)) = formulas.start() {
            for (r, c, source) in formulas.used_cells() {
                sheet.set_value(cell_at(row0, col0, r, c), CellValue::formula(source.as_str()));
            }
        }

        let Some(part) = self.sheet_paths.get(name).cloned() else {
            log::warn!("No worksheet part found for '{name}'; styles and layout skipped");
            return Ok(sheet);
        };
        let Some(xml) = read_zip_file(&mut self.archive, &part) else {
            log::warn!("Worksheet part '{part}' is unreadable; styles and layout skipped");
            return Ok(sheet);
        };

        let formatting = xlsx_sheet::parse_sheet_formatting(&xml);
        for (at, style_id) in &formatting.cell_styles {
            if let Some(style) = self.styles.get(*style_id).filter(|s| !s.is_empty()) {
                sheet.set_style(*at, style.clone());
            }
        }
        sheet.layout = formatting.layout;

        if let Some(rid) = &formatting.drawing_rel {
            sheet.layout.images = self.read_images(&part, rid);
        }

        Ok(sheet)
    }

    /// Follow sheet rels → drawing part → drawing rels → media.
    fn read_images(&mut self, sheet_part: &str, drawing_rid: &str) -> Vec<EmbeddedImage> {
        let sheet_rels = read_zip_file(&mut self.archive, &xlsx_sheet::rels_path_for(sheet_part))
            .map(|xml| xlsx_sheet::parse_relationships(&xml))
            .unwrap_or_default();
        let Some(target) = sheet_rels.get(drawing_rid) else {
            return Vec::new();
        };
        let drawing_part = xlsx_sheet::resolve_part_path(sheet_part, target);
        let Some(drawing_xml) = read_zip_file(&mut self.archive, &drawing_part) else {
            return Vec::new();
        };
        let drawing_rels = read_zip_file(&mut self.archive, &xlsx_sheet::rels_path_for(&drawing_part))
            .map(|xml| xlsx_sheet::parse_relationships(&xml))
            .unwrap_or_default();

        let mut images = Vec::new();
        for picture in xlsx_sheet::parse_drawing_xml(&drawing_xml) {
            let DrawingPicture { anchor, width_px, height_px, embed, description } = picture;
            let Some(media_target) = drawing_rels.get(&embed) else {
                log::warn!("Picture in '{drawing_part}' references missing relationship {embed}");
                continue;
            };
            let media_part = xlsx_sheet::resolve_part_path(&drawing_part, media_target);
            let source = match self.media.get(&media_part) {
                Some(source) => source.clone(),
                None => {
                    let Some(bytes) = read_zip_bytes(&mut self.archive, &media_part) else {
                        log::warn!("Image part '{media_part}' is missing");
                        continue;
                    };
                    let source = ImageSource::new(bytes);
                    self.media.insert(media_part, source.clone());
                    source
                }
            };
            images.push(EmbeddedImage {
                source,
                anchor,
                width_px,
                height_px,
                description,
            });
        }
        images
    }
}

fn cell_at(row0: u32, col0: u32, r: usize, c: usize) -> CellRef {
    CellRef::new(row0 + r as u32, (col0 as usize + c) as u16)
}

fn data_to_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Read every sheet of an xlsx file, values plus styles and layout.
pub fn read_workbook(bytes: &[u8]) -> Result<Workbook> {
    let start_time = Instant::now();
    let mut package = XlsxPackage::open(bytes)?;

    let mut workbook = Workbook::new();
    for name in package.sheet_names() {
        let sheet = package.read_sheet(&name)?;
        workbook.push_sheet(sheet)?;
    }

    log::debug!(
        "Read xlsx with {} sheet(s) in {} ms",
        workbook.sheet_count(),
        start_time.elapsed().as_millis()
    );
    Ok(workbook)
}

/// Read the first worksheet of a template file.
pub fn read_template(bytes: &[u8]) -> Result<TemplateSheet> {
    let mut package = XlsxPackage::open(bytes)?;
    let Some(first) = package.sheet_names().into_iter().next() else {
        return Err(ReportError::Resource("Template contains no sheets".to_string()));
    };
    let sheet = package.read_sheet(&first)?;
    log::debug!(
        "Loaded template sheet '{}': {} cells, {} merges, {} images",
        sheet.name,
        sheet.cell_count(),
        sheet.layout.merged_ranges.len(),
        sheet.layout.images.len()
    );
    Ok(TemplateSheet::new(sheet))
}

/// Sheet names of an xlsx file, without loading cells.
pub fn read_sheet_names(bytes: &[u8]) -> Result<Vec<String>> {
    let cells: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| ReportError::resource("Failed to open xlsx", e))?;
    Ok(cells.sheet_names())
}

// =============================================================================
// Writing
// =============================================================================

/// Export statistics, for logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportStats {
    pub sheets: usize,
    pub cells: usize,
    pub formulas: usize,
    pub merges: usize,
    pub merges_skipped: usize,
    pub images: usize,
}

/// Serialize a workbook to xlsx bytes.
pub fn write_workbook(workbook: &Workbook) -> Result<Vec<u8>> {
    let start_time = Instant::now();
    let mut stats = ExportStats::default();
    let mut xlsx_workbook = XlsxWorkbook::new();

    for sheet in workbook.sheets() {
        let worksheet = xlsx_workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|e| ReportError::resource(&format!("Failed to create sheet '{}'", sheet.name), e))?;
        export_sheet(sheet, worksheet, &mut stats)?;
        stats.sheets += 1;
    }

    if let Ok(ws) = xlsx_workbook.worksheet_from_index(workbook.active_sheet_index()) {
        ws.set_active(true);
    }

    let bytes = xlsx_workbook
        .save_to_buffer()
        .map_err(|e| ReportError::resource("Failed to serialize xlsx", e))?;

    log::debug!(
        "Wrote xlsx: {} sheet(s), {} cells ({} formulas), {} merges ({} skipped), {} images, {} bytes in {} ms",
        stats.sheets,
        stats.cells,
        stats.formulas,
        stats.merges,
        stats.merges_skipped,
        stats.images,
        bytes.len(),
        start_time.elapsed().as_millis()
    );
    Ok(bytes)
}

fn cell_error(at: CellRef, e: impl std::fmt::Display) -> ReportError {
    ReportError::Resource(format!("Failed to write cell {at}: {e}"))
}

fn export_sheet(sheet: &Sheet, worksheet: &mut Worksheet, stats: &mut ExportStats) -> Result<()> {
    // Merges first: merge_range() writes blanks to every cell in the range,
    // then the cell loop overwrites the origin with its typed value.
    for range in &sheet.layout.merged_ranges {
        if range.is_single_cell() {
            log::warn!("Skipping single-cell merge {range} on '{}'", sheet.name);
            stats.merges_skipped += 1;
            continue;
        }
        let format = sheet.style(range.first).map(build_format).unwrap_or_default();
        worksheet
            .merge_range(range.first.row, range.first.col, range.last.row, range.last.col, "", &format)
            .map_err(|e| ReportError::Resource(format!("Failed to write merge {range}: {e}")))?;
        stats.merges += 1;
    }

    for (at, cell) in sheet.cells_iter() {
        let (row, col) = (at.row, at.col);
        let format = build_format(&cell.style);

        match &cell.value {
            CellValue::Empty => {
                if cell.style.is_empty() {
                    continue;
                }
                worksheet.write_blank(row, col, &format).map_err(|e| cell_error(*at, e))?;
            }
            CellValue::Text(s) => {
                worksheet
                    .write_string_with_format(row, col, s, &format)
                    .map_err(|e| cell_error(*at, e))?;
            }
            CellValue::Number(n) => {
                worksheet
                    .write_number_with_format(row, col, *n, &format)
                    .map_err(|e| cell_error(*at, e))?;
            }
            CellValue::Bool(b) => {
                worksheet
                    .write_boolean_with_format(row, col, *b, &format)
                    .map_err(|e| cell_error(*at, e))?;
            }
            CellValue::Formula(source) => {
                let formula = source.strip_prefix('=').unwrap_or(source);
                worksheet
                    .write_formula_with_format(row, col, formula, &format)
                    .map_err(|e| cell_error(*at, e))?;
                stats.formulas += 1;
            }
        }
        stats.cells += 1;
    }

    apply_layout(worksheet, &sheet.layout)?;

    for image in &sheet.layout.images {
        let mut picture = Image::new_from_buffer(image.source.bytes())
            .map_err(|e| ReportError::resource("Failed to decode embedded image", e))?;
        if let (Some(width), Some(height)) = (image.width_px, image.height_px) {
            picture = picture.set_scale_to_size(width, height, false);
        }
        if let Some(description) = &image.description {
            picture = picture.set_alt_text(description);
        }
        let anchor = image.anchor;
        worksheet
            .insert_image_with_offset(anchor.cell.row, anchor.cell.col, &picture, anchor.x_offset, anchor.y_offset)
            .map_err(|e| ReportError::Resource(format!("Failed to place image at {}: {e}", anchor.cell)))?;
        stats.images += 1;
    }

    Ok(())
}

/// Column widths are stored in xlsx character units; rust_xlsxwriter's
/// pixel setter round-trips them without adding padding a second time.
fn width_to_pixels(width: f64) -> u16 {
    (width * 7.0).round().clamp(0.0, u16::MAX as f64) as u16
}

/// Apply page setup, sizing and sheet properties.
fn apply_layout(worksheet: &mut Worksheet, layout: &WorksheetLayout) -> Result<()> {
    for (&col, &width) in &layout.column_widths {
        worksheet
            .set_column_width_pixels(col, width_to_pixels(width))
            .map_err(|e| ReportError::Resource(format!("Failed to set column {col} width: {e}")))?;
    }

    for (&row, &height) in &layout.row_heights {
        worksheet
            .set_row_height(row, height)
            .map_err(|e| ReportError::Resource(format!("Failed to set row {row} height: {e}")))?;
    }

    if let Some(height) = layout.default_row_height {
        worksheet.set_default_row_height(height);
    }

    let setup = &layout.page_setup;
    match setup.orientation {
        Orientation::Landscape => worksheet.set_landscape(),
        Orientation::Portrait => worksheet.set_portrait(),
    };
    if let Some(paper) = setup.paper_size {
        worksheet.set_paper_size(paper);
    }
    if layout.properties.fit_to_page {
        worksheet.set_print_fit_to_pages(setup.fit_to_width.unwrap_or(1), setup.fit_to_height.unwrap_or(1));
    } else if let Some(scale) = setup.scale {
        worksheet.set_print_scale(scale);
    }
    if let Some(first) = setup.first_page_number {
        worksheet.set_print_first_page_number(first);
    }
    if setup.over_then_down {
        worksheet.set_page_order(true);
    }

    if let Some(m) = layout.margins {
        worksheet.set_margins(m.left, m.right, m.top, m.bottom, m.header, m.footer);
    }

    if let Some(header_footer) = &layout.header_footer {
        if let Some(header) = &header_footer.header {
            worksheet.set_header(header);
        }
        if let Some(footer) = &header_footer.footer {
            worksheet.set_footer(footer);
        }
    }

    let print = layout.print_options;
    worksheet.set_print_center_horizontally(print.horizontal_centered);
    worksheet.set_print_center_vertically(print.vertical_centered);
    worksheet.set_print_gridlines(print.grid_lines);
    worksheet.set_print_headings(print.headings);

    if let Some(color) = layout.properties.tab_color {
        worksheet.set_tab_color(xlsx_color(color));
    }

    Ok(())
}

fn xlsx_color(color: RgbColor) -> Color {
    Color::RGB(color.0)
}

/// Build a rust_xlsxwriter Format from the sub-records present on a style.
fn build_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if let Some(font) = &style.font {
        if let Some(name) = &font.name {
            format = format.set_font_name(name);
        }
        if let Some(size) = font.size {
            format = format.set_font_size(size);
        }
        if font.bold {
            format = format.set_bold();
        }
        if font.italic {
            format = format.set_italic();
        }
        if font.underline != Underline::None {
            format = format.set_underline(underline_to_xlsx(font.underline));
        }
        if font.strikethrough {
            format = format.set_font_strikethrough();
        }
        if let Some(color) = font.color {
            format = format.set_font_color(xlsx_color(color));
        }
    }

    if let Some(alignment) = &style.alignment {
        if let Some(align) = horizontal_to_xlsx(alignment.horizontal) {
            format = format.set_align(align);
        }
        if let Some(align) = vertical_to_xlsx(alignment.vertical) {
            format = format.set_align(align);
        }
        if alignment.wrap_text {
            format = format.set_text_wrap();
        }
        if alignment.shrink_to_fit {
            format = format.set_shrink();
        }
        if alignment.rotation != 0 {
            format = format.set_rotation(alignment.rotation);
        }
    }

    if let Some(fill) = &style.fill {
        format = format.set_pattern(pattern_to_xlsx(fill.pattern));
        if fill.pattern == PatternKind::Solid {
            // The writer swaps fg/bg on solid xfs when both are set; only the
            // visible color goes through, as a background.
            if let Some(color) = fill.start_color.or(fill.end_color) {
                format = format.set_background_color(xlsx_color(color));
            }
        } else {
            if let Some(color) = fill.start_color {
                format = format.set_foreground_color(xlsx_color(color));
            }
            if let Some(color) = fill.end_color {
                format = format.set_background_color(xlsx_color(color));
            }
        }
    }

    if let Some(border) = &style.border {
        if !border.left.is_none() {
            format = format.set_border_left(border_to_xlsx(border.left.line));
            if let Some(color) = border.left.color {
                format = format.set_border_left_color(xlsx_color(color));
            }
        }
        if !border.right.is_none() {
            format = format.set_border_right(border_to_xlsx(border.right.line));
            if let Some(color) = border.right.color {
                format = format.set_border_right_color(xlsx_color(color));
            }
        }
        if !border.top.is_none() {
            format = format.set_border_top(border_to_xlsx(border.top.line));
            if let Some(color) = border.top.color {
                format = format.set_border_top_color(xlsx_color(color));
            }
        }
        if !border.bottom.is_none() {
            format = format.set_border_bottom(border_to_xlsx(border.bottom.line));
            if let Some(color) = border.bottom.color {
                format = format.set_border_bottom_color(xlsx_color(color));
            }
        }
        if let Some(direction) = border.diagonal_direction.filter(|_| !border.diagonal.is_none()) {
            format = format
                .set_border_diagonal(border_to_xlsx(border.diagonal.line))
                .set_border_diagonal_type(diagonal_to_xlsx(direction));
            if let Some(color) = border.diagonal.color {
                format = format.set_border_diagonal_color(xlsx_color(color));
            }
        }
    }

    if let Some(code) = &style.number_format {
        format = format.set_num_format(code);
    }

    format
}

fn underline_to_xlsx(underline: Underline) -> FormatUnderline {
    match underline {
        Underline::None => FormatUnderline::None,
        Underline::Single => FormatUnderline::Single,
        Underline::Double => FormatUnderline::Double,
        Underline::SingleAccounting => FormatUnderline::SingleAccounting,
        Underline::DoubleAccounting => FormatUnderline::DoubleAccounting,
    }
}

fn horizontal_to_xlsx(align: HorizontalAlign) -> Option<FormatAlign> {
    match align {
        HorizontalAlign::General => None, // Excel default: numbers right, text left
        HorizontalAlign::Left => Some(FormatAlign::Left),
        HorizontalAlign::Center => Some(FormatAlign::Center),
        HorizontalAlign::Right => Some(FormatAlign::Right),
        HorizontalAlign::Fill => Some(FormatAlign::Fill),
        HorizontalAlign::Justify => Some(FormatAlign::Justify),
        HorizontalAlign::CenterContinuous => Some(FormatAlign::CenterAcross),
        HorizontalAlign::Distributed => Some(FormatAlign::Distributed),
    }
}

fn vertical_to_xlsx(align: VerticalAlign) -> Option<FormatAlign> {
    match align {
        VerticalAlign::Bottom => None, // Excel default
        VerticalAlign::Top => Some(FormatAlign::Top),
        VerticalAlign::Center => Some(FormatAlign::VerticalCenter),
        VerticalAlign::Justify => Some(FormatAlign::VerticalJustify),
        VerticalAlign::Distributed => Some(FormatAlign::VerticalDistributed),
    }
}

fn pattern_to_xlsx(pattern: PatternKind) -> FormatPattern {
    match pattern {
        PatternKind::None => FormatPattern::None,
        PatternKind::Solid => FormatPattern::Solid,
        PatternKind::MediumGray => FormatPattern::MediumGray,
        PatternKind::DarkGray => FormatPattern::DarkGray,
        PatternKind::LightGray => FormatPattern::LightGray,
        PatternKind::DarkHorizontal => FormatPattern::DarkHorizontal,
        PatternKind::DarkVertical => FormatPattern::DarkVertical,
        PatternKind::DarkDown => FormatPattern::DarkDown,
        PatternKind::DarkUp => FormatPattern::DarkUp,
        PatternKind::DarkGrid => FormatPattern::DarkGrid,
        PatternKind::DarkTrellis => FormatPattern::DarkTrellis,
        PatternKind::LightHorizontal => FormatPattern::LightHorizontal,
        PatternKind::LightVertical => FormatPattern::LightVertical,
        PatternKind::LightDown => FormatPattern::LightDown,
        PatternKind::LightUp => FormatPattern::LightUp,
        PatternKind::LightGrid => FormatPattern::LightGrid,
        PatternKind::LightTrellis => FormatPattern::LightTrellis,
        PatternKind::Gray125 => FormatPattern::Gray125,
        PatternKind::Gray0625 => FormatPattern::Gray0625,
    }
}

fn border_to_xlsx(line: BorderLine) -> FormatBorder {
    match line {
        BorderLine::None => FormatBorder::None,
        BorderLine::Thin => FormatBorder::Thin,
        BorderLine::Medium => FormatBorder::Medium,
        BorderLine::Dashed => FormatBorder::Dashed,
        BorderLine::Dotted => FormatBorder::Dotted,
        BorderLine::Thick => FormatBorder::Thick,
        BorderLine::Double => FormatBorder::Double,
        BorderLine::Hair => FormatBorder::Hair,
        BorderLine::MediumDashed => FormatBorder::MediumDashed,
        BorderLine::DashDot => FormatBorder::DashDot,
        BorderLine::MediumDashDot => FormatBorder::MediumDashDot,
        BorderLine::DashDotDot => FormatBorder::DashDotDot,
        BorderLine::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderLine::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

fn diagonal_to_xlsx(direction: DiagonalDirection) -> FormatDiagonalBorder {
    match direction {
        DiagonalDirection::Up => FormatDiagonalBorder::BorderUp,
        DiagonalDirection::Down => FormatDiagonalBorder::BorderDown,
        DiagonalDirection::Both => FormatDiagonalBorder::BorderUpDown,
    }
}
