//! Worksheet part parsers: per-cell style ids, sheet layout, drawings and
//! package relationships.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use labsheet_engine::cell_id::CellRef;
use labsheet_engine::layout::{
    HeaderFooter, ImageAnchor, MergedRange, Orientation, PageMargins, WorksheetLayout,
};

use crate::xlsx_styles::{collect_attrs, parse_color_attrs, parse_flag, parse_num, resolve_entity, unescape_xml};

/// EMUs per pixel at 96 dpi.
const EMU_PER_PIXEL: f64 = 9525.0;

/// Everything one worksheet XML part says about formatting and layout.
///
/// `layout.images` is left empty; images live in the drawing part named by
/// `drawing_rel`.
#[derive(Debug, Default)]
pub struct SheetFormatting {
    /// (cell, style_id) pairs for cells with a non-default style
    pub cell_styles: Vec<(CellRef, usize)>,
    pub layout: WorksheetLayout,
    /// Relationship id of the sheet's <drawing>, if any
    pub drawing_rel: Option<String>,
}

/// One picture anchored in a drawing part.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingPicture {
    pub anchor: ImageAnchor,
    pub width_px: Option<f64>,
    pub height_px: Option<f64>,
    /// Relationship id of the image media in the drawing's rels
    pub embed: String,
    pub description: Option<String>,
}

// =============================================================================
// Worksheet XML parser
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    Header,
    Footer,
}

/// Parse a worksheet XML part.
pub fn parse_sheet_formatting(xml: &str) -> SheetFormatting {
    let mut out = SheetFormatting::default();
    let mut header_footer = HeaderFooter::default();
    let mut saw_header_footer = false;
    let mut text_target: Option<TextTarget> = None;
    let mut text = String::new();

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut current_row: Option<u32> = None;
    let mut next_col: u16 = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let layout = &mut out.layout;
                match e.name().as_ref() {
                    b"row" => {
                        let mut ht: Option<f64> = None;
                        let mut custom_height = false;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    // 1-based → 0-based
                                    current_row = parse_num::<u32>(&attr.value)
                                        .map(|r| r.saturating_sub(1));
                                }
                                b"ht" => ht = parse_num(&attr.value),
                                b"customHeight" => custom_height = parse_flag(&attr.value),
                                _ => {}
                            }
                        }
                        next_col = 0;
                        if custom_height {
                            if let (Some(row), Some(height)) = (current_row, ht) {
                                layout.row_heights.insert(row, height);
                            }
                        }
                    }
                    b"c" => {
                        let mut style_id: Option<usize> = None;
                        let mut cell: Option<CellRef> = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"s" => style_id = parse_num(&attr.value),
                                b"r" => {
                                    cell = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .and_then(CellRef::from_a1);
                                }
                                _ => {}
                            }
                        }
                        // Cells without r="" follow the previous one in the row
                        let cell = cell.or_else(|| current_row.map(|row| CellRef::new(row, next_col)));
                        if let Some(cell) = cell {
                            next_col = cell.col.saturating_add(1);
                            if let Some(style_id) = style_id.filter(|id| *id > 0) {
                                // style_id 0 = default, skip
                                out.cell_styles.push((cell, style_id));
                            }
                        }
                    }
                    b"col" => {
                        let mut min_col: Option<u16> = None;
                        let mut max_col: Option<u16> = None;
                        let mut width: Option<f64> = None;
                        let mut custom_width = false;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"min" => min_col = parse_num::<u16>(&attr.value).map(|c| c.saturating_sub(1)),
                                b"max" => max_col = parse_num::<u16>(&attr.value).map(|c| c.saturating_sub(1)),
                                b"width" => width = parse_num(&attr.value),
                                b"customWidth" => custom_width = parse_flag(&attr.value),
                                _ => {}
                            }
                        }
                        if custom_width {
                            if let (Some(min), Some(max), Some(w)) = (min_col, max_col, width) {
                                // Excel writes max="16384" for "every remaining column"
                                let max = max.min(labsheet_engine::cell_id::MAX_COL);
                                for col in min..=max {
                                    layout.column_widths.insert(col, w);
                                }
                            }
                        }
                    }
                    b"mergeCell" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"ref" {
                                let range = String::from_utf8_lossy(&attr.value);
                                if let Some(range) = MergedRange::from_a1(&range) {
                                    layout.add_merge(range);
                                }
                            }
                        }
                    }
                    b"sheetFormatPr" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"defaultRowHeight" {
                                layout.default_row_height = parse_num(&attr.value);
                            }
                        }
                    }
                    b"tabColor" => {
                        layout.properties.tab_color = parse_color_attrs(&collect_attrs(e));
                    }
                    b"pageSetUpPr" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"fitToPage" {
                                layout.properties.fit_to_page = parse_flag(&attr.value);
                            }
                        }
                    }
                    b"printOptions" => {
                        let options = &mut layout.print_options;
                        for attr in e.attributes().flatten() {
                            let flag = parse_flag(&attr.value);
                            match attr.key.as_ref() {
                                b"horizontalCentered" => options.horizontal_centered = flag,
                                b"verticalCentered" => options.vertical_centered = flag,
                                b"gridLines" => options.grid_lines = flag,
                                b"headings" => options.headings = flag,
                                _ => {}
                            }
                        }
                    }
                    b"pageMargins" => layout.margins = Some(parse_margins(e)),
                    b"pageSetup" => parse_page_setup(e, layout),
                    b"headerFooter" => saw_header_footer = true,
                    b"oddHeader" => {
                        text_target = Some(TextTarget::Header);
                        text.clear();
                    }
                    b"oddFooter" => {
                        text_target = Some(TextTarget::Footer);
                        text.clear();
                    }
                    b"drawing" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.local_name().as_ref() == b"id" {
                                out.drawing_rel = Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) if text_target.is_some() => {
                text.push_str(&unescape_xml(&String::from_utf8_lossy(e.as_ref())));
            }
            Ok(Event::GeneralRef(ref e)) if text_target.is_some() => {
                if let Some(ch) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    text.push(ch);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"oddHeader" | b"oddFooter" => {
                    let value = (!text.is_empty()).then(|| std::mem::take(&mut text));
                    match text_target.take() {
                        Some(TextTarget::Header) => header_footer.header = value,
                        Some(TextTarget::Footer) => header_footer.footer = value,
                        None => {}
                    }
                }
                b"row" => current_row = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    if saw_header_footer && !header_footer.is_empty() {
        out.layout.header_footer = Some(header_footer);
    }
    out
}

fn parse_margins(e: &BytesStart) -> PageMargins {
    let mut margins = PageMargins::default();
    for attr in e.attributes().flatten() {
        let Some(value) = parse_num::<f64>(&attr.value) else {
            continue;
        };
        match attr.key.as_ref() {
            b"left" => margins.left = value,
            b"right" => margins.right = value,
            b"top" => margins.top = value,
            b"bottom" => margins.bottom = value,
            b"header" => margins.header = value,
            b"footer" => margins.footer = value,
            _ => {}
        }
    }
    margins
}

fn parse_page_setup(e: &BytesStart, layout: &mut WorksheetLayout) {
    let setup = &mut layout.page_setup;
    let mut first_page: Option<u16> = None;
    let mut use_first_page = false;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"orientation" => {
                setup.orientation = if attr.value.as_ref() == b"landscape" {
                    Orientation::Landscape
                } else {
                    Orientation::Portrait
                };
            }
            b"paperSize" => setup.paper_size = parse_num(&attr.value),
            b"scale" => setup.scale = parse_num(&attr.value),
            b"fitToWidth" => setup.fit_to_width = parse_num(&attr.value),
            b"fitToHeight" => setup.fit_to_height = parse_num(&attr.value),
            b"firstPageNumber" => first_page = parse_num(&attr.value),
            b"useFirstPageNumber" => use_first_page = parse_flag(&attr.value),
            b"pageOrder" => setup.over_then_down = attr.value.as_ref() == b"overThenDown",
            _ => {}
        }
    }
    if use_first_page {
        setup.first_page_number = first_page;
    }
}

// =============================================================================
// Drawing XML parser
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum AnchorField {
    Col,
    ColOff,
    Row,
    RowOff,
}

/// Parse a drawing part (`xl/drawings/drawingN.xml`) into its pictures.
///
/// Shapes and charts have no embedded image and are skipped, as are
/// absolute anchors which carry no cell position.
pub fn parse_drawing_xml(xml: &str) -> Vec<DrawingPicture> {
    let mut pictures = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut in_anchor = false;
    let mut in_from = false;
    let mut field: Option<AnchorField> = None;

    let mut anchor = ImageAnchor::default();
    let mut size: Option<(f64, f64)> = None;
    let mut embed: Option<String> = None;
    let mut description: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    in_anchor = true;
                    anchor = ImageAnchor::default();
                    size = None;
                    embed = None;
                    description = None;
                }
                b"from" if in_anchor => in_from = true,
                b"col" if in_from => field = Some(AnchorField::Col),
                b"colOff" if in_from => field = Some(AnchorField::ColOff),
                b"row" if in_from => field = Some(AnchorField::Row),
                b"rowOff" if in_from => field = Some(AnchorField::RowOff),
                b"ext" if in_anchor && size.is_none() => {
                    let mut cx: Option<f64> = None;
                    let mut cy: Option<f64> = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"cx" => cx = parse_num(&attr.value),
                            b"cy" => cy = parse_num(&attr.value),
                            _ => {}
                        }
                    }
                    if let (Some(cx), Some(cy)) = (cx, cy) {
                        size = Some((cx / EMU_PER_PIXEL, cy / EMU_PER_PIXEL));
                    }
                }
                b"cNvPr" if in_anchor => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"descr" {
                            let text = unescape_xml(&String::from_utf8_lossy(&attr.value));
                            description = (!text.is_empty()).then_some(text);
                        }
                    }
                }
                b"blip" if in_anchor => {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"embed" {
                            embed = Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if field.is_some() => {
                let value = parse_num::<i64>(e.as_ref()).unwrap_or(0).max(0);
                match field {
                    Some(AnchorField::Col) => anchor.cell.col = value.min(u16::MAX as i64) as u16,
                    Some(AnchorField::Row) => anchor.cell.row = value.min(u32::MAX as i64) as u32,
                    Some(AnchorField::ColOff) => anchor.x_offset = (value as f64 / EMU_PER_PIXEL).round() as u32,
                    Some(AnchorField::RowOff) => anchor.y_offset = (value as f64 / EMU_PER_PIXEL).round() as u32,
                    None => {}
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"col" | b"colOff" | b"row" | b"rowOff" => field = None,
                b"from" => in_from = false,
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    if let Some(embed) = embed.take() {
                        pictures.push(DrawingPicture {
                            anchor,
                            width_px: size.map(|(w, _)| w),
                            height_px: size.map(|(_, h)| h),
                            embed,
                            description: description.take(),
                        });
                    }
                    in_anchor = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    pictures
}

// =============================================================================
// Package relationships
// =============================================================================

/// Parse a `.rels` part into Id → Target.
pub fn parse_relationships(xml: &str) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => {
                            target = Some(unescape_xml(&String::from_utf8_lossy(&attr.value)));
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rels.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    rels
}

/// (sheet name, relationship id) pairs from workbook.xml, in tab order.
pub fn parse_workbook_sheets(xml: &str) -> Vec<(String, String)> {
    let mut sheets = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rid = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => name = Some(unescape_xml(&String::from_utf8_lossy(&attr.value))),
                        b"r:id" => rid = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }
                if let (Some(name), Some(rid)) = (name, rid) {
                    sheets.push((name, rid));
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    sheets
}

/// Path of the `.rels` part belonging to `part`, e.g.
/// `xl/worksheets/sheet1.xml` → `xl/worksheets/_rels/sheet1.xml.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the part that owns the rels.
pub fn resolve_part_path(base_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match base_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsheet_engine::cell::RgbColor;

    const SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
           xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheetPr><tabColor rgb="FF00B050"/><pageSetUpPr fitToPage="1"/></sheetPr>
  <dimension ref="A1:N30"/>
  <sheetFormatPr defaultRowHeight="15.75"/>
  <cols>
    <col min="1" max="1" width="4.5703125" customWidth="1"/>
    <col min="2" max="4" width="12.7109375" customWidth="1"/>
    <col min="5" max="5" width="9.140625"/>
  </cols>
  <sheetData>
    <row r="1" spans="1:14" ht="30" customHeight="1">
      <c r="A1" s="3" t="s"><v>0</v></c>
    </row>
    <row r="2" ht="15"><c r="A2" s="0"/><c r="B2" s="5"/><c s="6"/></row>
    <row r="21"><c r="B21" s="7" t="s"><v>1</v></c></row>
  </sheetData>
  <mergeCells count="2"><mergeCell ref="A1:N2"/><mergeCell ref="B21:B22"/></mergeCells>
  <printOptions horizontalCentered="1" gridLines="0"/>
  <pageMargins left="0.5" right="0.45" top="0.75" bottom="0.6" header="0.3" footer="0.2"/>
  <pageSetup paperSize="9" scale="85" fitToWidth="1" fitToHeight="0" orientation="landscape" firstPageNumber="3" useFirstPageNumber="1" r:id="rId1"/>
  <headerFooter><oddHeader>&amp;CLaboratorium &amp;&amp; Beton</oddHeader><oddFooter>&amp;RHal &amp;P</oddFooter></headerFooter>
  <drawing r:id="rId2"/>
</worksheet>"#;

    #[test]
    fn test_parse_sheet_formatting_cells() {
        let f = parse_sheet_formatting(SHEET_XML);
        assert_eq!(
            f.cell_styles,
            vec![
                (CellRef::new(0, 0), 3),
                (CellRef::new(1, 1), 5),
                // No r="" attribute: follows B2
                (CellRef::new(1, 2), 6),
                (CellRef::new(20, 1), 7),
            ]
        );
        assert_eq!(f.drawing_rel.as_deref(), Some("rId2"));
    }

    #[test]
    fn test_parse_sheet_formatting_sizes() {
        let layout = parse_sheet_formatting(SHEET_XML).layout;

        // Only customWidth columns are explicit
        assert_eq!(layout.column_widths.len(), 4);
        assert_eq!(layout.column_widths.get(&0), Some(&4.5703125));
        assert_eq!(layout.column_widths.get(&3), Some(&12.7109375));
        assert!(!layout.column_widths.contains_key(&4));

        // Only customHeight rows are explicit
        assert_eq!(layout.row_heights.len(), 1);
        assert_eq!(layout.row_heights.get(&0), Some(&30.0));
        assert_eq!(layout.default_row_height, Some(15.75));

        assert_eq!(
            layout.merged_ranges,
            vec![
                MergedRange::from_a1("A1:N2").unwrap(),
                MergedRange::from_a1("B21:B22").unwrap()
            ]
        );
    }

    #[test]
    fn test_parse_sheet_formatting_page() {
        let layout = parse_sheet_formatting(SHEET_XML).layout;

        assert_eq!(layout.properties.tab_color, Some(RgbColor(0x00B050)));
        assert!(layout.properties.fit_to_page);

        assert!(layout.print_options.horizontal_centered);
        assert!(!layout.print_options.grid_lines);
        assert!(!layout.print_options.vertical_centered);

        let margins = layout.margins.unwrap();
        assert_eq!(margins.left, 0.5);
        assert_eq!(margins.right, 0.45);
        assert_eq!(margins.bottom, 0.6);
        assert_eq!(margins.footer, 0.2);

        let setup = &layout.page_setup;
        assert_eq!(setup.orientation, Orientation::Landscape);
        assert_eq!(setup.paper_size, Some(9));
        assert_eq!(setup.scale, Some(85));
        assert_eq!(setup.fit_to_width, Some(1));
        assert_eq!(setup.fit_to_height, Some(0));
        assert_eq!(setup.first_page_number, Some(3));
        assert!(!setup.over_then_down);

        let hf = layout.header_footer.unwrap();
        assert_eq!(hf.header.as_deref(), Some("&CLaboratorium && Beton"));
        assert_eq!(hf.footer.as_deref(), Some("&RHal &P"));
    }

    #[test]
    fn test_minimal_sheet_has_no_layout_overrides() {
        let f = parse_sheet_formatting(
            r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData></worksheet>"#,
        );
        assert!(f.cell_styles.is_empty());
        assert!(f.drawing_rel.is_none());
        assert!(f.layout.margins.is_none());
        assert!(f.layout.header_footer.is_none());
        assert!(f.layout.column_widths.is_empty());
        assert_eq!(f.layout.page_setup.first_page_number, None);
    }

    #[test]
    fn test_parse_drawing_xml() {
        let xml = r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing"
                              xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
                              xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <xdr:twoCellAnchor editAs="oneCell">
    <xdr:from><xdr:col>1</xdr:col><xdr:colOff>38100</xdr:colOff><xdr:row>2</xdr:row><xdr:rowOff>19050</xdr:rowOff></xdr:from>
    <xdr:to><xdr:col>3</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>6</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>
    <xdr:pic>
      <xdr:nvPicPr><xdr:cNvPr id="2" name="Picture 1" descr="logo &amp; seal"/><xdr:cNvPicPr/></xdr:nvPicPr>
      <xdr:blipFill><a:blip r:embed="rId1"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>
      <xdr:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="609600" cy="304800"/></a:xfrm></xdr:spPr>
    </xdr:pic>
    <xdr:clientData/>
  </xdr:twoCellAnchor>
  <xdr:twoCellAnchor>
    <xdr:from><xdr:col>5</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>0</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
    <xdr:sp><xdr:nvSpPr><xdr:cNvPr id="3" name="Shape"/></xdr:nvSpPr></xdr:sp>
  </xdr:twoCellAnchor>
  <xdr:oneCellAnchor>
    <xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>10</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
    <xdr:ext cx="95250" cy="190500"/>
    <xdr:pic><xdr:nvPicPr><xdr:cNvPr id="4" name="Picture 2" descr=""/></xdr:nvPicPr>
      <xdr:blipFill><a:blip r:embed="rId2"/></xdr:blipFill></xdr:pic>
  </xdr:oneCellAnchor>
</xdr:wsDr>"#;

        let pictures = parse_drawing_xml(xml);
        assert_eq!(pictures.len(), 2);

        let logo = &pictures[0];
        assert_eq!(logo.anchor.cell, CellRef::new(2, 1));
        assert_eq!(logo.anchor.x_offset, 4);
        assert_eq!(logo.anchor.y_offset, 2);
        assert_eq!(logo.width_px, Some(64.0));
        assert_eq!(logo.height_px, Some(32.0));
        assert_eq!(logo.embed, "rId1");
        assert_eq!(logo.description.as_deref(), Some("logo & seal"));

        let second = &pictures[1];
        assert_eq!(second.anchor.cell, CellRef::new(10, 0));
        assert_eq!(second.width_px, Some(10.0));
        assert_eq!(second.height_px, Some(20.0));
        assert_eq!(second.description, None);
    }

    #[test]
    fn test_relationships_and_paths() {
        let rels = parse_relationships(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type=".../worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type=".../drawing" Target="../drawings/drawing1.xml"/>
</Relationships>"#,
        );
        assert_eq!(rels.get("rId1").map(String::as_str), Some("worksheets/sheet1.xml"));

        assert_eq!(resolve_part_path("xl/workbook.xml", "worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(
            resolve_part_path("xl/worksheets/sheet1.xml", "../drawings/drawing1.xml"),
            "xl/drawings/drawing1.xml"
        );
        assert_eq!(resolve_part_path("xl/workbook.xml", "/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(rels_path_for("xl/worksheets/sheet1.xml"), "xl/worksheets/_rels/sheet1.xml.rels");
        assert_eq!(rels_path_for("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
    }

    #[test]
    fn test_parse_workbook_sheets() {
        let sheets = parse_workbook_sheets(
            r#"<workbook><sheets>
  <sheet name="05-03-2024" sheetId="1" r:id="rId1"/>
  <sheet name="Q&amp;A" sheetId="2" r:id="rId2"/>
</sheets></workbook>"#,
        );
        assert_eq!(
            sheets,
            vec![
                ("05-03-2024".to_string(), "rId1".to_string()),
                ("Q&A".to_string(), "rId2".to_string())
            ]
        );
    }
}
