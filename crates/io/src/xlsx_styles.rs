//! XLSX style parser: resolves the `cellXfs` table of `xl/styles.xml` into
//! [`CellStyle`] values, one per style index.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use labsheet_engine::cell::{
    AlignmentStyle, BorderLine, BorderSide, BorderStyle, CellStyle, DiagonalDirection, FillStyle,
    FontStyle, HorizontalAlign, PatternKind, RgbColor, Underline, VerticalAlign,
};

// =============================================================================
// Public types
// =============================================================================

/// Parsed style table from styles.xml: cellXfs index → CellStyle.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    pub styles: Vec<CellStyle>,
}

impl StyleTable {
    pub fn get(&self, id: usize) -> Option<&CellStyle> {
        self.styles.get(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

// =============================================================================
// XML helpers shared with the worksheet parser
// =============================================================================

/// Unescape the 5 predefined XML entities: &amp; &lt; &gt; &quot; &apos;
pub(crate) fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Character for an entity reference reported outside attribute values.
pub(crate) fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let n = match code.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(n)
        }
    }
}

/// Collect XML attributes into a Vec of (key, value) pairs.
pub(crate) fn collect_attrs(e: &BytesStart) -> Vec<(Vec<u8>, Vec<u8>)> {
    e.attributes()
        .flatten()
        .map(|a| (a.key.as_ref().to_vec(), a.value.to_vec()))
        .collect()
}

pub(crate) fn parse_num<T: std::str::FromStr>(value: &[u8]) -> Option<T> {
    std::str::from_utf8(value).ok().and_then(|s| s.trim().parse().ok())
}

pub(crate) fn parse_flag(value: &[u8]) -> bool {
    value == b"1" || value == b"true"
}

// Built-in number format mapping
// =============================================================================

/// Format code for a built-in numFmtId. Ids without a fixed code map to None.
fn builtin_number_format(id: u16) -> Option<&'static str> {
    let code = match id {
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mm:ss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

// =============================================================================
// Indexed color palette (standard 64 Excel colors)
// =============================================================================

/// Standard Excel indexed color palette.
/// Index 0-7 are the primary colors, 8-63 are extended.
fn indexed_color(idx: u8) -> Option<RgbColor> {
    let rgb: [u8; 3] = match idx {
        0 => [0, 0, 0],       // Black
        1 => [255, 255, 255], // White
        2 => [255, 0, 0],     // Red
        3 => [0, 255, 0],     // Green
        4 => [0, 0, 255],     // Blue
        5 => [255, 255, 0],   // Yellow
        6 => [255, 0, 255],   // Magenta
        7 => [0, 255, 255],   // Cyan
        8 => [0, 0, 0],       // Black (duplicate)
        9 => [255, 255, 255], // White (duplicate)
        10 => [255, 0, 0],
        11 => [0, 255, 0],
        12 => [0, 0, 255],
        13 => [255, 255, 0],
        14 => [255, 0, 255],
        15 => [0, 255, 255],
        16 => [128, 0, 0],     // Dark Red
        17 => [0, 128, 0],     // Dark Green
        18 => [0, 0, 128],     // Dark Blue
        19 => [128, 128, 0],   // Olive
        20 => [128, 0, 128],   // Purple
        21 => [0, 128, 128],   // Teal
        22 => [192, 192, 192], // Silver
        23 => [128, 128, 128], // Gray
        24 => [153, 153, 255],
        25 => [153, 51, 102],
        26 => [255, 255, 204],
        27 => [204, 255, 255],
        28 => [102, 0, 102],
        29 => [255, 128, 128],
        30 => [0, 102, 204],
        31 => [204, 204, 255],
        32 => [0, 0, 128],
        33 => [255, 0, 255],
        34 => [255, 255, 0],
        35 => [0, 255, 255],
        36 => [128, 0, 128],
        37 => [128, 0, 0],
        38 => [0, 128, 128],
        39 => [0, 0, 255],
        40 => [0, 204, 255],
        41 => [204, 255, 255],
        42 => [204, 255, 204],
        43 => [255, 255, 153],
        44 => [153, 204, 255],
        45 => [255, 153, 204],
        46 => [204, 153, 255],
        47 => [255, 204, 153],
        48 => [51, 102, 255],
        49 => [51, 204, 204],
        50 => [153, 204, 0],
        51 => [255, 204, 0],
        52 => [255, 153, 0],
        53 => [255, 102, 0],
        54 => [102, 102, 153],
        55 => [150, 150, 150],
        56 => [0, 51, 102],
        57 => [51, 153, 102],
        58 => [0, 51, 0],
        59 => [51, 51, 0],
        60 => [153, 51, 0],
        61 => [153, 51, 51],
        62 => [51, 51, 153],
        63 => [51, 51, 51],
        // 64 and 65 are the system foreground/background: automatic, not a color
        _ => return None,
    };
    Some(RgbColor::from_rgb(rgb[0], rgb[1], rgb[2]))
}

/// Base colors of Excel's default theme, before any tint.
/// theme="0" through theme="9".
fn theme_color_default(idx: u8) -> Option<RgbColor> {
    let rgb: [u8; 3] = match idx {
        0 => [255, 255, 255], // Background 1 (lt1)
        1 => [0, 0, 0],       // Text 1 (dk1)
        2 => [238, 236, 225], // Background 2 (lt2)
        3 => [31, 73, 125],   // Text 2 (dk2)
        4 => [79, 129, 189],  // Accent 1
        5 => [192, 80, 77],   // Accent 2
        6 => [155, 187, 89],  // Accent 3
        7 => [128, 100, 162], // Accent 4
        8 => [75, 172, 198],  // Accent 5
        9 => [247, 150, 70],  // Accent 6
        _ => return None,
    };
    Some(RgbColor::from_rgb(rgb[0], rgb[1], rgb[2]))
}

// =============================================================================
// Color parsing
// =============================================================================

/// Parse a color from XML attributes (rgb, indexed, or theme), with `tint`
/// applied. `auto="1"`, system indexes 64/65 and unknown indexes yield None.
pub(crate) fn parse_color_attrs(attrs: &[(Vec<u8>, Vec<u8>)]) -> Option<RgbColor> {
    let mut rgb_val: Option<&[u8]> = None;
    let mut indexed_val: Option<u8> = None;
    let mut theme_val: Option<u8> = None;
    let mut tint: f64 = 0.0;

    for (key, value) in attrs {
        match key.as_slice() {
            b"rgb" => rgb_val = Some(value),
            b"indexed" => indexed_val = parse_num(value),
            b"theme" => theme_val = parse_num(value),
            b"tint" => tint = parse_num(value).unwrap_or(0.0),
            _ => {}
        }
    }

    // Prefer rgb > indexed > theme
    let base = if let Some(hex) = rgb_val {
        std::str::from_utf8(hex).ok().and_then(RgbColor::from_hex)
    } else if let Some(idx) = indexed_val {
        indexed_color(idx)
    } else {
        theme_val.and_then(theme_color_default)
    }?;
    Some(apply_tint(base, tint))
}

/// Lighten (tint > 0) or darken (tint < 0) a color the way Excel does:
/// luminance moves in HSL space, hue and saturation stay.
fn apply_tint(color: RgbColor, tint: f64) -> RgbColor {
    if tint == 0.0 || !tint.is_finite() {
        return color;
    }
    let tint = tint.clamp(-1.0, 1.0);
    let channel = |shift: u32| ((color.0 >> shift) & 0xFF) as f64 / 255.0;
    let (h, s, l) = rgb_to_hsl(channel(16), channel(8), channel(0));
    let l = if tint < 0.0 {
        l * (1.0 + tint)
    } else {
        l * (1.0 - tint) + tint
    };
    let (r, g, b) = hsl_to_rgb(h, s, l.clamp(0.0, 1.0));
    let byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    RgbColor::from_rgb(byte(r), byte(g), byte(b))
}

fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;
    if delta == 0.0 {
        return (0.0, 0.0, l);
    }
    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };
    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |t: f64| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    (hue(h + 1.0 / 3.0), hue(h), hue(h - 1.0 / 3.0))
}

// =============================================================================
// styles.xml parser
// =============================================================================

/// Parse styles.xml content into a StyleTable.
pub fn parse_styles_xml(xml: &str) -> StyleTable {
    let custom_num_fmts = parse_num_fmts(xml);
    let fonts = parse_fonts(xml);
    let fills = parse_fills(xml);
    let borders = parse_borders(xml);

    let styles = parse_cell_xfs(xml, &custom_num_fmts, &fonts, &fills, &borders);
    log::debug!(
        "Parsed styles.xml: {} fonts, {} fills, {} borders, {} cell styles",
        fonts.len(),
        fills.len(),
        borders.len(),
        styles.len()
    );
    StyleTable { styles }
}

/// Parse <numFmts> section → HashMap<formatId, formatCode>
fn parse_num_fmts(xml: &str) -> HashMap<u16, String> {
    let mut map = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_num_fmts = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"numFmts" => {
                in_num_fmts = true;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"numFmts" => {
                break;
            }
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_num_fmts && e.name().as_ref() == b"numFmt" =>
            {
                let mut id: Option<u16> = None;
                let mut code: Option<String> = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"numFmtId" => id = parse_num(&attr.value),
                        b"formatCode" => {
                            // Must unescape XML entities: &quot; → " (e.g. "Rp"#,##0)
                            let raw = String::from_utf8_lossy(&attr.value).to_string();
                            code = Some(unescape_xml(&raw));
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(code)) = (id, code) {
                    map.insert(id, code);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    map
}

/// Apply one empty child of <font> (b, i, u, sz, ...) to the font being built.
fn apply_font_child(font: &mut FontStyle, e: &BytesStart) {
    let val = e
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"val")
        .map(|a| a.value.to_vec());
    // <b/> is on, <b val="0"/> is off
    let on = val.as_deref().map(|v| v != b"0" && v != b"false").unwrap_or(true);

    match e.name().as_ref() {
        b"b" => font.bold = on,
        b"i" => font.italic = on,
        b"strike" => font.strikethrough = on,
        b"u" => {
            font.underline = match val {
                Some(v) => Underline::from_xml(&String::from_utf8_lossy(&v)),
                None => Underline::Single,
            };
        }
        b"sz" => font.size = val.as_deref().and_then(parse_num),
        b"color" => font.color = parse_color_attrs(&collect_attrs(e)),
        b"name" | b"rFont" => {
            font.name = val.map(|v| unescape_xml(&String::from_utf8_lossy(&v)));
        }
        _ => {}
    }
}

/// Parse <fonts> section.
fn parse_fonts(xml: &str) -> Vec<FontStyle> {
    let mut fonts = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <fonts>, 2 = inside <font>

    let mut current_font = FontStyle::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"fonts" if depth == 0 => depth = 1,
                b"font" if depth == 1 => {
                    depth = 2;
                    current_font = FontStyle::default();
                }
                _ if depth == 2 => apply_font_child(&mut current_font, e),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                // <font/> with no children is still an entry
                b"font" if depth == 1 => fonts.push(FontStyle::default()),
                _ if depth == 2 => apply_font_child(&mut current_font, e),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"font" if depth == 2 => {
                    fonts.push(std::mem::take(&mut current_font));
                    depth = 1;
                }
                b"fonts" if depth == 1 => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    fonts
}

/// Parse <fills> section. Gradient fills come through as pattern `None`.
fn parse_fills(xml: &str) -> Vec<FillStyle> {
    let mut fills = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <fills>, 2 = inside <fill>
    let mut in_pattern_fill = false;
    let mut current_fill = FillStyle::default();

    fn pattern_of(e: &BytesStart) -> PatternKind {
        e.attributes()
            .flatten()
            .find(|a| a.key.as_ref() == b"patternType")
            .map(|a| PatternKind::from_xml(&String::from_utf8_lossy(&a.value)))
            .unwrap_or_default()
    }

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"fills" if depth == 0 => depth = 1,
                b"fill" if depth == 1 => {
                    depth = 2;
                    current_fill = FillStyle::default();
                }
                b"patternFill" if depth == 2 => {
                    in_pattern_fill = true;
                    current_fill.pattern = pattern_of(e);
                }
                b"fgColor" if in_pattern_fill => {
                    current_fill.start_color = parse_color_attrs(&collect_attrs(e));
                }
                b"bgColor" if in_pattern_fill => {
                    current_fill.end_color = parse_color_attrs(&collect_attrs(e));
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"patternFill" if depth == 2 => {
                    // Self-closing <patternFill patternType="none"/>
                    current_fill.pattern = pattern_of(e);
                }
                b"fgColor" if in_pattern_fill => {
                    current_fill.start_color = parse_color_attrs(&collect_attrs(e));
                }
                b"bgColor" if in_pattern_fill => {
                    current_fill.end_color = parse_color_attrs(&collect_attrs(e));
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"patternFill" => in_pattern_fill = false,
                b"fill" if depth == 2 => {
                    fills.push(current_fill.clone());
                    depth = 1;
                    in_pattern_fill = false;
                }
                b"fills" if depth == 1 => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    fills
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
    Diagonal,
}

impl Side {
    fn from_tag(tag: &[u8]) -> Option<Side> {
        match tag {
            b"left" | b"start" => Some(Side::Left),
            b"right" | b"end" => Some(Side::Right),
            b"top" => Some(Side::Top),
            b"bottom" => Some(Side::Bottom),
            b"diagonal" => Some(Side::Diagonal),
            _ => None,
        }
    }

    fn slot(self, border: &mut BorderStyle) -> &mut BorderSide {
        match self {
            Side::Left => &mut border.left,
            Side::Right => &mut border.right,
            Side::Top => &mut border.top,
            Side::Bottom => &mut border.bottom,
            Side::Diagonal => &mut border.diagonal,
        }
    }
}

fn side_line(e: &BytesStart) -> BorderLine {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"style")
        .map(|a| BorderLine::from_xml(&String::from_utf8_lossy(&a.value)))
        .unwrap_or_default()
}

fn border_direction(e: &BytesStart) -> Option<DiagonalDirection> {
    let (mut up, mut down) = (false, false);
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"diagonalUp" => up = parse_flag(&attr.value),
            b"diagonalDown" => down = parse_flag(&attr.value),
            _ => {}
        }
    }
    DiagonalDirection::from_flags(up, down)
}

/// Parse <borders> section.
fn parse_borders(xml: &str) -> Vec<BorderStyle> {
    let mut borders = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <borders>, 2 = inside <border>
    let mut current_side: Option<Side> = None;
    let mut current_border = BorderStyle::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"borders" if depth == 0 => depth = 1,
                    b"border" if depth == 1 => {
                        depth = 2;
                        current_border = BorderStyle {
                            diagonal_direction: border_direction(e),
                            ..Default::default()
                        };
                    }
                    b"color" if current_side.is_some() => {
                        if let Some(side) = current_side {
                            side.slot(&mut current_border).color =
                                parse_color_attrs(&collect_attrs(e));
                        }
                    }
                    tag if depth == 2 => {
                        if let Some(side) = Side::from_tag(tag) {
                            side.slot(&mut current_border).line = side_line(e);
                            current_side = Some(side);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"border" if depth == 1 => borders.push(BorderStyle {
                        diagonal_direction: border_direction(e),
                        ..Default::default()
                    }),
                    b"color" if current_side.is_some() => {
                        if let Some(side) = current_side {
                            side.slot(&mut current_border).color =
                                parse_color_attrs(&collect_attrs(e));
                        }
                    }
                    tag if depth == 2 => {
                        // Self-closing side, usually <left/> with no style
                        if let Some(side) = Side::from_tag(tag) {
                            side.slot(&mut current_border).line = side_line(e);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"border" if depth == 2 => {
                        borders.push(current_border.clone());
                        depth = 1;
                        current_side = None;
                    }
                    b"borders" if depth == 1 => break,
                    tag if Side::from_tag(tag).is_some() => current_side = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    borders
}

/// Excel stores downward rotation as 91..=180 and stacked text as 255.
fn rotation_from_xml(v: i16) -> i16 {
    match v {
        91..=180 => -(v - 90),
        255 => 270,
        other => other,
    }
}

#[derive(Debug, Default)]
struct XfEntry {
    num_fmt_id: Option<u16>,
    font_id: Option<usize>,
    fill_id: Option<usize>,
    border_id: Option<usize>,
    alignment: Option<AlignmentStyle>,
}

impl XfEntry {
    fn from_attrs(e: &BytesStart) -> Self {
        let mut xf = XfEntry::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"numFmtId" => xf.num_fmt_id = parse_num(&attr.value),
                b"fontId" => xf.font_id = parse_num(&attr.value),
                b"fillId" => xf.fill_id = parse_num(&attr.value),
                b"borderId" => xf.border_id = parse_num(&attr.value),
                _ => {}
            }
        }
        xf
    }
}

fn parse_alignment(e: &BytesStart) -> AlignmentStyle {
    let mut alignment = AlignmentStyle::default();
    for attr in e.attributes().flatten() {
        let text = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"horizontal" => alignment.horizontal = HorizontalAlign::from_xml(&text),
            b"vertical" => alignment.vertical = VerticalAlign::from_xml(&text),
            b"wrapText" => alignment.wrap_text = parse_flag(&attr.value),
            b"shrinkToFit" => alignment.shrink_to_fit = parse_flag(&attr.value),
            b"textRotation" => {
                alignment.rotation = parse_num(&attr.value).map(rotation_from_xml).unwrap_or(0);
            }
            _ => {}
        }
    }
    alignment
}

/// Parse <cellXfs> section and resolve each <xf> into a CellStyle.
fn parse_cell_xfs(
    xml: &str,
    custom_num_fmts: &HashMap<u16, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
    borders: &[BorderStyle],
) -> Vec<CellStyle> {
    let mut styles = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;
    let mut in_xf = false;
    let mut current_xf = XfEntry::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    in_xf = true;
                    current_xf = XfEntry::from_attrs(e);
                }
                b"alignment" if in_xf => current_xf.alignment = Some(parse_alignment(e)),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"xf" if in_cell_xfs => {
                    // Self-closing <xf .../>: parse and push immediately
                    let xf = XfEntry::from_attrs(e);
                    styles.push(resolve_xf(&xf, custom_num_fmts, fonts, fills, borders));
                }
                b"alignment" if in_xf => current_xf.alignment = Some(parse_alignment(e)),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"xf" if in_xf => {
                    styles.push(resolve_xf(&current_xf, custom_num_fmts, fonts, fills, borders));
                    in_xf = false;
                }
                b"cellXfs" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    styles
}

/// Resolve an XfEntry into a CellStyle using the parsed component tables.
///
/// Sub-records are only populated when the xf actually defines them: fill ids
/// 0 and 1 are the reserved defaults, border entries with no lines are
/// skipped, and alignment needs an explicit <alignment> child.
fn resolve_xf(
    xf: &XfEntry,
    custom_num_fmts: &HashMap<u16, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
    borders: &[BorderStyle],
) -> CellStyle {
    let font = xf.font_id.and_then(|id| fonts.get(id)).cloned();

    let fill = xf
        .fill_id
        .filter(|id| *id >= 2)
        .and_then(|id| fills.get(id))
        .filter(|f| f.pattern != PatternKind::None)
        .cloned();

    let border = xf
        .border_id
        .and_then(|id| borders.get(id))
        .filter(|b| !b.is_empty())
        .cloned();

    let number_format = xf.num_fmt_id.filter(|id| *id != 0).and_then(|id| {
        custom_num_fmts
            .get(&id)
            .cloned()
            .or_else(|| builtin_number_format(id).map(str::to_string))
    });

    CellStyle {
        font,
        alignment: xf.alignment.clone(),
        fill,
        border,
        number_format,
    }
}

// =============================================================================
// Tests
// =============================================================================
