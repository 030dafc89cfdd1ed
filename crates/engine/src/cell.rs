use std::fmt;

/// RGB color packed as 0xRRGGBB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor(pub u32);

impl RgbColor {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Parse "AARRGGBB" or "RRGGBB" (optionally prefixed with '#'). Alpha is dropped.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let s = hex.trim().trim_start_matches('#');
        let rgb = match s.len() {
            8 => s.get(2..)?,
            6 => s,
            _ => return None,
        };
        u32::from_str_radix(rgb, 16).ok().map(Self)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Font underline variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

impl Underline {
    pub fn from_xml(val: &str) -> Self {
        match val {
            "double" => Underline::Double,
            "singleAccounting" => Underline::SingleAccounting,
            "doubleAccounting" => Underline::DoubleAccounting,
            "none" => Underline::None,
            // <u/> without a val means single
            _ => Underline::Single,
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalAlign {
    #[default]
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HorizontalAlign {
    pub fn from_xml(val: &str) -> Self {
        match val {
            "left" => HorizontalAlign::Left,
            "center" => HorizontalAlign::Center,
            "right" => HorizontalAlign::Right,
            "fill" => HorizontalAlign::Fill,
            "justify" => HorizontalAlign::Justify,
            "centerContinuous" => HorizontalAlign::CenterContinuous,
            "distributed" => HorizontalAlign::Distributed,
            _ => HorizontalAlign::General,
        }
    }
}

/// Vertical text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Center,
    #[default]
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlign {
    pub fn from_xml(val: &str) -> Self {
        match val {
            "top" => VerticalAlign::Top,
            "center" => VerticalAlign::Center,
            "justify" => VerticalAlign::Justify,
            "distributed" => VerticalAlign::Distributed,
            _ => VerticalAlign::Bottom,
        }
    }
}

/// Fill pattern, named after the xlsx `patternType` values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternKind {
    #[default]
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

impl PatternKind {
    pub fn from_xml(val: &str) -> Self {
        match val {
            "solid" => PatternKind::Solid,
            "mediumGray" => PatternKind::MediumGray,
            "darkGray" => PatternKind::DarkGray,
            "lightGray" => PatternKind::LightGray,
            "darkHorizontal" => PatternKind::DarkHorizontal,
            "darkVertical" => PatternKind::DarkVertical,
            "darkDown" => PatternKind::DarkDown,
            "darkUp" => PatternKind::DarkUp,
            "darkGrid" => PatternKind::DarkGrid,
            "darkTrellis" => PatternKind::DarkTrellis,
            "lightHorizontal" => PatternKind::LightHorizontal,
            "lightVertical" => PatternKind::LightVertical,
            "lightDown" => PatternKind::LightDown,
            "lightUp" => PatternKind::LightUp,
            "lightGrid" => PatternKind::LightGrid,
            "lightTrellis" => PatternKind::LightTrellis,
            "gray125" => PatternKind::Gray125,
            "gray0625" => PatternKind::Gray0625,
            _ => PatternKind::None,
        }
    }
}

/// Border line style, named after the xlsx `style` values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BorderLine {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderLine {
    pub fn from_xml(val: &str) -> Self {
        match val {
            "thin" => BorderLine::Thin,
            "medium" => BorderLine::Medium,
            "dashed" => BorderLine::Dashed,
            "dotted" => BorderLine::Dotted,
            "thick" => BorderLine::Thick,
            "double" => BorderLine::Double,
            "hair" => BorderLine::Hair,
            "mediumDashed" => BorderLine::MediumDashed,
            "dashDot" => BorderLine::DashDot,
            "mediumDashDot" => BorderLine::MediumDashDot,
            "dashDotDot" => BorderLine::DashDotDot,
            "mediumDashDotDot" => BorderLine::MediumDashDotDot,
            "slantDashDot" => BorderLine::SlantDashDot,
            _ => BorderLine::None,
        }
    }
}

/// Which diagonal(s) a border draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagonalDirection {
    Up,
    Down,
    Both,
}

impl DiagonalDirection {
    pub fn from_flags(up: bool, down: bool) -> Option<Self> {
        match (up, down) {
            (true, true) => Some(DiagonalDirection::Both),
            (true, false) => Some(DiagonalDirection::Up),
            (false, true) => Some(DiagonalDirection::Down),
            (false, false) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontStyle {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strikethrough: bool,
    pub color: Option<RgbColor>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentStyle {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
    pub wrap_text: bool,
    pub shrink_to_fit: bool,
    /// Degrees, -90..=90, or 270 for stacked text
    pub rotation: i16,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillStyle {
    pub pattern: PatternKind,
    /// Pattern foreground (`fgColor`); the visible color of a solid fill
    pub start_color: Option<RgbColor>,
    /// Pattern background (`bgColor`)
    pub end_color: Option<RgbColor>,
}

impl FillStyle {
    pub fn solid(color: RgbColor) -> Self {
        Self {
            pattern: PatternKind::Solid,
            start_color: Some(color),
            end_color: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BorderSide {
    pub line: BorderLine,
    pub color: Option<RgbColor>,
}

impl BorderSide {
    pub fn thin() -> Self {
        Self {
            line: BorderLine::Thin,
            color: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.line == BorderLine::None
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorderStyle {
    pub left: BorderSide,
    pub right: BorderSide,
    pub top: BorderSide,
    pub bottom: BorderSide,
    pub diagonal: BorderSide,
    pub diagonal_direction: Option<DiagonalDirection>,
}

impl BorderStyle {
    /// Thin border on all four sides.
    pub fn box_thin() -> Self {
        Self {
            left: BorderSide::thin(),
            right: BorderSide::thin(),
            top: BorderSide::thin(),
            bottom: BorderSide::thin(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none()
            && self.right.is_none()
            && self.top.is_none()
            && self.bottom.is_none()
            && self.diagonal.is_none()
    }
}

/// Visual attributes of one cell.
///
/// Every sub-record is optional: `None` means "inherit the default", never an
/// error. Values are owned, so a copied style never aliases its source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub font: Option<FontStyle>,
    pub alignment: Option<AlignmentStyle>,
    pub fill: Option<FillStyle>,
    pub border: Option<BorderStyle>,
    /// Excel format code, e.g. "0.00"
    pub number_format: Option<String>,
}

impl CellStyle {
    pub fn is_empty(&self) -> bool {
        self.font.is_none()
            && self.alignment.is_none()
            && self.fill.is_none()
            && self.border.is_none()
            && self.number_format.is_none()
    }

    /// Copy every sub-record present on `self` onto `target`.
    ///
    /// Sub-records absent here leave the target's value untouched.
    pub fn copy_onto(&self, target: &mut CellStyle) {
        if let Some(font) = &self.font {
            target.font = Some(FontStyle {
                name: font.name.clone(),
                size: font.size,
                bold: font.bold,
                italic: font.italic,
                underline: font.underline,
                strikethrough: font.strikethrough,
                color: font.color,
            });
        }
        if let Some(alignment) = &self.alignment {
            target.alignment = Some(AlignmentStyle {
                horizontal: alignment.horizontal,
                vertical: alignment.vertical,
                wrap_text: alignment.wrap_text,
                shrink_to_fit: alignment.shrink_to_fit,
                rotation: alignment.rotation,
            });
        }
        if let Some(fill) = &self.fill {
            target.fill = Some(FillStyle {
                pattern: fill.pattern,
                start_color: fill.start_color,
                end_color: fill.end_color,
            });
        }
        if let Some(border) = &self.border {
            target.border = Some(BorderStyle {
                left: border.left,
                right: border.right,
                top: border.top,
                bottom: border.bottom,
                diagonal: border.diagonal,
                diagonal_direction: border.diagonal_direction,
            });
        }
        if let Some(code) = &self.number_format {
            target.number_format = Some(code.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Formula source including the leading '='
    Formula(String),
}

impl CellValue {
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if trimmed.starts_with('=') {
            return CellValue::Formula(trimmed.to_string());
        }

        if let Ok(num) = trimmed.parse::<f64>() {
            if num.is_finite() {
                return CellValue::Number(num);
            }
        }

        CellValue::Text(trimmed.to_string())
    }

    pub fn formula(source: impl Into<String>) -> Self {
        let source = source.into();
        if source.starts_with('=') {
            CellValue::Formula(source)
        } else {
            CellValue::Formula(format!("={source}"))
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::Formula(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}
