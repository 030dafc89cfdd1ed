//! Header and data-row assembly on a template-shaped sheet.
//!
//! Coordinates here are a contract with the template asset: the header values
//! sit in column C of rows 12/14/15/17 and the data table starts at row 23.

use crate::cell::CellValue;
use crate::cell_id::CellRef;
use crate::record::{ReportHeader, SpecimenRecord, TestDate};
use crate::sheet::Sheet;

pub const PROJECT_CELL: CellRef = CellRef::new(11, 2); // C12
pub const CUSTOMER_CELL: CellRef = CellRef::new(13, 2); // C14
pub const LOCATION_CELL: CellRef = CellRef::new(14, 2); // C15
pub const DATE_CELL: CellRef = CellRef::new(16, 2); // C17

/// First data row (0-based), i.e. row 23 in the sheet.
pub const DATA_START_ROW: u32 = 22;

pub const COL_CODE: u16 = 1; // B
pub const COL_GRADE: u16 = 2; // C
pub const COL_AGE: u16 = 3; // D
pub const COL_POUR_DATE: u16 = 4; // E
pub const COL_KIND: u16 = 5; // F
pub const COL_SIZE: u16 = 6; // G
pub const COL_VOLUME: u16 = 7; // H
pub const COL_WEIGHT: u16 = 8; // I
pub const COL_DENSITY: u16 = 9; // J, formula
pub const COL_LOAD: u16 = 10; // K
pub const COL_STRENGTH: u16 = 11; // L, formula
pub const COL_STRENGTH_CONVERTED: u16 = 12; // M, formula
pub const COL_FRACTURE: u16 = 13; // N

/// Number format for the two strength columns.
pub const STRENGTH_FORMAT: &str = "0.00";

/// Load → strength factors used in column L.
pub const LOAD_FACTOR: f64 = 10.2;
pub const SPECIMEN_AREA: f64 = 176.71;

/// Strength conversion factors used in column M.
pub const CONVERSION_FACTOR: f64 = 10.2;
pub const SHAPE_FACTOR: f64 = 0.83;

fn header_text(value: &str) -> String {
    format!(": {value}")
}

/// Write the four header fields as `": value"` labels.
pub fn fill_header(sheet: &mut Sheet, header: &ReportHeader, date: TestDate) {
    sheet.set_value(PROJECT_CELL, header_text(&header.project));
    sheet.set_value(CUSTOMER_CELL, header_text(&header.customer));
    sheet.set_value(LOCATION_CELL, header_text(&header.location));
    sheet.set_value(DATE_CELL, header_text(&date.sheet_name()));
}

/// Weight / volume, 0 when the volume is 0. `row` is the 1-based sheet row.
pub fn density_formula(row: u32) -> String {
    let volume = format!("H{row}");
    let weight = format!("I{row}");
    format!("=IF({volume}=0,0,{weight}/{volume})")
}

/// Applied load converted to strength, 0 when the load is 0.
pub fn strength_formula(row: u32) -> String {
    let load = format!("K{row}");
    format!("=IF({load}=0,0,{load}*{LOAD_FACTOR}/{SPECIMEN_AREA})")
}

/// Column-L strength converted again, 0 when L is 0.
pub fn converted_strength_formula(row: u32) -> String {
    let strength = format!("L{row}");
    format!("=IF({strength}=0,0,{strength}*{CONVERSION_FACTOR}/{SHAPE_FACTOR})")
}

/// Write one row per record starting at `start_row` (0-based), in order.
///
/// Returns the number of rows written. An empty batch writes nothing.
pub fn fill_rows(sheet: &mut Sheet, start_row: u32, records: &[SpecimenRecord]) -> usize {
    for (i, record) in records.iter().enumerate() {
        let row = start_row + i as u32;
        let at = |col: u16| CellRef::new(row, col);
        let sheet_row = row + 1;

        sheet.set_value(at(COL_CODE), record.code.as_str());
        sheet.set_value(at(COL_GRADE), record.grade.as_str());
        sheet.set_value(at(COL_AGE), age_value(&record.age));
        sheet.set_value(at(COL_POUR_DATE), record.pour_date.as_str());
        sheet.set_value(at(COL_KIND), record.kind.as_str());
        sheet.set_value(at(COL_SIZE), record.size.as_str());
        sheet.set_value(at(COL_VOLUME), record.volume);
        sheet.set_value(at(COL_WEIGHT), record.weight);
        sheet.set_value(at(COL_LOAD), record.load);
        sheet.set_value(at(COL_FRACTURE), record.fracture_type.as_str());

        sheet.set_value(at(COL_DENSITY), CellValue::Formula(density_formula(sheet_row)));
        sheet.set_value(at(COL_STRENGTH), CellValue::Formula(strength_formula(sheet_row)));
        sheet.set_value(
            at(COL_STRENGTH_CONVERTED),
            CellValue::Formula(converted_strength_formula(sheet_row)),
        );
        sheet.set_number_format(at(COL_STRENGTH), STRENGTH_FORMAT);
        sheet.set_number_format(at(COL_STRENGTH_CONVERTED), STRENGTH_FORMAT);
    }
    records.len()
}

/// Ages are usually day counts; keep them numeric when they parse.
fn age_value(age: &str) -> CellValue {
    match CellValue::from_input(age) {
        CellValue::Formula(_) => CellValue::Text(age.trim().to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, volume: f64, weight: f64, load: f64) -> SpecimenRecord {
        SpecimenRecord {
            code: code.into(),
            grade: "K-300".into(),
            age: "28".into(),
            pour_date: "13-02-2024".into(),
            kind: "Silinder".into(),
            size: "15x30".into(),
            volume,
            weight,
            load,
            fracture_type: "Kerucut".into(),
        }
    }

    #[test]
    fn test_fill_header() {
        let mut sheet = Sheet::new("05-03-2024");
        let header = ReportHeader {
            project: "Gedung A".into(),
            customer: "PT Beton".into(),
            location: "Lab Utama".into(),
        };
        fill_header(&mut sheet, &header, TestDate::from_ymd(2024, 3, 5).unwrap());

        let text = |a1: &str| sheet.value(CellRef::from_a1(a1).unwrap()).clone();
        assert_eq!(text("C12"), CellValue::Text(": Gedung A".into()));
        assert_eq!(text("C14"), CellValue::Text(": PT Beton".into()));
        assert_eq!(text("C15"), CellValue::Text(": Lab Utama".into()));
        assert_eq!(text("C17"), CellValue::Text(": 05-03-2024".into()));
    }

    #[test]
    fn test_formula_text() {
        assert_eq!(density_formula(23), "=IF(H23=0,0,I23/H23)");
        assert_eq!(strength_formula(23), "=IF(K23=0,0,K23*10.2/176.71)");
        assert_eq!(converted_strength_formula(23), "=IF(L23=0,0,L23*10.2/0.83)");
    }

    #[test]
    fn test_fill_rows_layout() {
        let mut sheet = Sheet::new("12-03-2024");
        let written = fill_rows(&mut sheet, DATA_START_ROW, &[record("A-01", 10.0, 23.0, 450.0)]);
        assert_eq!(written, 1);

        let v = |a1: &str| sheet.value(CellRef::from_a1(a1).unwrap()).clone();
        assert_eq!(v("B23"), CellValue::Text("A-01".into()));
        assert_eq!(v("C23"), CellValue::Text("K-300".into()));
        assert_eq!(v("D23"), CellValue::Number(28.0));
        assert_eq!(v("E23"), CellValue::Text("13-02-2024".into()));
        assert_eq!(v("F23"), CellValue::Text("Silinder".into()));
        assert_eq!(v("G23"), CellValue::Text("15x30".into()));
        assert_eq!(v("H23"), CellValue::Number(10.0));
        assert_eq!(v("I23"), CellValue::Number(23.0));
        assert_eq!(v("J23"), CellValue::Formula("=IF(H23=0,0,I23/H23)".into()));
        assert_eq!(v("K23"), CellValue::Number(450.0));
        assert_eq!(v("L23"), CellValue::Formula("=IF(K23=0,0,K23*10.2/176.71)".into()));
        assert_eq!(v("M23"), CellValue::Formula("=IF(L23=0,0,L23*10.2/0.83)".into()));
        assert_eq!(v("N23"), CellValue::Text("Kerucut".into()));

        let format = |a1: &str| {
            sheet
                .style(CellRef::from_a1(a1).unwrap())
                .and_then(|s| s.number_format.clone())
        };
        assert_eq!(format("L23").as_deref(), Some("0.00"));
        assert_eq!(format("M23").as_deref(), Some("0.00"));
        assert_eq!(format("J23"), None);
    }

    #[test]
    fn test_rows_are_contiguous() {
        let mut sheet = Sheet::new("s");
        let records: Vec<_> = (0..5).map(|i| record(&format!("S-{i}"), 1.0, 2.0, 0.0)).collect();
        fill_rows(&mut sheet, DATA_START_ROW, &records);

        let rows: Vec<u32> = sheet.populated_rows().into_iter().collect();
        assert_eq!(rows, (22..27).collect::<Vec<_>>());

        for (i, r) in records.iter().enumerate() {
            let at = CellRef::new(DATA_START_ROW + i as u32, COL_CODE);
            assert_eq!(sheet.value(at), &CellValue::Text(r.code.clone()));
            let density = CellRef::new(DATA_START_ROW + i as u32, COL_DENSITY);
            let n = DATA_START_ROW + i as u32 + 1;
            assert_eq!(sheet.value(density), &CellValue::Formula(format!("=IF(H{n}=0,0,I{n}/H{n})")));
        }
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut sheet = Sheet::new("s");
        fill_header(&mut sheet, &ReportHeader::default(), TestDate::from_ymd(2024, 3, 5).unwrap());
        let before = sheet.clone();
        assert_eq!(fill_rows(&mut sheet, DATA_START_ROW, &[]), 0);
        assert_eq!(sheet, before);
        assert!(sheet.populated_rows().iter().all(|r| *r < DATA_START_ROW));
    }

    #[test]
    fn test_fill_rows_keeps_template_styles() {
        use crate::cell::BorderStyle;

        let mut sheet = Sheet::new("s");
        let at = CellRef::new(DATA_START_ROW, COL_VOLUME);
        sheet.style_mut(at).border = Some(BorderStyle::box_thin());
        fill_rows(&mut sheet, DATA_START_ROW, &[record("A", 3.0, 6.0, 0.0)]);
        assert_eq!(sheet.style(at).unwrap().border, Some(BorderStyle::box_thin()));
        assert_eq!(sheet.value(at), &CellValue::Number(3.0));
    }

    #[test]
    fn test_free_text_age() {
        assert_eq!(age_value("7"), CellValue::Number(7.0));
        assert_eq!(age_value("7 hari"), CellValue::Text("7 hari".into()));
        assert_eq!(age_value("=1+1"), CellValue::Text("=1+1".into()));
        assert_eq!(age_value(""), CellValue::Empty);
    }
}
