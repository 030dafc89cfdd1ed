//! Submitted data: specimen records, the batch envelope, and decoding of the
//! raw parallel-list form a request layer receives.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Calendar date of a test session. Drives both the sheet name and the
/// monthly file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestDate(NaiveDate);

impl TestDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse an ISO `YYYY-MM-DD` string.
    pub fn parse_iso(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ReportError::Validation(format!("cannot parse test date '{s}' (expected YYYY-MM-DD)")))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Sheet name, `DD-MM-YYYY`.
    pub fn sheet_name(&self) -> String {
        self.0.format("%d-%m-%Y").to_string()
    }

    /// Monthly workbook key, `YYYY-MM`.
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.0.year(), self.0.month())
    }
}

impl fmt::Display for TestDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// What a submission asks the report store to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportAction {
    /// Start (or replace) the monthly workbook with this date as its only sheet.
    CreateWorkbook,
    /// Add this date as a new sheet to the existing monthly workbook.
    AppendSheet,
}

impl FromStr for ReportAction {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "create_workbook" => Ok(Self::CreateWorkbook),
            "append_sheet" => Ok(Self::AppendSheet),
            "" => Err(ReportError::Validation("missing action".to_string())),
            other => Err(ReportError::Validation(format!(
                "unknown action '{other}' (expected create_workbook or append_sheet)"
            ))),
        }
    }
}

impl fmt::Display for ReportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateWorkbook => write!(f, "create_workbook"),
            Self::AppendSheet => write!(f, "append_sheet"),
        }
    }
}

/// One tested specimen, destined for one spreadsheet row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecimenRecord {
    pub code: String,
    pub grade: String,
    /// Age at test; usually a day count but free text is allowed
    pub age: String,
    pub pour_date: String,
    pub kind: String,
    pub size: String,
    pub volume: f64,
    pub weight: f64,
    pub load: f64,
    pub fracture_type: String,
}

/// Header fields printed above the data table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportHeader {
    pub project: String,
    pub customer: String,
    pub location: String,
}

/// A decoded submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBatch {
    pub header: ReportHeader,
    pub test_date: TestDate,
    pub action: ReportAction,
    pub records: Vec<SpecimenRecord>,
}

/// Raw submission as a request layer receives it: scalar header fields plus
/// one list per specimen field, all lists indexed in parallel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionForm {
    pub action: Option<String>,
    pub project: String,
    pub customer: String,
    pub location: String,
    pub test_date: String,
    pub code: Vec<String>,
    pub grade: Vec<String>,
    pub age: Vec<String>,
    pub pour_date: Vec<String>,
    pub kind: Vec<String>,
    pub size: Vec<String>,
    pub volume: Vec<String>,
    pub weight: Vec<String>,
    pub load: Vec<String>,
    pub fracture_type: Vec<String>,
}

impl SubmissionForm {
    /// Validate and convert into a [`ReportBatch`].
    ///
    /// The code list fixes the record count; every other list must match it.
    pub fn into_batch(self) -> Result<ReportBatch> {
        let action: ReportAction = self.action.as_deref().unwrap_or("").parse()?;
        let test_date = TestDate::parse_iso(&self.test_date)?;

        let count = self.code.len();
        let lengths = [
            ("grade", self.grade.len()),
            ("age", self.age.len()),
            ("pour_date", self.pour_date.len()),
            ("kind", self.kind.len()),
            ("size", self.size.len()),
            ("volume", self.volume.len()),
            ("weight", self.weight.len()),
            ("load", self.load.len()),
            ("fracture_type", self.fracture_type.len()),
        ];
        if let Some((field, len)) = lengths.iter().find(|(_, len)| *len != count) {
            return Err(ReportError::Validation(format!(
                "field '{field}' has {len} values but 'code' has {count}"
            )));
        }

        let mut records = Vec::with_capacity(count);
        for i in 0..count {
            records.push(SpecimenRecord {
                code: self.code[i].clone(),
                grade: self.grade[i].clone(),
                age: self.age[i].clone(),
                pour_date: self.pour_date[i].clone(),
                kind: self.kind[i].clone(),
                size: self.size[i].clone(),
                volume: coerce_measure("volume", &self.volume[i]),
                weight: coerce_measure("weight", &self.weight[i]),
                load: coerce_measure("load", &self.load[i]),
                fracture_type: self.fracture_type[i].clone(),
            });
        }

        Ok(ReportBatch {
            header: ReportHeader {
                project: self.project,
                customer: self.customer,
                location: self.location,
            },
            test_date,
            action,
            records,
        })
    }
}

/// Parse a non-negative decimal; blank or unusable input becomes 0.
pub fn coerce_measure(field: &str, raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => n,
        _ => {
            log::debug!("Coercing {field} value '{raw}' to 0");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(n: usize) -> SubmissionForm {
        let list = |v: &str| vec![v.to_string(); n];
        SubmissionForm {
            action: Some("append_sheet".into()),
            project: "Gedung A".into(),
            customer: "PT Beton".into(),
            location: "Lab".into(),
            test_date: "2024-03-12".into(),
            code: list("A-01"),
            grade: list("K-300"),
            age: list("28"),
            pour_date: list("2024-02-13"),
            kind: list("Silinder"),
            size: list("15x30"),
            volume: list("10"),
            weight: list("23"),
            load: list("450"),
            fracture_type: list("Kerucut"),
        }
    }

    #[test]
    fn test_test_date_formats() {
        let d = TestDate::parse_iso("2024-03-05").unwrap();
        assert_eq!(d.sheet_name(), "05-03-2024");
        assert_eq!(d.month_key(), "2024-03");
        assert_eq!(d.to_string(), "2024-03-05");
        assert!(TestDate::parse_iso("05-03-2024").is_err());
        assert!(TestDate::parse_iso("2024-02-30").is_err());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("create_workbook".parse::<ReportAction>().unwrap(), ReportAction::CreateWorkbook);
        assert_eq!(" append_sheet ".parse::<ReportAction>().unwrap(), ReportAction::AppendSheet);
        assert!(matches!("".parse::<ReportAction>(), Err(ReportError::Validation(_))));
        assert!("delete".parse::<ReportAction>().is_err());
    }

    #[test]
    fn test_into_batch() {
        let batch = form(2).into_batch().unwrap();
        assert_eq!(batch.action, ReportAction::AppendSheet);
        assert_eq!(batch.test_date.sheet_name(), "12-03-2024");
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].volume, 10.0);
        assert_eq!(batch.records[0].weight, 23.0);
        assert_eq!(batch.records[1].fracture_type, "Kerucut");
        assert_eq!(batch.header.project, "Gedung A");
    }

    #[test]
    fn test_into_batch_length_mismatch() {
        let mut f = form(2);
        f.weight.pop();
        let err = f.into_batch().unwrap_err();
        assert!(matches!(err, ReportError::Validation(ref m) if m.contains("weight") && m.contains("1") && m.contains("2")));
    }

    #[test]
    fn test_into_batch_missing_action_and_bad_date() {
        let mut f = form(1);
        f.action = None;
        assert!(matches!(f.into_batch(), Err(ReportError::Validation(_))));

        let mut f = form(1);
        f.test_date = "March 5".into();
        assert!(matches!(f.into_batch(), Err(ReportError::Validation(_))));
    }

    #[test]
    fn test_zero_records() {
        let batch = form(0).into_batch().unwrap();
        assert!(batch.records.is_empty());
    }

    #[test]
    fn test_coerce_measure() {
        assert_eq!(coerce_measure("volume", ""), 0.0);
        assert_eq!(coerce_measure("volume", " 5.3 "), 5.3);
        assert_eq!(coerce_measure("volume", "abc"), 0.0);
        assert_eq!(coerce_measure("volume", "-2"), 0.0);
        assert_eq!(coerce_measure("volume", "NaN"), 0.0);
    }

    #[test]
    fn test_form_from_json() {
        let json = r#"{
            "action": "create_workbook",
            "project": "P",
            "test_date": "2024-03-05"
        }"#;
        let f: SubmissionForm = serde_json::from_str(json).unwrap();
        let batch = f.into_batch().unwrap();
        assert_eq!(batch.action, ReportAction::CreateWorkbook);
        assert!(batch.records.is_empty());
        assert_eq!(batch.header.customer, "");
    }
}
