// End-to-end tests for the `labsheet` binary.
// Run with: cargo test -p labsheet-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use labsheet_engine::{CellRef, Workbook};
use labsheet_io::xlsx;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut template = Workbook::new();
        let sheet = template.add_sheet("Template").unwrap();
        sheet.set_value(CellRef::new(0, 1), "LAPORAN HASIL UJI KUAT TEKAN BETON");
        sheet.set_value(CellRef::new(11, 1), "Proyek");
        fs::write(dir.path().join("template.xlsx"), xlsx::write_workbook(&template).unwrap()).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn labsheet(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_labsheet"))
            .args(args)
            .arg("--config")
            .arg(self.path("settings.toml"))
            .arg("--output-dir")
            .arg(self.path("output"))
            .arg("--template")
            .arg(self.path("template.xlsx"))
            .output()
            .unwrap()
    }

    fn write_form(&self, name: &str, action: &str, date: &str) -> PathBuf {
        let json = format!(
            r#"{{
                "action": "{action}",
                "project": "Gedung A",
                "customer": "PT Beton",
                "location": "Lab",
                "test_date": "{date}",
                "code": ["A-01"], "grade": ["K-300"], "age": ["28"],
                "pour_date": ["13-02-2024"], "kind": ["Silinder"], "size": ["15x30"],
                "volume": ["10"], "weight": ["23"], "load": ["450"],
                "fracture_type": ["Kerucut"]
            }}"#
        );
        let path = self.path(name);
        fs::write(&path, json).unwrap();
        path
    }
}

fn code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn submit_append_download_list() {
    let env = Env::new();
    let create = env.write_form("create.json", "create_workbook", "2024-03-05");
    let append = env.write_form("append.json", "append_sheet", "2024-03-12");

    let out = env.labsheet(&["submit", arg(&create)]);
    assert_eq!(code(&out), 0, "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(PathBuf::from(stdout(&out)), env.path("output").join("laporan_2024-03.xlsx"));

    let out = env.labsheet(&["submit", arg(&append)]);
    assert_eq!(code(&out), 0, "{}", String::from_utf8_lossy(&out.stderr));

    // Same date again is a conflict
    let out = env.labsheet(&["submit", arg(&append)]);
    assert_eq!(code(&out), 3);
    assert!(String::from_utf8_lossy(&out.stderr).contains("12-03-2024"));

    let copy = env.path("copy.xlsx");
    let out = env.labsheet(&["download", "laporan_2024-03.xlsx", "-o", arg(&copy)]);
    assert_eq!(code(&out), 0);
    let names = xlsx::read_sheet_names(&fs::read(&copy).unwrap()).unwrap();
    assert_eq!(names, vec!["05-03-2024", "12-03-2024"]);

    let out = env.labsheet(&["list"]);
    assert_eq!(code(&out), 0);
    assert_eq!(stdout(&out), "laporan_2024-03.xlsx\t05-03-2024, 12-03-2024");

    let out = env.labsheet(&["list", "--json"]);
    let listed: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(listed[0]["file"], "laporan_2024-03.xlsx");
    assert_eq!(listed[0]["sheets"][1], "12-03-2024");
}

#[test]
fn create_over_existing_month_needs_replace() {
    let env = Env::new();
    let first = env.write_form("first.json", "create_workbook", "2024-03-05");
    let again = env.write_form("again.json", "create_workbook", "2024-03-19");

    assert_eq!(code(&env.labsheet(&["submit", arg(&first)])), 0);

    let out = env.labsheet(&["submit", arg(&again)]);
    assert_eq!(code(&out), 3);
    assert!(String::from_utf8_lossy(&out.stderr).contains("--replace"));

    assert_eq!(code(&env.labsheet(&["submit", arg(&again), "--replace"])), 0);
    let bytes = fs::read(env.path("output").join("laporan_2024-03.xlsx")).unwrap();
    assert_eq!(xlsx::read_sheet_names(&bytes).unwrap(), vec!["19-03-2024"]);
}

#[test]
fn error_exit_codes() {
    let env = Env::new();

    // Append with no workbook for the month
    let append = env.write_form("append.json", "append_sheet", "2024-05-02");
    assert_eq!(code(&env.labsheet(&["submit", arg(&append)])), 3);
    assert!(!env.path("output").join("laporan_2024-05.xlsx").exists());

    // Malformed form
    let bad = env.path("bad.json");
    fs::write(&bad, r#"{"action": "append_sheet", "test_date": "2024-05-02", "code": ["A"]}"#).unwrap();
    assert_eq!(code(&env.labsheet(&["submit", arg(&bad)])), 2);

    // Missing report
    assert_eq!(code(&env.labsheet(&["download", "laporan_2020-01.xlsx"])), 4);
    assert_eq!(code(&env.labsheet(&["download", "../template.xlsx"])), 4);

    // Unreadable template
    let create = env.write_form("create.json", "create_workbook", "2024-05-02");
    fs::remove_file(env.path("template.xlsx")).unwrap();
    assert_eq!(code(&env.labsheet(&["submit", arg(&create)])), 1);
}
