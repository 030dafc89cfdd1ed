// labsheet CLI - submit lab test batches into monthly report workbooks

mod exit_codes;
mod logger;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{exit_code_for, EXIT_RESOURCE, EXIT_SUCCESS, EXIT_USAGE};
use labsheet_config::Settings;
use labsheet_engine::{ReportError, SubmissionForm};
use labsheet_io::{CachedTemplate, FsStorage, ReportStore, XlsxTemplateFile};

#[derive(Parser)]
#[command(name = "labsheet")]
#[command(about = "Concrete test reports: one workbook per month, one sheet per test date")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/labsheet/settings.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the monthly report files (overrides settings)
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Report template .xlsx (overrides settings)
    #[arg(long, global = true, value_name = "PATH")]
    template: Option<PathBuf>,

    /// Log more (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a batch of specimen records from a JSON form
    #[command(after_help = "\
The form holds the header fields, the test date (YYYY-MM-DD), the action
(create_workbook or append_sheet) and one list per specimen field:

  {\"action\": \"append_sheet\", \"project\": \"Gedung A\", \"customer\": \"PT Beton\",
   \"location\": \"Lab\", \"test_date\": \"2024-03-12\",
   \"code\": [\"A-01\"], \"grade\": [\"K-300\"], \"age\": [\"28\"], ...}

Examples:
  labsheet submit batch.json
  cat batch.json | labsheet submit -
  labsheet submit new-month.json --replace")]
    Submit {
        /// Form file, or - for stdin
        form: PathBuf,

        /// Allow create_workbook to replace an existing monthly workbook
        #[arg(long)]
        replace: bool,
    },

    /// Write a report file to a path or stdout
    Download {
        /// Report file name, e.g. laporan_2024-03.xlsx
        name: String,

        /// Output path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List report files and their sheets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a commented settings file
    Init {
        /// Where to write it (default: the standard settings location)
        path: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  labsheet-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let result = match load_settings(&cli) {
        Ok(settings) => match cli.command {
            Commands::Submit { form, replace } => cmd_submit(&settings, &form, replace),
            Commands::Download { name, output } => cmd_download(&settings, &name, output),
            Commands::List { json } => cmd_list(&settings, json),
            Commands::Init { path } => cmd_init(path),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RESOURCE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReportError> for CliError {
    fn from(err: ReportError) -> Self {
        let hint = match &err {
            ReportError::WorkbookMissing { .. } => {
                Some("submit the month's first test date with action create_workbook")
            }
            ReportError::WorkbookExists { .. } => Some("pass --replace to confirm, or use append_sheet"),
            ReportError::DuplicateSheet { .. } => {
                Some("this test date is already reported; corrections are made in the file")
            }
            _ => None,
        };
        let base = Self { code: exit_code_for(err.kind()), message: err.to_string(), hint: None };
        match hint {
            Some(hint) => base.with_hint(hint),
            None => base,
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let mut settings = Settings::load_from(&config_path).map_err(|e| CliError::args(e.to_string()))?;

    // A relative template in the settings file is relative to that file
    if let Some(base) = config_path.parent() {
        settings.template_path = settings.resolved_template_path(base);
    }

    if let Some(dir) = &cli.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(template) = &cli.template {
        settings.template_path = template.clone();
    }
    Ok(settings)
}

fn open_store(settings: &Settings) -> ReportStore {
    let storage = FsStorage::new(&settings.output_dir);
    let template = XlsxTemplateFile::new(&settings.template_path);
    let store = if settings.cache_template {
        ReportStore::new(storage, CachedTemplate::new(template))
    } else {
        ReportStore::new(storage, template)
    };
    store.with_file_prefix(settings.file_prefix.as_str())
}

// ============================================================================
// submit
// ============================================================================

fn read_form(path: &Path) -> Result<SubmissionForm, CliError> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io(format!("failed to read stdin: {}", e)))?;
        buf
    } else {
        fs::read_to_string(path)
            .map_err(|e| CliError::args(format!("failed to read {}: {}", path.display(), e)))?
    };
    serde_json::from_str(&contents)
        .map_err(|e| CliError::args(format!("invalid submission JSON: {}", e)))
}

fn cmd_submit(settings: &Settings, form: &Path, replace: bool) -> Result<(), CliError> {
    let batch = read_form(form)?.into_batch()?;
    let store = open_store(settings);

    let path = if replace {
        store.submit(&batch)?
    } else {
        store.submit_no_replace(&batch)?
    };
    println!("{}", path.display());
    Ok(())
}

// ============================================================================
// download
// ============================================================================

fn cmd_download(settings: &Settings, name: &str, output: Option<PathBuf>) -> Result<(), CliError> {
    let bytes = open_store(settings).open_report(name)?;

    match output {
        Some(path) => fs::write(&path, &bytes)
            .map_err(|e| CliError::io(format!("failed to write {}: {}", path.display(), e))),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .and_then(|()| handle.flush())
                .map_err(|e| CliError::io(e.to_string()))
        }
    }
}

// ============================================================================
// list
// ============================================================================

fn cmd_list(settings: &Settings, json: bool) -> Result<(), CliError> {
    let reports = open_store(settings).list_reports()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if json {
        let value: Vec<serde_json::Value> = reports
            .iter()
            .map(|r| serde_json::json!({ "file": r.file_name, "sheets": r.sheets }))
            .collect();
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::io(e.to_string()))?;
        writeln!(handle, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
        return Ok(());
    }

    for report in &reports {
        writeln!(handle, "{}\t{}", report.file_name, report.sheets.join(", "))
            .map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// init
// ============================================================================

fn cmd_init(path: Option<PathBuf>) -> Result<(), CliError> {
    let path = path.unwrap_or_else(Settings::config_path);
    let created = Settings::create_default_file(&path).map_err(|e| CliError::io(e.to_string()))?;
    if created {
        println!("{}", path.display());
        Ok(())
    } else {
        Err(CliError::args(format!("{} already exists", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_error_codes() {
        let err: CliError = ReportError::DuplicateSheet { sheet: "12-03-2024".into() }.into();
        assert_eq!(err.code, exit_codes::EXIT_CONFLICT);
        assert!(err.hint.is_some());

        let err: CliError = ReportError::WorkbookExists { file: "laporan_2024-03.xlsx".into() }.into();
        assert_eq!(err.code, exit_codes::EXIT_CONFLICT);
        assert!(err.hint.as_deref().unwrap_or_default().contains("--replace"));

        let err: CliError = ReportError::NotFound("x.xlsx".into()).into();
        assert_eq!(err.code, exit_codes::EXIT_NOT_FOUND);

        let err: CliError = ReportError::Validation("bad".into()).into();
        assert_eq!(err.code, EXIT_USAGE);
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "labsheet",
            "list",
            "--config",
            "/nonexistent/labsheet.toml",
            "--output-dir",
            "/srv/laporan",
        ])
        .unwrap();
        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("/srv/laporan"));
        assert_eq!(settings.file_prefix, "laporan");
    }

    #[test]
    fn test_template_relative_to_settings_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("settings.toml");
        fs::write(&config, "template_path = \"templates/uji.xlsx\"\n").unwrap();

        let cli = Cli::try_parse_from(["labsheet", "list", "--config", config.to_str().unwrap()]).unwrap();
        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.template_path, dir.path().join("templates/uji.xlsx"));

        // --template is taken as given
        let cli = Cli::try_parse_from([
            "labsheet",
            "list",
            "--config",
            config.to_str().unwrap(),
            "--template",
            "local.xlsx",
        ])
        .unwrap();
        assert_eq!(load_settings(&cli).unwrap().template_path, PathBuf::from("local.xlsx"));
    }
}
