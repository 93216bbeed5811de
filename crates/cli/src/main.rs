// DigiMV CLI - build, export and explore the Master Database

mod build;
mod exit_codes;
mod filters;
mod master;
mod reference;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use digimv_config::{ConfigError, Settings};
use digimv_engine::MasterError;
use digimv_io::IoError;
use tracing_subscriber::{fmt, EnvFilter};

use exit_codes::{
    io_exit_code, master_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_IO, EXIT_MALFORMED_FILE, EXIT_SUCCESS, EXIT_USAGE,
};
use filters::FilterArgs;

#[derive(Parser)]
#[command(name = "digimv")]
#[command(about = "Join DigiMV care-provider workbooks into one geocoded Master Database")]
#[command(version)]
struct Cli {
    /// Settings file (TOML). Defaults to the user config directory
    #[arg(long, global = true, value_name = "TOML", env = "DIGIMV_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a Master workbook from DigiMV part workbooks
    #[command(after_help = "\
Examples:
  digimv build --part deel1.xlsx --part deel2.xlsx --part deel3.xlsx --reference Nederland.csv
  digimv build --part deel1.xlsx --reference Nederland.csv -o master.xlsx --type VVT
  digimv build --part deel1.xlsx --json")]
    Build {
        /// DigiMV part workbook (xls/xlsx). Repeatable; order sets Bron_Part
        #[arg(long = "part", value_name = "FILE", required = true)]
        parts: Vec<PathBuf>,

        /// Postcode reference CSV (postcode;provincie;lat;lon)
        #[arg(long, value_name = "CSV")]
        reference: Option<PathBuf>,

        /// Output workbook (default: DigiMV_Export_<timestamp>.xlsx)
        #[arg(long, short = 'o', value_name = "XLSX")]
        output: Option<PathBuf>,

        /// Print the build report as JSON on stdout
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Re-export a Master workbook, optionally filtered and re-geocoded
    #[command(after_help = "\
Examples:
  digimv export master.xlsx --province Utrecht -o utrecht.xlsx
  digimv export master.xlsx --reference Nederland.csv --revenue-min 50")]
    Export {
        /// Previously exported Master workbook
        master: PathBuf,

        #[arg(long, value_name = "CSV")]
        reference: Option<PathBuf>,

        #[arg(long, short = 'o', value_name = "XLSX")]
        output: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show summary figures and the leading rows of a Master workbook
    #[command(after_help = "\
Examples:
  digimv show master.xlsx
  digimv show master.xlsx --type GGZ --limit 50
  digimv show master.xlsx --search almere --json")]
    Show {
        master: PathBuf,

        #[arg(long, value_name = "CSV")]
        reference: Option<PathBuf>,

        /// Rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Print summary and rows as JSON on stdout
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Emit map markers (JSON) for a Master workbook
    #[command(after_help = "\
Examples:
  digimv points master.xlsx > points.json
  digimv points master.xlsx --selected 12345 --type VVT")]
    Points {
        master: PathBuf,

        #[arg(long, value_name = "CSV")]
        reference: Option<PathBuf>,

        /// Organization code to highlight and centre on
        #[arg(long, value_name = "CODE")]
        selected: Option<String>,

        /// Maximum markers (default: map.max_markers from settings)
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Validate a postcode reference CSV and report its coverage
    Reference {
        reference: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = Settings::load(cli.config.as_deref())
        .map_err(CliError::from)
        .and_then(|settings| run(cli.command, &settings));

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

fn run(command: Commands, settings: &Settings) -> Result<(), CliError> {
    match command {
        Commands::Build { parts, reference, output, json, filters } => {
            build::cmd_build(settings, parts, reference, output, json, &filters)
        }
        Commands::Export { master, reference, output, filters } => {
            master::cmd_export(settings, master, reference, output, &filters)
        }
        Commands::Show { master, reference, limit, json, filters } => {
            master::cmd_show(settings, master, reference, limit, json, &filters)
        }
        Commands::Points { master, reference, selected, limit, filters } => {
            master::cmd_points(settings, master, reference, selected, limit, &filters)
        }
        Commands::Reference { reference, json } => reference::cmd_reference(settings, reference, json),
    }
}

/// Logs go to stderr so stdout stays clean for JSON.
fn init_logging(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self { code: EXIT_MALFORMED_FILE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<MasterError> for CliError {
    fn from(err: MasterError) -> Self {
        let hint = match &err {
            MasterError::MissingColumn { .. } => Some("check the [layout] section or the input headers".to_string()),
            MasterError::MissingSheet { .. } => Some("is this a DigiMV part workbook?".to_string()),
            _ => None,
        };
        Self { code: master_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Master(inner) => inner.into(),
            other => Self { code: io_exit_code(&other), message: other.to_string(), hint: None },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self {
            code: EXIT_CONFIG,
            message: err.to_string(),
            hint: Some(format!("default settings file: {}", Settings::config_path_display())),
        }
    }
}

/// Serialize a report for stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("cannot serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}
