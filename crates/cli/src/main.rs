// regmerge CLI - merge two company registry exports into one company-level view

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use regmerge_io::IoError;
use regmerge_recon::ReconError;

use exit_codes::{io_exit_code, recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "regmerge")]
#[command(about = "Entity resolution between two company registry exports")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, match and aggregate both datasets; write merged CSV + metrics JSON
    #[command(after_help = "\
Examples:
  regmerge run
  regmerge run --config regmerge.toml
  regmerge run --ds1 a.csv --ds2 b.csv --merged out/merged.csv --metrics out/metrics.json
  regmerge run --config regmerge.toml --matches out/address_matches.csv --json")]
    Run {
        /// Path to the TOML config (defaults apply when omitted)
        #[arg(long, env = "REGMERGE_CONFIG")]
        config: Option<PathBuf>,

        /// DS1 source CSV (overrides config)
        #[arg(long)]
        ds1: Option<PathBuf>,

        /// DS2 source CSV (overrides config)
        #[arg(long)]
        ds2: Option<PathBuf>,

        /// Merged company CSV output (overrides config)
        #[arg(long)]
        merged: Option<PathBuf>,

        /// Metrics JSON output (overrides config)
        #[arg(long)]
        metrics: Option<PathBuf>,

        /// Also write address-level matches to this CSV
        #[arg(long)]
        matches: Option<PathBuf>,

        /// Print run metadata + metrics as one JSON value on stdout
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a config without running
    #[command(after_help = "\
Examples:
  regmerge validate --config regmerge.toml")]
    Validate {
        /// Path to the TOML config
        #[arg(long, env = "REGMERGE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Write one dataset's unified + derived fields to CSV for inspection
    #[command(after_help = "\
Examples:
  regmerge normalize --dataset ds1 --output out/ds1_normalized.csv
  regmerge normalize --dataset ds2 --input exports/ds2.csv --output out/ds2_normalized.csv")]
    Normalize {
        /// Which dataset's column mapping to apply
        #[arg(long, value_enum)]
        dataset: Dataset,

        /// Path to the TOML config
        #[arg(long, env = "REGMERGE_CONFIG")]
        config: Option<PathBuf>,

        /// Source CSV (overrides config)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Normalized CSV output
        #[arg(long)]
        output: PathBuf,
    },

    /// Address-level matching over two normalized CSVs
    #[command(after_help = "\
Examples:
  regmerge match --ds1 out/ds1_normalized.csv --ds2 out/ds2_normalized.csv --output out/matches.csv
  regmerge match --ds1 a.csv --ds2 b.csv --output m.csv --strong 92 --with-postal 80")]
    Match {
        /// Normalized DS1 CSV
        #[arg(long)]
        ds1: PathBuf,

        /// Normalized DS2 CSV
        #[arg(long)]
        ds2: PathBuf,

        /// Match records CSV output
        #[arg(long)]
        output: PathBuf,

        /// Name-score threshold when the DS1 address has no postal code
        #[arg(long, default_value_t = 95.0)]
        strong: f64,

        /// Name-score threshold when the DS1 address has a postal code
        #[arg(long, default_value_t = 86.0)]
        with_postal: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    Ds1,
    Ds2,
}

impl Dataset {
    pub fn label(self) -> &'static str {
        match self {
            Dataset::Ds1 => "ds1",
            Dataset::Ds2 => "ds2",
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  regmerge-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, ds1, ds2, merged, metrics, matches, json } => {
            recon::cmd_run(recon::RunArgs { config, ds1, ds2, merged, metrics, matches }, json)
        }
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::Normalize { dataset, config, input, output } => {
            recon::cmd_normalize(dataset, config, input, output)
        }
        Commands::Match { ds1, ds2, output, strong, with_postal } => {
            recon::cmd_match(ds1, ds2, output, strong, with_postal)
        }
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
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::Schema { dataset, .. } => {
                Some(format!("check [datasets.{dataset}.columns] against the CSV header"))
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn io(err: IoError) -> Self {
        Self::new(io_exit_code(&err), err.to_string())
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
