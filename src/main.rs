//! @ai:module:intent CLI entry point for running a global linter over files and globs
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on config, output, lib

use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use global_linters::{output, Arguments, Config, LintReport, OutputFormat, SystemShell};
use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "global-linters")]
#[command(author, version, about = "Run globally installed linters over files and glob patterns")]
struct Cli {
    /// Linter to run (e.g. hadolint, shellcheck)
    linter: String,

    /// Files and/or glob patterns to lint
    #[arg(required = true)]
    file_and_or_glob: Vec<String>,

    /// Ignore file with gitignore-style rules [default: .prettierignore]
    #[arg(long, short = 'i')]
    ignore_path: Option<PathBuf>,

    /// Lint every resolved file, ignoring the ignore file
    #[arg(long)]
    no_ignore: bool,

    /// Semver range the installed linter version must satisfy
    #[arg(long, short)]
    range: Option<String>,

    /// Extra options passed to the linter
    #[arg(long, allow_hyphen_values = true)]
    options: Option<String>,

    /// Configuration file [default: global-linters.toml]
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: Format,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "global_linters=debug"
    } else {
        "global_linters=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn lint(cli: Cli) -> anyhow::Result<LintReport> {
    let working_dir = env::current_dir().context("Could not determine the working directory")?;
    let config = Config::load(cli.config.as_deref(), &working_dir)?;
    let registry = config.registry();

    let args = Arguments {
        linter: cli.linter,
        file_and_or_glob: cli.file_and_or_glob,
        ignore_path: cli.ignore_path.or(config.ignore_path),
        no_ignore: cli.no_ignore,
        range: cli.range,
        options: cli.options,
    };

    Ok(global_linters::run(&args, &registry, &working_dir, &SystemShell)?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = cli.format;

    match lint(cli) {
        Ok(report) => {
            println!("{}", output::format_report(&report, format.into()));

            if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}
