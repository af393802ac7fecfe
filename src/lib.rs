//! @ai:module:intent Run globally installed linters over files and globs with normalized results
//! @ai:module:layer application
//! @ai:module:public_api run, Arguments, adapter, config, resolver, runner, report, output, error
//! @ai:module:stateless true
//!
//! # Global Linters
//!
//! Runs a linter installed on the machine (hadolint, shellcheck, ...) over a set of
//! files and glob patterns, honouring a gitignore-style ignore file, and collects
//! the findings into a single report.
//!
//! ## Example
//!
//! ```rust,no_run
//! use global_linters::{output, run, Arguments, LinterRegistry, SystemShell};
//! use std::env;
//!
//! let args = Arguments::new("hadolint", vec!["**/Dockerfile".to_string()]);
//! let cwd = env::current_dir().unwrap();
//! let report = run(&args, &LinterRegistry::builtin(), &cwd, &SystemShell).unwrap();
//! println!("{}", output::format_report(&report, output::OutputFormat::Text));
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod ignore_filter;
pub mod linters;
pub mod output;
pub mod pattern;
pub mod range;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod shell;

pub use adapter::LinterAdapter;
pub use config::{Config, LinterConfig};
pub use error::{Error, Result};
pub use ignore_filter::{IgnoreFilter, DEFAULT_IGNORE_PATH};
pub use linters::{LinterRegistry, LinterSpec, StructuredOutput};
pub use output::{format_report, OutputFormat};
pub use range::VersionRange;
pub use report::{LintFinding, LintReport, LintSummary, OutputMode, Severity, SeverityCount};
pub use resolver::{FileResolver, ResolvedFiles};
pub use runner::LintRunner;
pub use shell::{MockShell, Shell, ShellOutput, SystemShell};

use std::path::{Path, PathBuf};

/// @ai:intent Everything one invocation needs to know
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    pub linter: String,
    pub file_and_or_glob: Vec<String>,
    pub ignore_path: Option<PathBuf>,
    pub no_ignore: bool,
    /// Semver range the installed linter must satisfy
    pub range: Option<String>,
    /// Extra options passed to the linter before each file
    pub options: Option<String>,
}

impl Arguments {
    pub fn new(linter: impl Into<String>, file_and_or_glob: Vec<String>) -> Self {
        Self {
            linter: linter.into(),
            file_and_or_glob,
            ..Self::default()
        }
    }
}

/// @ai:intent Validate the linter, resolve the inputs and lint every file
/// @ai:pre `registry` is built once per process and never mutated
/// @ai:post the linter is checked before any file is resolved
/// @ai:effects io, fs:read
pub fn run(
    args: &Arguments,
    registry: &LinterRegistry,
    working_dir: &Path,
    shell: &dyn Shell,
) -> Result<LintReport> {
    if args.file_and_or_glob.is_empty() {
        return Err(Error::Argument(
            "At least one file or glob pattern is required.".to_string(),
        ));
    }

    let adapter = LinterAdapter::new(registry, &args.linter, args.range.as_deref(), shell)?;

    let files = FileResolver::new(working_dir).resolve(
        &args.file_and_or_glob,
        args.no_ignore,
        args.ignore_path.as_deref(),
    )?;
    tracing::info!("Linting {} file(s) with {}", files.len(), adapter.name());

    LintRunner::new(&adapter, shell).run(&files, args.options.as_deref())
}
