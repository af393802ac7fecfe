//! @ai:module:intent Validate an installed linter and describe what it supports
//! @ai:module:layer application
//! @ai:module:public_api LinterAdapter, coerce_version
//! @ai:module:depends_on linters, range, shell, error

use crate::error::{Error, Result};
use crate::linters::{LinterRegistry, LinterSpec};
use crate::range::VersionRange;
use crate::shell::Shell;
use regex::Regex;
use semver::Version;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])")
        .expect("Invalid regex")
});

/// @ai:intent A supported linter that is installed and satisfies the requested range
#[derive(Debug, Clone)]
pub struct LinterAdapter {
    name: String,
    spec: LinterSpec,
    executable: PathBuf,
    version: Version,
}

impl LinterAdapter {
    /// @ai:intent Look up, locate, version and range-check a linter
    /// @ai:pre registry is the process-wide immutable registry
    /// @ai:post the executable exists and its version satisfies `range` when given
    /// @ai:effects io
    /// @ai:edge_cases the version command's exit code is ignored, only its output is read
    pub fn new(
        registry: &LinterRegistry,
        name: &str,
        range: Option<&str>,
        shell: &dyn Shell,
    ) -> Result<Self> {
        let spec = registry
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnsupportedLinter(name.to_string()))?;

        let executable = shell
            .which(name)
            .ok_or_else(|| Error::ExecutableNotFound(name.to_string()))?;
        tracing::info!("Found {} executable at {}", name, executable.display());

        let version = detect_version(name, &spec, &executable, shell)?;
        tracing::info!("Found {} {}", name, version);

        if let Some(range) = range {
            let req = VersionRange::parse(range)?;
            if !req.matches(&version) {
                return Err(Error::VersionMismatch {
                    linter: name.to_string(),
                    version,
                    range: range.to_string(),
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            spec,
            executable,
            version,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &LinterSpec {
        &self.spec
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// @ai:intent Whether the installed version can emit JSON output
    /// @ai:effects pure
    /// @ai:edge_cases a structured flag without a `since` range is a Config error, never a default
    pub fn supports_structured_output(&self) -> Result<bool> {
        let Some(structured) = &self.spec.structured_output else {
            return Ok(false);
        };

        let since = structured.since.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "{}: structured-output capability not fully configured (missing minimum version).",
                self.name
            ))
        })?;

        let req = VersionRange::parse(since).map_err(|_| {
            Error::Config(format!(
                "{}: structured-output minimum version '{}' is not a valid semver range.",
                self.name, since
            ))
        })?;

        Ok(req.matches(&self.version))
    }

    /// @ai:intent Arguments enabling structured output, empty when unsupported
    /// @ai:effects pure
    pub fn structured_output_args(&self) -> Result<Vec<String>> {
        if !self.supports_structured_output()? {
            return Ok(Vec::new());
        }

        match &self.spec.structured_output {
            Some(structured) => split_args(&structured.flag).map_err(|e| {
                Error::Config(format!(
                    "{}: invalid structured-output flag '{}': {}",
                    self.name, structured.flag, e
                ))
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// @ai:intent Run the version command and coerce a semantic version out of its output
/// @ai:effects io
fn detect_version(
    name: &str,
    spec: &LinterSpec,
    executable: &Path,
    shell: &dyn Shell,
) -> Result<Version> {
    let args = split_args(&spec.version_flag).map_err(|e| {
        Error::Config(format!(
            "{}: invalid version flag '{}': {}",
            name, spec.version_flag, e
        ))
    })?;
    let args: Vec<OsString> = args.into_iter().map(OsString::from).collect();

    let output = shell.exec(executable, &args)?;
    let combined = format!("{}\n{}", output.stdout_lossy(), output.stderr_lossy());

    coerce_version(&combined).ok_or_else(|| Error::VersionParse {
        linter: name.to_string(),
        flag: spec.version_flag.clone(),
    })
}

/// @ai:intent Find the first version-like number sequence in free text
/// @ai:effects pure
/// @ai:example coerce_version("Haskell Dockerfile Linter v2.12.0-no-git") -> 2.12.0
/// @ai:edge_cases missing minor/patch become 0, numbers longer than 16 digits are skipped
pub fn coerce_version(text: &str) -> Option<Version> {
    let captures = VERSION_PATTERN.captures(text)?;
    let part = |idx: usize| -> Option<u64> {
        match captures.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// @ai:intent Split an option string into argv using shell-word rules
/// @ai:effects pure
pub(crate) fn split_args(text: &str) -> std::result::Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(text)
}
