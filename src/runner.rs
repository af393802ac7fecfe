//! @ai:module:intent Run a linter over resolved files and normalize its output
//! @ai:module:layer application
//! @ai:module:public_api LintRunner, parse_structured_output, parse_plain_output
//! @ai:module:depends_on adapter, resolver, report, shell, error
//! @ai:module:stateless true

use crate::adapter::{split_args, LinterAdapter};
use crate::error::{Error, Result};
use crate::report::{LintFinding, LintReport, OutputMode, Severity};
use crate::resolver::ResolvedFiles;
use crate::shell::Shell;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;

/// One record of a linter's JSON output. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct RawFinding {
    message: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    code: Option<RawCode>,
}

/// shellcheck reports numeric codes, hadolint reports strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Number(i64),
}

/// @ai:intent Invokes a validated linter once per file and builds the report
pub struct LintRunner<'a> {
    adapter: &'a LinterAdapter,
    shell: &'a dyn Shell,
}

impl<'a> LintRunner<'a> {
    pub fn new(adapter: &'a LinterAdapter, shell: &'a dyn Shell) -> Self {
        Self { adapter, shell }
    }

    /// @ai:intent Lint every file and aggregate normalized findings
    /// @ai:pre files come from FileResolver::resolve
    /// @ai:post findings follow file order, then emission order within a file
    /// @ai:effects io
    /// @ai:edge_cases a non-zero exit code is not a failure; malformed JSON aborts the run
    pub fn run(&self, files: &ResolvedFiles, extra_options: Option<&str>) -> Result<LintReport> {
        let output_mode = if self.adapter.supports_structured_output()? {
            OutputMode::Structured
        } else {
            OutputMode::PlainText
        };

        let mut prefix_args = self.adapter.structured_output_args()?;
        if let Some(options) = extra_options {
            let options = split_args(options).map_err(|e| {
                Error::Argument(format!("Invalid linter options '{}': {}", options, e))
            })?;
            prefix_args.extend(options);
        }
        let prefix_args: Vec<OsString> = prefix_args.into_iter().map(OsString::from).collect();

        let mut findings = Vec::new();
        for file in files {
            findings.extend(self.lint_file(file, &prefix_args, output_mode)?);
        }

        Ok(LintReport::new(output_mode, findings))
    }

    /// @ai:intent Invoke the linter for one file and parse what it printed
    /// @ai:effects io
    fn lint_file(
        &self,
        file: &Path,
        prefix_args: &[OsString],
        output_mode: OutputMode,
    ) -> Result<Vec<LintFinding>> {
        tracing::info!("Processing {}", file.display());

        let mut args = prefix_args.to_vec();
        args.push(file.as_os_str().to_os_string());

        let output = self.shell.exec(self.adapter.executable(), &args)?;
        tracing::debug!(
            "{} exited with {:?} for {}",
            self.adapter.name(),
            output.code,
            file.display()
        );
        if !output.stderr.is_empty() {
            tracing::debug!("{} stderr: {}", self.adapter.name(), output.stderr_lossy().trim_end());
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        match output_mode {
            OutputMode::Structured => {
                let text = std::str::from_utf8(&output.stdout).map_err(|e| Error::OutputParse {
                    linter: self.adapter.name().to_string(),
                    file: file.to_path_buf(),
                    message: format!("invalid UTF-8: {}", e),
                })?;
                parse_structured_output(
                    text,
                    file,
                    self.adapter.spec().code_prefix.as_deref(),
                )
                .map_err(|e| Error::OutputParse {
                    linter: self.adapter.name().to_string(),
                    file: file.to_path_buf(),
                    message: e.to_string(),
                })
            }
            OutputMode::PlainText => Ok(parse_plain_output(&output.stdout_lossy(), file)),
        }
    }
}

/// @ai:intent Convert a JSON array of linter records into findings for `file`
/// @ai:effects pure
/// @ai:edge_cases a missing or unknown level lands in the Other bucket
pub fn parse_structured_output(
    text: &str,
    file: &Path,
    code_prefix: Option<&str>,
) -> std::result::Result<Vec<LintFinding>, serde_json::Error> {
    let records: Vec<RawFinding> = serde_json::from_str(text)?;

    Ok(records
        .into_iter()
        .map(|record| LintFinding {
            file: file.to_path_buf(),
            message: record.message,
            line: record.line,
            column: record.column,
            severity: Some(
                record
                    .level
                    .as_deref()
                    .map(Severity::from_level)
                    .unwrap_or(Severity::Other),
            ),
            level: record.level,
            code: record.code.map(|code| normalize_code(code, code_prefix)),
        })
        .collect())
}

/// @ai:intent One finding per non-blank output line
/// @ai:effects pure
/// @ai:edge_cases lines holding only whitespace are dropped along with empty ones
pub fn parse_plain_output(text: &str, file: &Path) -> Vec<LintFinding> {
    text.split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty())
        .map(|line| LintFinding::plain(file.to_path_buf(), line))
        .collect()
}

/// @ai:intent Render a rule code, prefixing bare numeric codes
/// @ai:effects pure
fn normalize_code(code: RawCode, prefix: Option<&str>) -> String {
    let code = match code {
        RawCode::Text(text) => text,
        RawCode::Number(number) => number.to_string(),
    };

    match prefix {
        Some(prefix) if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) => {
            format!("{}{}", prefix, code)
        }
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linters::{LinterRegistry, LinterSpec};
    use crate::report::SeverityCount;
    use crate::shell::{MockShell, ShellOutput};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const HADOLINT_JSON: &str = r#"[
        {"line":1,"code":"DL3006","message":"Always tag the version of an image explicitly","column":1,"file":"Dockerfile","level":"error"},
        {"line":3,"code":"DL3059","message":"Multiple consecutive RUN instructions","column":1,"file":"Dockerfile","level":"info"}
    ]"#;

    fn files() -> ResolvedFiles {
        vec![PathBuf::from("/work/Dockerfile"), PathBuf::from("/work/build/Dockerfile")]
            .into_iter()
            .collect()
    }

    fn shell_with<F>(name: &'static str, version: &'static str, lint: F) -> MockShell
    where
        F: Fn(&[OsString]) -> ShellOutput + Send + Sync + 'static,
    {
        MockShell::new(&[name], move |args| {
            if args.first().is_some_and(|arg| arg == "--version") {
                ShellOutput::stdout(version)
            } else {
                lint(args)
            }
        })
    }

    #[test]
    fn test_structured_run_tallies_summary() {
        let shell = shell_with("hadolint", "Haskell Dockerfile Linter 2.12.0", |_| {
            ShellOutput::stdout(HADOLINT_JSON).with_code(1)
        });
        let adapter = LinterAdapter::new(&LinterRegistry::builtin(), "hadolint", None, &shell).unwrap();

        let report = LintRunner::new(&adapter, &shell).run(&files(), None).unwrap();

        assert_eq!(report.output_mode(), OutputMode::Structured);
        assert_eq!(
            report.summary().count,
            SeverityCount {
                error: 2,
                warning: 0,
                info: 2,
                other: 0,
            }
        );
        assert_eq!(report.findings().len(), 4);
        assert_eq!(report.findings()[0].file, PathBuf::from("/work/Dockerfile"));
        assert_eq!(report.findings()[0].code.as_deref(), Some("DL3006"));
        assert_eq!(report.findings()[1].line, Some(3));
        assert_eq!(report.findings()[2].file, PathBuf::from("/work/build/Dockerfile"));
    }

    #[test]
    fn test_invokes_once_per_file_with_flags_and_options() {
        let shell = shell_with("hadolint", "2.12.0", |_| ShellOutput::default());
        let adapter = LinterAdapter::new(&LinterRegistry::builtin(), "hadolint", None, &shell).unwrap();

        LintRunner::new(&adapter, &shell)
            .run(&files(), Some("--ignore DL3008 --trusted-registry 'my registry'"))
            .unwrap();

        let calls = shell.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[1],
            [
                "--format",
                "json",
                "--ignore",
                "DL3008",
                "--trusted-registry",
                "my registry",
                "/work/Dockerfile",
            ]
            .map(OsString::from)
        );
        assert_eq!(calls[2].last(), Some(&OsString::from("/work/build/Dockerfile")));
    }

    #[test]
    fn test_plain_text_run_when_version_too_old() {
        let shell = shell_with("shellcheck", "version: 0.3.8", |args| {
            let file = args.last().map(|arg| arg.to_string_lossy().into_owned()).unwrap_or_default();
            ShellOutput::stdout(&format!("{}:1 SC2086 quote this\r\n\n{}:4 SC2046 and this\n", file, file))
        });
        let adapter = LinterAdapter::new(&LinterRegistry::builtin(), "shellcheck", None, &shell).unwrap();
        let files: ResolvedFiles = vec![PathBuf::from("/work/a.sh")].into_iter().collect();

        let report = LintRunner::new(&adapter, &shell).run(&files, None).unwrap();

        assert_eq!(report.output_mode(), OutputMode::PlainText);
        assert_eq!(
            report.findings(),
            &[
                LintFinding::plain(PathBuf::from("/work/a.sh"), "/work/a.sh:1 SC2086 quote this"),
                LintFinding::plain(PathBuf::from("/work/a.sh"), "/work/a.sh:4 SC2046 and this"),
            ]
        );
        assert_eq!(report.summary().count, SeverityCount::default());
        assert_eq!(shell.calls()[1], vec![OsString::from("/work/a.sh")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_names_reach_the_linter_unchanged() {
        use std::os::unix::ffi::OsStrExt;

        let raw = b"/work/caf\xe9.sh";
        let file = PathBuf::from(std::ffi::OsStr::from_bytes(raw));
        let shell = shell_with("shellcheck", "version: 0.3.8", |_| ShellOutput::stdout("warning\n"));
        let adapter = LinterAdapter::new(&LinterRegistry::builtin(), "shellcheck", None, &shell).unwrap();
        let files: ResolvedFiles = vec![file.clone()].into_iter().collect();

        let report = LintRunner::new(&adapter, &shell).run(&files, None).unwrap();

        assert_eq!(shell.calls()[1].last().map(|arg| arg.as_bytes()), Some(&raw[..]));
        assert_eq!(report.findings()[0].file, file);
    }

    #[test]
    fn test_empty_output_contributes_nothing() {
        let shell = shell_with("hadolint", "2.12.0", |_| ShellOutput::stdout("  \n").with_code(0));
        let adapter = LinterAdapter::new(&LinterRegistry::builtin(), "hadolint", None, &shell).unwrap();

        let report = LintRunner::new(&adapter, &shell).run(&files(), None).unwrap();

        assert!(report.findings().is_empty());
        assert!(report.passed());
        assert_eq!(report.output_mode(), OutputMode::Structured);
    }

    #[test]
    fn test_malformed_structured_output_is_fatal() {
        let shell = shell_with("hadolint", "2.12.0", |_| ShellOutput::stdout("Dockerfile:1 DL3006 oops"));
        let adapter = LinterAdapter::new(&LinterRegistry::builtin(), "hadolint", None, &shell).unwrap();

        let err = LintRunner::new(&adapter, &shell).run(&files(), None).unwrap_err();

        assert!(matches!(err, Error::OutputParse { .. }));
        assert_eq!(shell.calls().len(), 2);
    }

    #[test]
    fn test_invalid_utf8_structured_output_is_fatal() {
        let shell = shell_with("hadolint", "2.12.0", |_| ShellOutput {
            code: Some(1),
            stdout: vec![b'[', 0xff, b']'],
            stderr: Vec::new(),
        });
        let adapter = LinterAdapter::new(&LinterRegistry::builtin(), "hadolint", None, &shell).unwrap();

        let err = LintRunner::new(&adapter, &shell).run(&files(), None).unwrap_err();
        assert!(err.to_string().contains("invalid UTF-8"));
    }

    #[test]
    fn test_unbalanced_options_are_argument_error() {
        let shell = shell_with("hadolint", "2.12.0", |_| ShellOutput::default());
        let adapter = LinterAdapter::new(&LinterRegistry::builtin(), "hadolint", None, &shell).unwrap();

        let err = LintRunner::new(&adapter, &shell)
            .run(&files(), Some("--ignore 'DL3008"))
            .unwrap_err();
        assert!(matches!(err, Error::Argument(_)));
    }

    #[test]
    fn test_missing_since_fails_before_invoking() {
        let registry = LinterRegistry::new([(
            "hadolint".to_string(),
            LinterSpec {
                version_flag: "--version".to_string(),
                structured_output: Some(crate::linters::StructuredOutput {
                    flag: "--format json".to_string(),
                    since: None,
                }),
                code_prefix: None,
            },
        )]);
        let shell = shell_with("hadolint", "2.12.0", |_| ShellOutput::default());
        let adapter = LinterAdapter::new(&registry, "hadolint", None, &shell).unwrap();

        let err = LintRunner::new(&adapter, &shell).run(&files(), None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(shell.calls().len(), 1);
    }

    #[test]
    fn test_parse_structured_shellcheck_codes_and_levels() {
        let text = r#"[
            {"file":"a.sh","line":2,"endLine":2,"column":6,"endColumn":10,"level":"warning","code":2086,"message":"Double quote to prevent globbing","fix":null},
            {"file":"a.sh","line":5,"column":1,"level":"style","code":2006,"message":"Use $(...)"},
            {"message":"No level at all"}
        ]"#;

        let findings = parse_structured_output(text, Path::new("/work/a.sh"), Some("SC")).unwrap();

        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].code.as_deref(), Some("SC2086"));
        assert_eq!(findings[0].severity, Some(Severity::Warning));
        assert_eq!(findings[1].severity, Some(Severity::Other));
        assert_eq!(findings[1].level.as_deref(), Some("style"));
        assert_eq!(findings[2].severity, Some(Severity::Other));
        assert_eq!(findings[2].level, None);
        assert_eq!(findings[2].line, None);
    }

    #[test]
    fn test_normalize_code_keeps_prefixed_codes() {
        assert_eq!(normalize_code(RawCode::Text("SC1000".to_string()), Some("SC")), "SC1000");
        assert_eq!(normalize_code(RawCode::Text("DL3006".to_string()), None), "DL3006");
        assert_eq!(normalize_code(RawCode::Number(2086), None), "2086");
    }

    #[test]
    fn test_parse_plain_output_drops_blank_lines() {
        let findings = parse_plain_output("first\n   \n\t\r\n\nsecond\r\n", Path::new("/work/a.sh"));

        assert_eq!(
            findings.iter().map(|f| f.message.as_str()).collect::<Vec<_>>(),
            vec!["first", "second"]
        );
    }
}
