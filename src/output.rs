//! @ai:module:intent Format lint reports for the console (text, JSON)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_report
//! @ai:module:depends_on report
//! @ai:module:stateless true

use crate::report::{LintFinding, LintReport, OutputMode, Severity};
use colored::{ColoredString, Colorize};

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format a lint report as a string
/// @ai:effects pure
pub fn format_report(report: &LintReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Text => match report.output_mode() {
            OutputMode::PlainText => format_plain_text(report),
            OutputMode::Structured => format_structured(report),
        },
    }
}

/// @ai:intent List raw linter lines grouped under their file
/// @ai:effects pure
fn format_plain_text(report: &LintReport) -> String {
    let mut output = String::new();
    let mut current_file = None;

    for finding in report.findings() {
        if current_file != Some(&finding.file) {
            current_file = Some(&finding.file);
            output.push('\n');
            output.push_str(&format!("{}\n", finding.file.display().to_string().underline()));
        }
        output.push_str(&format!("{}\n", finding.message.yellow()));
    }

    output
}

/// Column widths for aligned structured output.
#[derive(Debug, Default)]
struct Widths {
    line: usize,
    column: usize,
    level: usize,
    message: usize,
}

impl Widths {
    fn measure(findings: &[LintFinding]) -> Self {
        findings.iter().fold(Self::default(), |w, f| Self {
            line: w.line.max(number_text(f.line).len()),
            column: w.column.max(number_text(f.column).len()),
            level: w.level.max(level_text(f).len()),
            message: w.message.max(f.message.chars().count()),
        })
    }
}

/// @ai:intent Aligned `line:column  level  message  code` rows plus a problem summary
/// @ai:effects pure
fn format_structured(report: &LintReport) -> String {
    let mut output = String::new();
    let widths = Widths::measure(report.findings());
    let mut current_file = None;

    for finding in report.findings() {
        if current_file != Some(&finding.file) {
            current_file = Some(&finding.file);
            output.push('\n');
            output.push_str(&format!("{}\n", finding.file.display().to_string().underline()));
        }

        let position = format!(
            "{:>lw$}:{:<cw$}",
            number_text(finding.line),
            number_text(finding.column),
            lw = widths.line,
            cw = widths.column
        );
        let level = format!("{:<w$}", level_text(finding), w = widths.level);
        let message = format!("{:<w$}", finding.message, w = widths.message);

        output.push_str(&format!(
            "  {}  {}  {}  {}\n",
            position.dimmed(),
            colorize_level(level, finding.severity),
            message,
            finding.code.as_deref().unwrap_or_default().dimmed()
        ));
    }
    output.push('\n');

    let count = &report.summary().count;
    let problems = report.summary().problems();
    if problems > 0 {
        let line = format!(
            "✗ {} {} ({} {}, {} {})",
            problems,
            pluralise("problem", problems),
            count.error,
            pluralise("error", count.error),
            count.warning,
            pluralise("warning", count.warning)
        );
        let line = if count.error > 0 {
            line.red().bold()
        } else {
            line.yellow().bold()
        };
        output.push_str(&format!("{}\n", line));
    }

    output
}

fn number_text(value: Option<u32>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

fn level_text(finding: &LintFinding) -> &str {
    finding.level.as_deref().unwrap_or("other")
}

fn colorize_level(level: String, severity: Option<Severity>) -> ColoredString {
    match severity {
        Some(Severity::Error) => level.red(),
        Some(Severity::Info) => level.white(),
        _ => level.yellow(),
    }
}

fn pluralise(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
