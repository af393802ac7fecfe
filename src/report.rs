//! @ai:module:intent Normalized lint findings and the per-run report
//! @ai:module:layer domain
//! @ai:module:public_api Severity, LintFinding, LintSummary, SeverityCount, OutputMode, LintReport
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// @ai:intent Severity bucket used to tally findings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Other,
}

impl Severity {
    /// @ai:intent Map a linter's level text to a bucket
    /// @ai:effects pure
    /// @ai:edge_cases unknown levels (e.g. "style") map to Other
    pub fn from_level(level: &str) -> Self {
        match level.trim().to_ascii_lowercase().as_str() {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            "info" => Severity::Info,
            _ => Severity::Other,
        }
    }
}

/// @ai:intent One diagnostic reported by a linter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LintFinding {
    pub file: PathBuf,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Level text exactly as the linter reported it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl LintFinding {
    /// @ai:intent Finding from a plain-text output line
    /// @ai:effects pure
    pub fn plain(file: PathBuf, message: impl Into<String>) -> Self {
        Self {
            file,
            message: message.into(),
            line: None,
            column: None,
            severity: None,
            level: None,
            code: None,
        }
    }
}

/// @ai:intent Number of findings per severity bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SeverityCount {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub other: usize,
}

/// @ai:intent Severity tally for one run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LintSummary {
    pub count: SeverityCount,
}

impl LintSummary {
    /// @ai:intent Count one finding in its bucket
    /// @ai:effects pure
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.count.error += 1,
            Severity::Warning => self.count.warning += 1,
            Severity::Info => self.count.info += 1,
            Severity::Other => self.count.other += 1,
        }
    }

    /// @ai:intent Errors plus warnings
    pub fn problems(&self) -> usize {
        self.count.error + self.count.warning
    }
}

/// @ai:intent Whether a run parsed JSON output or plain text lines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputMode {
    #[serde(rename = "JSON")]
    Structured,
    #[serde(rename = "plain-text")]
    PlainText,
}

/// @ai:intent Immutable outcome of linting a set of files
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LintReport {
    #[serde(rename = "type")]
    output_mode: OutputMode,
    #[serde(rename = "results")]
    findings: Vec<LintFinding>,
    summary: LintSummary,
}

impl LintReport {
    /// @ai:intent Build a report, deriving the summary from the findings
    /// @ai:post summary counts every finding carrying a severity
    /// @ai:effects pure
    pub fn new(output_mode: OutputMode, findings: Vec<LintFinding>) -> Self {
        let mut summary = LintSummary::default();
        for severity in findings.iter().filter_map(|f| f.severity) {
            summary.record(severity);
        }

        Self {
            output_mode,
            findings,
            summary,
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn findings(&self) -> &[LintFinding] {
        &self.findings
    }

    pub fn summary(&self) -> &LintSummary {
        &self.summary
    }

    /// @ai:intent Check if linting passed (no errors)
    pub fn passed(&self) -> bool {
        self.summary.count.error == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn structured(level: &str) -> LintFinding {
        LintFinding {
            file: PathBuf::from("/work/Dockerfile"),
            message: "Always tag the version of an image explicitly".to_string(),
            line: Some(1),
            column: Some(1),
            severity: Some(Severity::from_level(level)),
            level: Some(level.to_string()),
            code: Some("DL3006".to_string()),
        }
    }

    #[test]
    fn test_severity_from_level() {
        assert_eq!(Severity::from_level("error"), Severity::Error);
        assert_eq!(Severity::from_level("Warning"), Severity::Warning);
        assert_eq!(Severity::from_level("info"), Severity::Info);
        assert_eq!(Severity::from_level("style"), Severity::Other);
        assert_eq!(Severity::from_level("unknown_thing"), Severity::Other);
    }

    #[test]
    fn test_summary_counts_buckets() {
        let report = LintReport::new(
            OutputMode::Structured,
            vec![
                structured("error"),
                structured("warning"),
                structured("warning"),
                structured("info"),
                structured("style"),
            ],
        );

        assert_eq!(
            report.summary().count,
            SeverityCount {
                error: 1,
                warning: 2,
                info: 1,
                other: 1,
            }
        );
        assert_eq!(report.summary().problems(), 3);
        assert!(!report.passed());
    }

    #[test]
    fn test_plain_findings_are_not_counted() {
        let report = LintReport::new(
            OutputMode::PlainText,
            vec![LintFinding::plain(PathBuf::from("/work/a.sh"), "a.sh:1 something")],
        );

        assert_eq!(report.summary().count, SeverityCount::default());
        assert!(report.passed());
    }

    #[test]
    fn test_serializes_with_report_field_names() {
        let report = LintReport::new(OutputMode::PlainText, vec![]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "plain-text",
                "results": [],
                "summary": { "count": { "error": 0, "warning": 0, "info": 0, "other": 0 } }
            })
        );
    }
}
