//! @ai:module:intent Registry of supported linters and how to talk to them
//! @ai:module:layer domain
//! @ai:module:public_api LinterSpec, StructuredOutput, LinterRegistry
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// @ai:intent How a linter is asked for machine-readable output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredOutput {
    /// Arguments enabling JSON output, split with shell-word rules (e.g. "--format json")
    pub flag: String,
    /// Version range from which the flag is available
    pub since: Option<String>,
}

/// @ai:intent Static description of one supported linter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinterSpec {
    pub version_flag: String,
    pub structured_output: Option<StructuredOutput>,
    /// Prepended to bare rule codes in structured output (shellcheck reports 2086, not SC2086)
    pub code_prefix: Option<String>,
}

impl LinterSpec {
    /// @ai:intent Spec for a linter that only produces plain text
    /// @ai:effects pure
    pub fn plain(version_flag: &str) -> Self {
        Self {
            version_flag: version_flag.to_string(),
            structured_output: None,
            code_prefix: None,
        }
    }

    /// @ai:intent Spec for a linter with a JSON output flag
    /// @ai:effects pure
    pub fn structured(version_flag: &str, flag: &str, since: &str) -> Self {
        Self {
            version_flag: version_flag.to_string(),
            structured_output: Some(StructuredOutput {
                flag: flag.to_string(),
                since: Some(since.to_string()),
            }),
            code_prefix: None,
        }
    }

    pub fn with_code_prefix(mut self, prefix: &str) -> Self {
        self.code_prefix = Some(prefix.to_string());
        self
    }
}

/// @ai:intent Immutable name -> LinterSpec map, built once at startup
/// @ai:invariant never mutated after construction; extended only through new()/with_overrides()
#[derive(Debug, Clone, Default)]
pub struct LinterRegistry {
    linters: BTreeMap<String, LinterSpec>,
}

impl LinterRegistry {
    /// @ai:intent Build a registry from explicit entries
    /// @ai:effects pure
    pub fn new(linters: impl IntoIterator<Item = (String, LinterSpec)>) -> Self {
        Self {
            linters: linters.into_iter().collect(),
        }
    }

    /// @ai:intent Registry of the linters supported out of the box
    /// @ai:effects pure
    pub fn builtin() -> Self {
        Self::new([
            (
                "hadolint".to_string(),
                LinterSpec::structured("--version", "--format json", ">=1.5.0"),
            ),
            (
                "shellcheck".to_string(),
                LinterSpec::structured("--version", "--format json", ">=0.4.0")
                    .with_code_prefix("SC"),
            ),
        ])
    }

    /// @ai:intent Produce a new registry where `overrides` add to or replace entries
    /// @ai:effects pure
    pub fn with_overrides(&self, overrides: impl IntoIterator<Item = (String, LinterSpec)>) -> Self {
        let mut linters = self.linters.clone();
        linters.extend(overrides);
        Self { linters }
    }

    pub fn get(&self, name: &str) -> Option<&LinterSpec> {
        self.linters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.linters.contains_key(name)
    }

    /// @ai:intent Supported linter names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.linters.keys().map(String::as_str)
    }
}
