//! @ai:module:intent Parse npm-style version ranges and test versions against them
//! @ai:module:layer domain
//! @ai:module:public_api VersionRange
//! @ai:module:depends_on error
//! @ai:module:stateless true
//!
//! Ranges use the node-semver grammar linters are documented with:
//! `>=1.5.0`, `>=1.0.0 <2.0.0`, `1.0.0 - 2.0.0`, `1.x || 2.x`, `~1.2`, `^0.4.0`.
//! Each `||` alternative is translated into a `semver::VersionReq`.

use crate::error::{Error, Result};
use regex::Regex;
use semver::{Version, VersionReq};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static HYPHEN_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+-\s+(\S+)$").expect("Invalid regex"));

static OPERATOR_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([<>=~^]+)\s+").expect("Invalid regex"));

/// @ai:intent A parsed version range: satisfied when any alternative matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// @ai:intent Parse a range expression
    /// @ai:effects pure
    /// @ai:edge_cases an empty expression or `*` matches every version; a bare full version means exactly that version
    pub fn parse(range: &str) -> Result<Self> {
        let alternatives = range
            .split("||")
            .map(translate_alternative)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::InvalidRange(range.to_string()))?;

        Ok(Self {
            raw: range.trim().to_string(),
            alternatives,
        })
    }

    /// @ai:intent Check whether a version satisfies the range
    /// @ai:effects pure
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for VersionRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Space-separated comparator set (or a hyphen range) to a comma-separated requirement.
fn translate_alternative(alternative: &str) -> Option<VersionReq> {
    let alternative = alternative.trim();

    if let Some(captures) = HYPHEN_RANGE.captures(alternative) {
        let lower = strip_v(&captures[1]);
        let upper = strip_v(&captures[2]);
        return VersionReq::parse(&format!(">={}, <={}", lower, upper)).ok();
    }

    let joined = OPERATOR_GAP.replace_all(alternative, "$1");
    let comparators = joined
        .split_whitespace()
        .map(translate_comparator)
        .collect::<Option<Vec<_>>>()?;

    // `*` is a no-op inside a set, and VersionReq only accepts it alone
    let comparators: Vec<String> = comparators.into_iter().flatten().collect();
    if comparators.is_empty() {
        return Some(VersionReq::STAR);
    }

    VersionReq::parse(&comparators.join(", ")).ok()
}

/// One comparator in VersionReq syntax, None inside Some for a match-all wildcard.
fn translate_comparator(comparator: &str) -> Option<Option<String>> {
    let split = comparator
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '~' | '^'))
        .unwrap_or(comparator.len());
    let (operator, version) = comparator.split_at(split);
    let version = strip_v(version);

    let (numbers, rest) = split_numeric_parts(version)?;
    if numbers.is_empty() {
        // `*`, `x`, `>=*` and friends
        return match operator {
            "" | "=" | ">=" | "<=" | "~" | "^" => Some(None),
            _ => None,
        };
    }
    let partial = numbers.join(".");

    match operator {
        "" | "=" if numbers.len() == 3 => Some(Some(format!("={}{}", partial, rest))),
        "" | "=" => Some(Some(format!("={}", partial))),
        _ if numbers.len() == 3 => Some(Some(format!("{}{}{}", operator, partial, rest))),
        _ => Some(Some(format!("{}{}", operator, partial))),
    }
}

/// Numeric components up to the first wildcard, plus any pre-release/build suffix.
fn split_numeric_parts(version: &str) -> Option<(Vec<&str>, &str)> {
    let end = version.find(['-', '+']).unwrap_or(version.len());
    let (core, rest) = version.split_at(end);

    let mut numbers = Vec::new();
    for part in core.split('.') {
        match part {
            "x" | "X" | "*" => break,
            _ if !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()) => {
                numbers.push(part);
            }
            _ => return None,
        }
    }

    if numbers.len() > 3 || (numbers.len() < 3 && !rest.is_empty()) {
        return None;
    }
    Some((numbers, rest))
}

fn strip_v(version: &str) -> &str {
    version.strip_prefix(['v', 'V']).unwrap_or(version)
}
