//! @ai:module:intent Optional TOML configuration for extra linters and a default ignore path
//! @ai:module:layer infrastructure
//! @ai:module:public_api Config, LinterConfig, CONFIG_FILE_NAME
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::linters::{LinterRegistry, LinterSpec, StructuredOutput};
use crate::resolver::absolutize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no --config is given.
pub const CONFIG_FILE_NAME: &str = "global-linters.toml";

/// @ai:intent Settings read from global-linters.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Ignore file used when --ignore-path is not given
    #[serde(default)]
    pub ignore_path: Option<PathBuf>,
    #[serde(default)]
    pub linters: BTreeMap<String, LinterConfig>,
}

/// @ai:intent User-defined linter entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinterConfig {
    #[serde(default = "default_version_flag")]
    pub version_flag: String,
    pub structured_flag: Option<String>,
    pub structured_since: Option<String>,
    pub code_prefix: Option<String>,
}

fn default_version_flag() -> String {
    "--version".to_string()
}

impl From<LinterConfig> for LinterSpec {
    fn from(config: LinterConfig) -> Self {
        LinterSpec {
            version_flag: config.version_flag,
            structured_output: config.structured_flag.map(|flag| StructuredOutput {
                flag,
                since: config.structured_since,
            }),
            code_prefix: config.code_prefix,
        }
    }
}

impl Config {
    /// @ai:intent Parse configuration from TOML text
    /// @ai:effects pure
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    /// @ai:intent Load configuration from an explicit path or the working directory default
    /// @ai:post an explicit path must exist; a missing default yields Config::default()
    /// @ai:effects fs:read
    pub fn load(path: Option<&Path>, working_dir: &Path) -> Result<Self> {
        let path = match path {
            Some(path) => {
                let resolved = absolutize(path, working_dir);
                if !resolved.is_file() {
                    return Err(Error::Config(format!(
                        "Config path '{}' doesn't exist.",
                        path.display()
                    )));
                }
                resolved
            }
            None => {
                let default = working_dir.join(CONFIG_FILE_NAME);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        tracing::debug!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Could not read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// @ai:intent Build the process-wide registry: built-ins extended by configured linters
    /// @ai:effects pure
    pub fn registry(&self) -> LinterRegistry {
        LinterRegistry::builtin().with_overrides(
            self.linters
                .iter()
                .map(|(name, config)| (name.clone(), LinterSpec::from(config.clone()))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_default_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(None, dir.path()).unwrap();

        assert!(config.ignore_path.is_none());
        assert!(config.linters.is_empty());
        assert!(config.registry().contains("hadolint"));
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(Path::new("nope.toml")), dir.path()).unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_loads_default_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
ignore_path = ".lintignore"

[linters.yamllint]
structured_flag = "--format parsable"
structured_since = ">=1.0.0"

[linters.shellcheck]
version_flag = "-V"
"#,
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.ignore_path, Some(PathBuf::from(".lintignore")));

        let registry = config.registry();
        let yamllint = registry.get("yamllint").unwrap();
        assert_eq!(yamllint.version_flag, "--version");
        assert_eq!(
            yamllint.structured_output.as_ref().unwrap().since.as_deref(),
            Some(">=1.0.0")
        );

        let shellcheck = registry.get("shellcheck").unwrap();
        assert_eq!(shellcheck.version_flag, "-V");
        assert!(shellcheck.structured_output.is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = Config::from_toml("ignore_pth = \"x\"").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }
}
