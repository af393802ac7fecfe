//! @ai:module:intent Filter file lists against .gitignore-style ignore files
//! @ai:module:layer infrastructure
//! @ai:module:public_api IgnoreFilter, DEFAULT_IGNORE_PATH
//! @ai:module:depends_on error, resolver
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::resolver::absolutize;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::path::{Path, PathBuf};

/// Ignore file picked up from the working directory when none is given.
pub const DEFAULT_IGNORE_PATH: &str = ".prettierignore";

/// @ai:intent Removes paths matched by the rules of an ignore file
#[derive(Debug)]
pub struct IgnoreFilter {
    working_dir: PathBuf,
    ignore_path: Option<PathBuf>,
    matcher: Option<Gitignore>,
}

impl IgnoreFilter {
    /// @ai:intent Load the ignore rules for a working directory
    /// @ai:pre working_dir is absolute
    /// @ai:post without an explicit path, falls back to DEFAULT_IGNORE_PATH or a no-op filter
    /// @ai:effects fs:read
    /// @ai:edge_cases an explicit ignore path that does not exist is a Config error
    pub fn new(ignore_path: Option<&Path>, working_dir: &Path) -> Result<Self> {
        let ignore_path = match ignore_path {
            Some(path) => {
                let resolved = absolutize(path, working_dir);
                if !resolved.exists() {
                    return Err(Error::Config(format!(
                        "Ignore path '{}' doesn't exist.",
                        path.display()
                    )));
                }
                Some(resolved)
            }
            None => {
                let default = working_dir.join(DEFAULT_IGNORE_PATH);
                if default.is_file() {
                    Some(default)
                } else {
                    tracing::debug!(
                        "Default ignore path '{}' doesn't exist, nothing will be ignored",
                        DEFAULT_IGNORE_PATH
                    );
                    None
                }
            }
        };

        let matcher = match &ignore_path {
            Some(path) => Some(build_matcher(path, working_dir)?),
            None => None,
        };

        Ok(Self {
            working_dir: working_dir.to_path_buf(),
            ignore_path,
            matcher,
        })
    }

    /// @ai:intent Path of the ignore file in use, if any
    pub fn ignore_path(&self) -> Option<&Path> {
        self.ignore_path.as_deref()
    }

    /// @ai:intent Check one path against the rules
    /// @ai:effects pure
    /// @ai:edge_cases paths outside the working directory are never ignored
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };

        let absolute = absolutize(path, &self.working_dir);
        match absolute.strip_prefix(&self.working_dir) {
            Ok(relative) if !relative.as_os_str().is_empty() => matcher
                .matched_path_or_any_parents(relative, false)
                .is_ignore(),
            _ => false,
        }
    }

    /// @ai:intent Keep the paths not matched by the rules, in absolute form
    /// @ai:post input order is preserved
    /// @ai:effects pure
    pub fn filter(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths
            .into_iter()
            .filter(|path| {
                let ignored = self.is_ignored(path);
                if ignored {
                    tracing::debug!("Ignoring {}", path.display());
                }
                !ignored
            })
            .map(|path| absolutize(&path, &self.working_dir))
            .collect()
    }
}

/// @ai:intent Compile an ignore file into a matcher rooted at the working directory
/// @ai:effects fs:read
fn build_matcher(path: &Path, working_dir: &Path) -> Result<Gitignore> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Could not read ignore path '{}': {}",
            path.display(),
            e
        ))
    })?;

    let mut builder = GitignoreBuilder::new(working_dir);
    for line in contents.lines() {
        builder.add_line(None, line).map_err(|e| {
            Error::Config(format!(
                "Invalid pattern '{}' in ignore path '{}': {}",
                line,
                path.display(),
                e
            ))
        })?;
    }

    builder.build().map_err(|e| {
        Error::Config(format!(
            "Could not compile ignore path '{}': {}",
            path.display(),
            e
        ))
    })
}
