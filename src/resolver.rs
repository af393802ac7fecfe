//! @ai:module:intent Resolve file paths and glob patterns into the set of files to lint
//! @ai:module:layer application
//! @ai:module:public_api FileResolver, ResolvedFiles, absolutize
//! @ai:module:depends_on pattern, ignore_filter, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::ignore_filter::IgnoreFilter;
use crate::pattern;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// @ai:intent Deduplicated set of absolute file paths ready for linting
/// @ai:invariant no duplicates, every entry is absolute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedFiles {
    files: Vec<PathBuf>,
}

impl ResolvedFiles {
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|file| file == path)
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.files
    }
}

impl FromIterator<PathBuf> for ResolvedFiles {
    /// @ai:intent Collect paths, keeping the first occurrence of each
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let files = iter
            .into_iter()
            .filter(|path| seen.insert(path.clone()))
            .collect();
        Self { files }
    }
}

impl<'a> IntoIterator for &'a ResolvedFiles {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// @ai:intent Turns CLI tokens (paths and globs) into a ResolvedFiles set
#[derive(Debug, Clone)]
pub struct FileResolver {
    working_dir: PathBuf,
}

impl FileResolver {
    /// @ai:intent Create a resolver anchored at the given directory
    /// @ai:pre working_dir is absolute
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            working_dir: absolutize(&working_dir, Path::new("/")),
        }
    }

    /// @ai:intent Create a resolver anchored at the process working directory
    /// @ai:effects env
    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// @ai:intent Resolve tokens into deduplicated, ignore-filtered absolute paths
    /// @ai:pre tokens are file paths or glob patterns
    /// @ai:post result has no duplicates
    /// @ai:effects fs:read
    /// @ai:edge_cases a glob with no matches contributes nothing; no_ignore skips ignore_path validation
    pub fn resolve<S: AsRef<str>>(
        &self,
        tokens: &[S],
        no_ignore: bool,
        ignore_path: Option<&Path>,
    ) -> Result<ResolvedFiles> {
        let mut collected = Vec::new();

        for token in tokens {
            let token = token.as_ref();
            if pattern::is_glob_pattern(token) {
                let matches = pattern::expand(token, &self.working_dir)?;
                collected.extend(matches.iter().map(|path| absolutize(path, &self.working_dir)));
            } else {
                let path = absolutize(Path::new(token), &self.working_dir);
                if !path.is_file() {
                    return Err(Error::Argument(format!(
                        "'{}' is neither an existing file nor a valid glob pattern.",
                        token
                    )));
                }
                collected.push(path);
            }
        }

        let files: ResolvedFiles = collected.into_iter().collect();

        if no_ignore {
            tracing::debug!("Resolved {} files, ignore rules disabled", files.len());
            return Ok(files);
        }

        let filter = IgnoreFilter::new(ignore_path, &self.working_dir)?;
        let files: ResolvedFiles = filter.filter(files.into_vec()).into_iter().collect();
        tracing::debug!("Resolved {} files", files.len());

        Ok(files)
    }
}

/// @ai:intent Make a path absolute against `base` and drop `.`/`..` components
/// @ai:effects pure
/// @ai:example absolutize("src/../a.sh", "/work") -> "/work/a.sh"
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}
