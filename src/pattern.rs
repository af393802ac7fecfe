//! @ai:module:intent Detect and expand shell glob patterns into file paths
//! @ai:module:layer infrastructure
//! @ai:module:public_api is_glob_pattern, expand
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use globset::GlobBuilder;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const META_CHARS: [char; 7] = ['*', '?', '[', ']', '{', '}', '\\'];
const EXTGLOB_PREFIXES: [char; 5] = ['@', '!', '+', '*', '?'];

/// @ai:intent Check whether a token uses glob syntax
/// @ai:effects pure
/// @ai:edge_cases escaped metacharacters (`\*`) do not count, unclosed `[` or `{` do not count, `{x}` without a comma does not count
pub fn is_glob_pattern(token: &str) -> bool {
    let chars: Vec<char> = token.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 2;
                continue;
            }
            '*' | '?' => return true,
            '[' => {
                if find_closing(&chars, i, '[', ']').is_some_and(|close| close > i + 1) {
                    return true;
                }
            }
            '{' => {
                if find_closing(&chars, i, '{', '}')
                    .is_some_and(|close| has_top_level(&chars[i + 1..close], ','))
                {
                    return true;
                }
            }
            '(' if opens_extglob(&chars, i) => {
                if find_closing(&chars, i, '(', ')').is_some() {
                    return true;
                }
            }
            _ => {}
        }
        i += 1;
    }

    false
}

/// @ai:intent Expand a glob pattern into the regular files it matches
/// @ai:pre is_glob_pattern(token)
/// @ai:post every returned path exists as a regular file and is anchored at working_dir
/// @ai:effects fs:read
/// @ai:edge_cases zero matches returns an empty vector; hidden entries only match a pattern part starting with `.`
pub fn expand(token: &str, working_dir: &Path) -> Result<Vec<PathBuf>> {
    if !is_glob_pattern(token) {
        return Err(Error::Argument(format!(
            "'{}' is not a valid glob pattern.",
            token
        )));
    }

    let pattern = translate_extglob(token)?;
    let pattern = pattern.strip_prefix("./").unwrap_or(&pattern);
    let absolute = Path::new(pattern).is_absolute();

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|e| Error::Argument(format!("'{}' is not a valid glob pattern: {}", token, e)))?
        .compile_matcher();

    let (base, rest) = split_literal_base(pattern);
    let root = match base {
        Some(base) if absolute => PathBuf::from(base),
        Some(base) => working_dir.join(base),
        None => working_dir.to_path_buf(),
    };
    if !root.is_dir() {
        tracing::debug!("Pattern '{}' has no base directory {}", token, root.display());
        return Ok(Vec::new());
    }

    let match_hidden = rest
        .iter()
        .any(|part| part.starts_with('.') || part.contains("{.") || part.contains(",."));
    let mut walker = WalkDir::new(&root).sort_by_file_name();
    if !rest.iter().any(|part| part.contains("**") || part.contains('{')) {
        walker = walker.max_depth(rest.len());
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || match_hidden || !is_hidden(entry))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable path while expanding '{}': {}", token, e);
                continue;
            }
        };

        let candidate = if absolute {
            entry.path()
        } else {
            match entry.path().strip_prefix(working_dir) {
                Ok(relative) => relative,
                Err(_) => continue,
            }
        };

        if matcher.is_match(candidate) && entry.path().is_file() {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("Pattern '{}' matched {} files", token, files.len());
    Ok(files)
}

/// @ai:intent Rewrite `@(a|b)` groups as `{a,b}`; other extglob operators are rejected
/// @ai:effects pure
fn translate_extglob(token: &str) -> Result<String> {
    let chars: Vec<char> = token.chars().collect();
    let mut out = String::with_capacity(token.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            out.extend(&chars[i..(i + 2).min(chars.len())]);
            i += 2;
            continue;
        }

        let group = (c == '(' && opens_extglob(&chars, i))
            .then(|| find_closing(&chars, i, '(', ')'))
            .flatten();

        match group {
            Some(close) if chars[i - 1] == '@' => {
                out.pop();
                out.push('{');
                let mut depth = 0usize;
                for &inner in &chars[i + 1..close] {
                    match inner {
                        '(' => depth += 1,
                        ')' => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    out.push(if inner == '|' && depth == 0 { ',' } else { inner });
                }
                out.push('}');
                i = close + 1;
            }
            Some(_) => {
                return Err(Error::Argument(format!(
                    "'{}' uses the extended glob operator '{}(...)', only '@(...)' is supported.",
                    token,
                    chars[i - 1]
                )));
            }
            None => {
                out.push(c);
                i += 1;
            }
        }
    }

    Ok(out)
}

/// Leading directory components without glob syntax, and the components after them.
fn split_literal_base(pattern: &str) -> (Option<String>, Vec<&str>) {
    let parts: Vec<&str> = pattern.split('/').collect();
    let literal = parts[..parts.len() - 1]
        .iter()
        .take_while(|part| !part.contains(META_CHARS))
        .count();

    let base = match parts[..literal].join("/") {
        base if !base.is_empty() => Some(base),
        _ if pattern.starts_with('/') => Some("/".to_string()),
        _ => None,
    };
    (base, parts[literal..].to_vec())
}

/// An unescaped extglob operator character directly before the `(` at `i`.
fn opens_extglob(chars: &[char], i: usize) -> bool {
    i > 0 && EXTGLOB_PREFIXES.contains(&chars[i - 1]) && !(i > 1 && chars[i - 2] == '\\')
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// @ai:intent Find the index of the delimiter closing the one at `open_idx`
/// @ai:effects pure
fn find_closing(chars: &[char], open_idx: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open_idx;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }

    None
}

/// Whether `needle` occurs outside nested braces and escapes.
fn has_top_level(chars: &[char], needle: char) -> bool {
    let mut depth = 0usize;
    let mut escaped = false;

    for &c in chars {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if c == needle && depth == 0 => return true,
            _ => {}
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, relative: &str) -> PathBuf {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    fn sorted(mut files: Vec<PathBuf>) -> Vec<PathBuf> {
        files.sort();
        files
    }

    #[test]
    fn test_is_glob_pattern_accepts_metacharacters() {
        for pattern in [
            "**/*.ts",
            "file?.sh",
            "Dockerfile.[ab]",
            "src/*.{js,ts}",
            "!(node_modules)",
            "@(a|b).sh",
        ] {
            assert!(is_glob_pattern(pattern), "expected glob: {}", pattern);
        }
    }

    #[test]
    fn test_is_glob_pattern_rejects_literals() {
        for token in [
            "invalid",
            "test/insecta/honeybee.json",
            "/abs/path/Dockerfile",
            "file\\*.sh",
            "esc\\@(a|b)",
            "brace{single}",
            "part{1..3}.sh",
            "open[",
            "empty[]",
            "",
        ] {
            assert!(!is_glob_pattern(token), "expected literal: {}", token);
        }
    }

    #[test]
    fn test_is_glob_pattern_on_huge_brace_body_is_cheap() {
        let token = format!("log{{1..{}}}.txt", u64::MAX);
        assert!(!is_glob_pattern(&token));
        assert!(is_glob_pattern("log{1,9000000000000}.txt"));
    }

    #[test]
    fn test_expand_rejects_non_glob() {
        let dir = TempDir::new().unwrap();
        let err = expand("invalid", dir.path()).unwrap_err();
        assert!(err.to_string().contains("is not a valid glob pattern"));
    }

    #[test]
    fn test_expand_no_matches_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(expand("*.not_existing", dir.path()).unwrap().is_empty());
        assert!(expand("missing/**/*.sh", dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_expand_recursive_with_braces() {
        let dir = TempDir::new().unwrap();
        let expected = vec![
            touch(dir.path(), "test/elephant.ts"),
            touch(dir.path(), "test/hedgehog.js"),
            touch(dir.path(), "test/insecta/butterfly.ts"),
            touch(dir.path(), "test/insecta/dragonfly.js"),
        ];
        touch(dir.path(), "test/insecta/honeybee.json");
        touch(dir.path(), "test/.hidden.ts");
        touch(dir.path(), "test/.cache/cached.js");

        let files = expand("test/**/*.{js,ts}", dir.path()).unwrap();

        assert_eq!(sorted(files), sorted(expected));
    }

    #[test]
    fn test_expand_star_stays_in_one_directory() {
        let dir = TempDir::new().unwrap();
        let top = touch(dir.path(), "run.sh");
        touch(dir.path(), "scripts/deep.sh");

        assert_eq!(expand("*.sh", dir.path()).unwrap(), vec![top.clone()]);
        assert_eq!(expand("./*.sh", dir.path()).unwrap(), vec![top]);
    }

    #[test]
    fn test_expand_hidden_when_pattern_names_a_dot() {
        let dir = TempDir::new().unwrap();
        let hidden = touch(dir.path(), ".github/workflows/ci.sh");

        assert!(expand("**/*.sh", dir.path()).unwrap().is_empty());
        assert_eq!(expand(".github/**/*.sh", dir.path()).unwrap(), vec![hidden]);
    }

    #[test]
    fn test_expand_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("scripts.d")).unwrap();
        let script = touch(dir.path(), "scripts.sh");

        let files = expand("scripts*", dir.path()).unwrap();
        assert_eq!(files, vec![script]);
    }

    #[test]
    fn test_expand_absolute_pattern() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "Dockerfile");
        let pattern = format!("{}/Docker*", dir.path().display());

        let other = TempDir::new().unwrap();
        let files = expand(&pattern, other.path()).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_expand_at_group_matches_alternatives() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.sh");
        let b = touch(dir.path(), "b.sh");
        touch(dir.path(), "c.sh");

        let files = expand("@(a|b).sh", dir.path()).unwrap();
        assert_eq!(sorted(files), vec![a, b]);
    }

    #[test]
    fn test_expand_rejects_unsupported_extglob() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.sh");

        for pattern in ["!(a).sh", "+(a).sh"] {
            let err = expand(pattern, dir.path()).unwrap_err();
            assert!(matches!(err, Error::Argument(_)), "expected error for {}", pattern);
            assert!(err.to_string().contains("extended glob"));
        }
    }

    #[test]
    fn test_translate_extglob() {
        assert_eq!(translate_extglob("src/@(a|b)/*.sh").unwrap(), "src/{a,b}/*.sh");
        assert_eq!(translate_extglob("plain/*.sh").unwrap(), "plain/*.sh");
        assert_eq!(translate_extglob("esc\\@(a|b)").unwrap(), "esc\\@(a|b)");
    }

    #[test]
    fn test_split_literal_base() {
        assert_eq!(split_literal_base("*.sh"), (None, vec!["*.sh"]));
        assert_eq!(
            split_literal_base("src/lib/**/*.rs"),
            (Some("src/lib".to_string()), vec!["**", "*.rs"])
        );
        assert_eq!(split_literal_base("/*.sh"), (Some("/".to_string()), vec!["*.sh"]));
        assert_eq!(
            split_literal_base("/opt/{a,b}/x"),
            (Some("/opt".to_string()), vec!["{a,b}", "x"])
        );
    }
}
