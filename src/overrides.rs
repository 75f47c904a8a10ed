// src/overrides.rs
//! Threshold overrides from `.architecture-exceptions` files.
//!
//! Line-oriented, one rule per line:
//!   `path: threshold  # justification`            (directory/file scope)
//!   `path:function:threshold  # justification`    (function scope)
//! Blank lines and `#` comments are ignored; invalid lines warn and are
//! skipped. Files are discovered by walking from the target directory up
//! to the project root; the first file found wins per exact key.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::EXCEPTIONS_FILE;

#[derive(Debug, Clone)]
pub struct Override {
    pub path: String,
    pub function: Option<String>,
    pub threshold: usize,
    pub justification: String,
    pub source: PathBuf,
}

#[derive(Debug, Default)]
pub struct OverrideSet {
    project_root: PathBuf,
    path_overrides: HashMap<String, Override>,
    function_overrides: HashMap<String, Override>,
    loaded_files: Vec<PathBuf>,
}

impl OverrideSet {
    /// Loads every exceptions file from `target` up to `project_root`.
    /// Closer files take precedence: keys already seen are not replaced.
    #[must_use]
    pub fn load(target: &Path, project_root: &Path) -> Self {
        let mut set = Self {
            project_root: project_root.to_path_buf(),
            ..Self::default()
        };

        let mut current = if target.is_absolute() {
            target.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(target))
                .unwrap_or_else(|_| target.to_path_buf())
        };

        for _ in 0..20 {
            let candidate = current.join(EXCEPTIONS_FILE);
            if candidate.exists() {
                set.parse_file(&candidate);
            }
            if current == *project_root {
                break;
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        set
    }

    fn parse_file(&mut self, file: &Path) {
        let Ok(content) = fs::read_to_string(file) else {
            eprintln!("Warning: could not read {}", file.display());
            return;
        };
        self.loaded_files.push(file.to_path_buf());

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_line(line) {
                Ok((path, function, threshold, justification)) => {
                    if justification.len() < 10 {
                        eprintln!(
                            "Warning: insufficient justification for {path} exception (in {}:{})",
                            file.display(),
                            line_no + 1
                        );
                    }
                    let rule = Override {
                        path: path.clone(),
                        function: function.clone(),
                        threshold,
                        justification,
                        source: file.to_path_buf(),
                    };
                    match function {
                        Some(func) => {
                            self.function_overrides
                                .entry(format!("{path}:{func}"))
                                .or_insert(rule);
                        }
                        None => {
                            self.path_overrides.entry(path).or_insert(rule);
                        }
                    }
                }
                Err(reason) => {
                    eprintln!(
                        "Warning: {} (in {}:{}): {line}",
                        reason,
                        file.display(),
                        line_no + 1
                    );
                }
            }
        }
    }

    /// Override for a directory or file, by exact key.
    #[must_use]
    pub fn for_path(&self, path: &Path) -> Option<&Override> {
        let normalized = self.normalize(path);
        if let Some(rule) = self.path_overrides.get(&normalized) {
            return Some(rule);
        }
        normalized
            .strip_prefix("src/")
            .and_then(|bare| self.path_overrides.get(bare))
    }

    /// Override for a specific function; exact key first (with and without
    /// the conventional `src/` prefix), then `*` and `?` wildcard patterns.
    #[must_use]
    pub fn for_function(&self, file: &str, function: &str) -> Option<&Override> {
        let key = format!("{file}:{function}");
        let prefixed = format!("src/{key}");
        if let Some(rule) = self
            .function_overrides
            .get(&key)
            .or_else(|| self.function_overrides.get(&prefixed))
        {
            return Some(rule);
        }
        self.function_overrides
            .iter()
            .find(|(pattern, _)| wildcard_match(pattern, &key) || wildcard_match(pattern, &prefixed))
            .map(|(_, rule)| rule)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path_overrides.is_empty() && self.function_overrides.is_empty()
    }

    #[must_use]
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }

    fn normalize(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Parses one rule line into (path, function, threshold, justification).
fn parse_line(line: &str) -> Result<(String, Option<String>, usize, String), &'static str> {
    let (content, justification) = match line.split_once('#') {
        Some((c, j)) => (c.trim(), j.trim().to_string()),
        None => return Err("missing '#' separator for justification"),
    };

    if justification.is_empty() {
        return Err("empty justification");
    }

    let parts: Vec<&str> = content.splitn(3, ':').map(str::trim).collect();
    let (path, function, threshold_str) = match parts.as_slice() {
        [path, func, threshold] => (*path, Some((*func).to_string()), *threshold),
        [path, threshold] => (*path, None, *threshold),
        _ => return Err("missing ':' separator"),
    };

    if path.is_empty() {
        return Err("empty path");
    }
    if path.starts_with('/') {
        return Err("path must be relative");
    }

    let threshold: usize = threshold_str
        .parse()
        .map_err(|_| "invalid threshold value")?;
    if threshold == 0 {
        return Err("threshold must be positive");
    }

    Ok((path.to_string(), function, threshold, justification))
}

/// Minimal `*`/`?` glob matching for function-override keys.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    // dp[i][j]: pattern[..i] matches text[..j]
    let mut dp = vec![vec![false; t.len() + 1]; p.len() + 1];
    dp[0][0] = true;
    for i in 1..=p.len() {
        if p[i - 1] == '*' {
            dp[i][0] = dp[i - 1][0];
        }
    }
    for i in 1..=p.len() {
        for j in 1..=t.len() {
            dp[i][j] = match p[i - 1] {
                '*' => dp[i - 1][j] || dp[i][j - 1],
                '?' => dp[i - 1][j - 1],
                c => dp[i - 1][j - 1] && c == t[j - 1],
            };
        }
    }
    dp[p.len()][t.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_and_function_forms() {
        let (path, func, threshold, just) =
            parse_line("src/lib/legacy: 2000 # grandfathered module pending split").unwrap();
        assert_eq!(path, "src/lib/legacy");
        assert!(func.is_none());
        assert_eq!(threshold, 2000);
        assert!(just.contains("grandfathered"));

        let (path, func, threshold, _) =
            parse_line("src/lib/a.ts:bigHandler:80 # protocol state machine").unwrap();
        assert_eq!(path, "src/lib/a.ts");
        assert_eq!(func.as_deref(), Some("bigHandler"));
        assert_eq!(threshold, 80);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("no separators at all").is_err());
        assert!(parse_line("src/a: 100").is_err()); // no justification
        assert!(parse_line("src/a: zero # justified enough here").is_err());
        assert!(parse_line("/absolute: 10 # justified enough here").is_err());
        assert!(parse_line("src/a: 0 # justified enough here").is_err());
    }

    #[test]
    fn closest_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let nested = root.join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            root.join(EXCEPTIONS_FILE),
            "src/deep/a.ts: 100 # root-level grant for legacy parser\n",
        )
        .unwrap();
        std::fs::write(
            nested.join(EXCEPTIONS_FILE),
            "src/deep/a.ts: 50 # closer grant must take precedence\n",
        )
        .unwrap();

        let set = OverrideSet::load(&nested, root);
        let rule = set.for_path(&root.join("src/deep/a.ts")).unwrap();
        assert_eq!(rule.threshold, 50);
        assert_eq!(set.loaded_files().len(), 2);
    }

    #[test]
    fn function_wildcard_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(
            root.join(EXCEPTIONS_FILE),
            "src/gen/*.ts:render:120 # generated render tables are flat\n",
        )
        .unwrap();

        let set = OverrideSet::load(root, root);
        assert!(set.for_function("src/gen/big.ts", "render").is_some());
        assert!(set.for_function("src/gen/big.ts", "other").is_none());
        assert!(set.for_function("src/lib/big.ts", "render").is_none());
    }

    #[test]
    fn src_prefix_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(
            root.join(EXCEPTIONS_FILE),
            "lib/legacy: 3000 # pre-split module tracked in backlog\n",
        )
        .unwrap();
        let set = OverrideSet::load(root, root);
        assert!(set.for_path(&root.join("src/lib/legacy")).is_some());
    }
}
