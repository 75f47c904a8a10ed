// src/paths.rs
//! Path classification for import specifiers and scan-tree helpers.
//!
//! Import specifiers are classified exactly once, at parse time, into a
//! tagged type; legality logic matches on the tag instead of re-parsing
//! prefixes at every rule.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{IGNORE_FILE, ROOT_ALIAS};

/// `~/lib/domains/<name>/utils` or anything beneath it.
static DOMAIN_UTILS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^~/lib/domains/[^/]+/utils(?:/.*)?$").expect("valid regex"));

/// `~/lib/domains/<name>/utils/<file>` (a specific file, not the index).
static DOMAIN_UTILS_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^~/lib/domains/[^/]+/utils/[^/]+$").expect("valid regex"));

static DOMAIN_OF_SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^~/lib/domains/([^/]+)(?:/|$)").expect("valid regex"));

/// An import specifier, classified once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPath {
    /// Bare package specifier (`react`, `zod/v4`). Always legal.
    External,
    /// Root-alias path (`~/lib/domains/iam`), segments after the alias.
    RootRelative(Vec<String>),
    /// `./` or `../` path, segments including any `..` components.
    Relative(Vec<String>),
}

impl ImportPath {
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        if spec == ROOT_ALIAS || spec.starts_with("~/") {
            let rest = spec.strip_prefix("~/").unwrap_or("");
            let segments = rest
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            Self::RootRelative(segments)
        } else if spec.starts_with("./") || spec.starts_with("../") {
            let segments = spec
                .split('/')
                .filter(|s| !s.is_empty() && *s != ".")
                .map(str::to_string)
                .collect();
            Self::Relative(segments)
        } else {
            Self::External
        }
    }

    #[must_use]
    pub const fn is_external(&self) -> bool {
        matches!(self, Self::External)
    }

    #[must_use]
    pub const fn is_root_relative(&self) -> bool {
        matches!(self, Self::RootRelative(_))
    }

    #[must_use]
    pub fn is_upward_relative(&self) -> bool {
        matches!(self, Self::Relative(segments) if segments.first().is_some_and(|s| s == ".."))
    }
}

/// Scan-tree context: target root, project root, and rule exemptions from
/// the `.architecture-ignore` file.
#[derive(Debug)]
pub struct PathContext {
    pub target_root: PathBuf,
    pub project_root: PathBuf,
    rule_exceptions: HashSet<String>,
    traversal_exceptions: HashSet<String>,
}

impl PathContext {
    #[must_use]
    pub fn new(target_root: &Path) -> Self {
        let project_root = find_project_root(target_root);
        let mut ctx = Self {
            target_root: target_root.to_path_buf(),
            project_root,
            rule_exceptions: HashSet::new(),
            traversal_exceptions: HashSet::new(),
        };
        ctx.load_exceptions();
        ctx
    }

    fn load_exceptions(&mut self) {
        let ignore_file = self.project_root.join(IGNORE_FILE);
        let Ok(content) = fs::read_to_string(&ignore_file) else {
            // Conventional fallback when no ignore file is present.
            self.rule_exceptions.insert("src/components".to_string());
            return;
        };
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.rule_exceptions.insert(line.to_string());
            if line.contains("node_modules")
                || line.contains("__tests__")
                || line.contains("__fixtures__")
                || line.contains("__mocks__")
            {
                self.traversal_exceptions.insert(line.to_string());
            }
        }
    }

    /// True if the path should be skipped entirely during traversal.
    #[must_use]
    pub fn is_traversal_exception(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.traversal_exceptions
            .iter()
            .any(|exc| path_str.starts_with(exc.as_str()))
    }

    /// True if the path is exempt from architecture rules.
    #[must_use]
    pub fn is_rule_exception(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        for exc in &self.rule_exceptions {
            if path_str == exc.as_str() {
                return true;
            }
            if let Some(prefix) = exc.strip_suffix("/**") {
                if path_str.starts_with(&format!("{prefix}/")) {
                    return true;
                }
            } else if let Some(prefix) = exc.strip_suffix("**") {
                if path_str.starts_with(prefix) {
                    return true;
                }
            }
        }
        false
    }

    /// Root-alias form of a filesystem path under the target root
    /// (`src/lib/auth` -> `~/lib/auth`, the root itself -> `~`).
    #[must_use]
    pub fn alias_of(&self, path: &Path) -> String {
        match path.strip_prefix(&self.target_root) {
            Ok(rel) if rel.as_os_str().is_empty() => ROOT_ALIAS.to_string(),
            Ok(rel) => format!("{ROOT_ALIAS}/{}", rel.to_string_lossy()),
            Err(_) => ROOT_ALIAS.to_string(),
        }
    }

    /// Resolves a root-alias specifier back to a filesystem path.
    #[must_use]
    pub fn resolve_alias(&self, spec: &str) -> Option<PathBuf> {
        let rest = spec.strip_prefix("~/")?;
        Some(self.target_root.join(rest))
    }

    /// True for paths under the reserved domain container.
    #[must_use]
    pub fn is_domain_path(&self, path: &Path) -> bool {
        path.starts_with(self.target_root.join("lib").join("domains"))
    }

    /// Domain name of a filesystem path, if it lies inside a domain.
    #[must_use]
    pub fn domain_of_path(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.target_root).ok()?;
        let mut parts = rel.components().map(|c| c.as_os_str().to_string_lossy());
        if parts.next().as_deref() == Some("lib") && parts.next().as_deref() == Some("domains") {
            parts.next().map(|d| d.to_string())
        } else {
            None
        }
    }

    /// True if the path is a domain's `utils` subsystem directory.
    #[must_use]
    pub fn is_domain_utils_dir(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.target_root) else {
            return false;
        };
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        parts.len() == 4 && parts[0] == "lib" && parts[1] == "domains" && parts[3] == "utils"
    }

    /// True if the path is a domain's top-level directory.
    #[must_use]
    pub fn is_domain_root(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.target_root) else {
            return false;
        };
        let parts: Vec<_> = rel.components().collect();
        parts.len() == 3
            && parts[0].as_os_str() == "lib"
            && parts[1].as_os_str() == "domains"
    }
}

/// Domain name inside a root-alias specifier (`~/lib/domains/iam/...`).
#[must_use]
pub fn domain_of_spec(spec: &str) -> Option<&str> {
    DOMAIN_OF_SPEC_RE
        .captures(spec)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// True for `~/lib/domains/<d>/utils` and anything beneath it. These paths
/// are importable regardless of declared permissions.
#[must_use]
pub fn is_domain_utils_spec(spec: &str) -> bool {
    DOMAIN_UTILS_RE.is_match(spec)
}

/// True for a *specific file* under a domain's utils (not the utils index).
#[must_use]
pub fn is_domain_utils_file_spec(spec: &str) -> bool {
    DOMAIN_UTILS_FILE_RE.is_match(spec) && !spec.ends_with("/index")
}

/// Finds the project root by walking up from the target looking for
/// conventional markers; falls back to the target's parent.
fn find_project_root(target: &Path) -> PathBuf {
    const MARKERS: &[&str] = &["package.json", ".git", "pnpm-lock.yaml"];
    let start = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(target))
            .unwrap_or_else(|_| target.to_path_buf())
    };
    let mut current = start.clone();
    for _ in 0..10 {
        if MARKERS.iter().any(|m| current.join(m).exists()) {
            return current;
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    start.parent().map(Path::to_path_buf).unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_external() {
        assert_eq!(ImportPath::parse("react"), ImportPath::External);
        assert_eq!(ImportPath::parse("zod/v4"), ImportPath::External);
        assert_eq!(ImportPath::parse("@scope/pkg"), ImportPath::External);
    }

    #[test]
    fn classifies_root_relative() {
        let p = ImportPath::parse("~/lib/domains/iam");
        assert_eq!(
            p,
            ImportPath::RootRelative(vec!["lib".into(), "domains".into(), "iam".into()])
        );
        assert!(p.is_root_relative());
    }

    #[test]
    fn classifies_relative() {
        assert!(!ImportPath::parse("./utils").is_external());
        assert!(ImportPath::parse("../types").is_upward_relative());
        assert!(!ImportPath::parse("./child").is_upward_relative());
    }

    #[test]
    fn domain_spec_helpers() {
        assert!(is_domain_utils_spec("~/lib/domains/mapping/utils"));
        assert!(is_domain_utils_spec("~/lib/domains/mapping/utils/geo"));
        assert!(!is_domain_utils_spec("~/lib/domains/mapping/services"));
        assert!(is_domain_utils_file_spec("~/lib/domains/mapping/utils/geo"));
        assert!(!is_domain_utils_file_spec("~/lib/domains/mapping/utils"));
        assert!(!is_domain_utils_file_spec(
            "~/lib/domains/mapping/utils/index"
        ));
        assert_eq!(domain_of_spec("~/lib/domains/iam/services"), Some("iam"));
        assert_eq!(domain_of_spec("~/components/ui"), None);
    }

    #[test]
    fn alias_round_trip() {
        let ctx = PathContext::new(Path::new("src"));
        assert_eq!(ctx.alias_of(Path::new("src/lib/auth")), "~/lib/auth");
        assert_eq!(ctx.alias_of(Path::new("src")), "~");
        assert_eq!(
            ctx.resolve_alias("~/lib/auth"),
            Some(PathBuf::from("src/lib/auth"))
        );
    }
}
