// src/subsystem.rs
//! Subsystem model: manifest parsing and tree discovery.
//!
//! A subsystem is any directory carrying a `dependencies.json` manifest.
//! Ownership of files is exclusive: a file belongs to the nearest enclosing
//! subsystem, skipping directories that are themselves declared subsystems.
//! Discovery is a pure read of the tree.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use walkdir::WalkDir;

use crate::cache::FileCache;
use crate::config::{is_source_file, is_test_file, should_prune, MANIFEST_FILE};
use crate::parse::SourceFile;
use crate::paths::PathContext;

/// Declared subsystem manifest. Unknown keys are ignored; a malformed file
/// deserializes to the default (empty) manifest upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub allowed: Vec<String>,
    #[serde(rename = "allowedChildren")]
    pub allowed_children: Vec<String>,
    /// Declared child subsystems, as `./name` entries.
    pub subsystems: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemKind {
    Boundary,
    Router,
    Domain,
    Page,
    App,
    Api,
    Utility,
    Unspecified,
}

impl FromStr for SubsystemKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "boundary" => Self::Boundary,
            "router" => Self::Router,
            "domain" => Self::Domain,
            "page" => Self::Page,
            "app" => Self::App,
            "api" => Self::Api,
            "utility" => Self::Utility,
            _ => Self::Unspecified,
        })
    }
}

impl fmt::Display for SubsystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Boundary => "boundary",
            Self::Router => "router",
            Self::Domain => "domain",
            Self::Page => "page",
            Self::App => "app",
            Self::Api => "api",
            Self::Utility => "utility",
            Self::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

/// One discovered subsystem. Built once per run, never mutated.
#[derive(Debug)]
pub struct SubsystemNode {
    pub path: PathBuf,
    pub name: String,
    pub kind: SubsystemKind,
    pub manifest: Arc<Manifest>,
    /// Files owned exclusively by this subsystem (child subsystems' files
    /// excluded, test files excluded).
    pub files: Vec<Arc<SourceFile>>,
    pub total_lines: usize,
    pub parent_dir: PathBuf,
}

impl SubsystemNode {
    /// Routers and APIs expose their children directly and are exempt from
    /// the interface-boundary rule.
    #[must_use]
    pub fn is_boundary_exempt(&self) -> bool {
        matches!(self.kind, SubsystemKind::Router | SubsystemKind::Api)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }
}

/// Walks the target tree and builds every subsystem node.
#[must_use]
pub fn discover(ctx: &PathContext, cache: &FileCache) -> Vec<SubsystemNode> {
    let mut nodes = Vec::new();

    for manifest_file in find_manifest_files(ctx) {
        let dir = manifest_file
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        let manifest = cache.manifest(&manifest_file);
        let files = owned_files(&dir, cache);
        let total_lines = files.iter().map(|f| f.lines).sum();

        // Declared type wins; paths under the domain container default to
        // "domain" when the manifest omits one.
        let kind = match &manifest.kind {
            Some(k) => k.parse().unwrap_or(SubsystemKind::Unspecified),
            None if ctx.is_domain_path(&dir) => SubsystemKind::Domain,
            None => SubsystemKind::Unspecified,
        };

        let name = dir
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().to_string());
        let parent_dir = dir.parent().map_or_else(PathBuf::new, Path::to_path_buf);

        nodes.push(SubsystemNode {
            path: dir,
            name,
            kind,
            manifest,
            files,
            total_lines,
            parent_dir,
        });
    }

    nodes.sort_by(|a, b| a.path.cmp(&b.path));
    nodes
}

/// All manifest files under the target root, skipping pruned directories
/// and traversal exemptions.
#[must_use]
pub fn find_manifest_files(ctx: &PathContext) -> Vec<PathBuf> {
    WalkDir::new(&ctx.target_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && (should_prune(&e.file_name().to_string_lossy())
                    || ctx.is_traversal_exception(e.path())))
        })
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == MANIFEST_FILE)
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Source files owned by a subsystem directory: direct files, plus files of
/// subdirectories that are not themselves subsystems, recursively.
#[must_use]
pub fn owned_files(dir: &Path, cache: &FileCache) -> Vec<Arc<SourceFile>> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            if !path.join(MANIFEST_FILE).exists()
                && !should_prune(&path.file_name().unwrap_or_default().to_string_lossy())
            {
                files.extend(owned_files(&path, cache));
            }
        } else if is_source_file(&path) && !is_test_file(&path) {
            files.push(cache.source(&path));
        }
    }

    files
}

/// All source files in a tree, tests excluded. Used by checks that scan
/// importers across subsystem boundaries.
#[must_use]
pub fn find_source_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir() && should_prune(&e.file_name().to_string_lossy()))
        })
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| is_source_file(p) && !is_test_file(p))
        .collect()
}

/// Line count of a directory respecting subsystem boundaries: direct source
/// files plus non-subsystem subdirectories, recursively. Documentation and
/// test files do not count.
#[must_use]
pub fn count_source_lines(dir: &Path, cache: &FileCache) -> usize {
    let mut total = 0;
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    for entry in entries.filter_map(std::result::Result::ok) {
        let path = entry.path();
        if path.is_dir() {
            if !path.join(MANIFEST_FILE).exists()
                && !should_prune(&path.file_name().unwrap_or_default().to_string_lossy())
            {
                total += count_source_lines(&path, cache);
            }
        } else if is_source_file(&path) && !is_test_file(&path) {
            total += cache.source(&path).lines;
        }
    }

    total
}

/// True if `dir` is declared in its parent manifest's `subsystems` array.
#[must_use]
pub fn is_declared_child(dir: &Path, cache: &FileCache) -> bool {
    let Some(parent) = dir.parent() else {
        return false;
    };
    let parent_manifest = parent.join(MANIFEST_FILE);
    if !parent_manifest.exists() {
        return false;
    }
    let manifest = cache.manifest(&parent_manifest);
    dir.file_name()
        .map(|n| format!("./{}", n.to_string_lossy()))
        .is_some_and(|name| manifest.subsystems.contains(&name))
}

/// True if `file` lies inside a child subsystem of `parent`.
#[must_use]
pub fn in_child_subsystem(file: &Path, parent: &SubsystemNode, all: &[SubsystemNode]) -> bool {
    all.iter()
        .filter(|node| node.parent_dir == parent.path)
        .any(|child| file.starts_with(&child.path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_deserializes_camel_case() {
        let m: Manifest = serde_json::from_str(
            r#"{"type": "router", "allowed": ["~/lib/auth"], "allowedChildren": ["~/components/ui"], "subsystems": ["./a", "./b"]}"#,
        )
        .unwrap();
        assert_eq!(m.kind.as_deref(), Some("router"));
        assert_eq!(m.allowed_children, vec!["~/components/ui"]);
        assert_eq!(m.subsystems.len(), 2);
    }

    #[test]
    fn kind_parses_with_unspecified_fallback(){
        assert_eq!("router".parse::<SubsystemKind>(), Ok(SubsystemKind::Router));
        assert_eq!("api".parse::<SubsystemKind>(), Ok(SubsystemKind::Api));
        assert_eq!("bogus".parse::<SubsystemKind>(), Ok(SubsystemKind::Unspecified));
    }

    #[test]
    fn owned_files_skip_child_subsystems() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.ts"), "export const a = 1;\n").unwrap();
        std::fs::create_dir_all(root.join("plain")).unwrap();
        std::fs::write(root.join("plain/b.ts"), "export const b = 2;\n").unwrap();
        std::fs::create_dir_all(root.join("child")).unwrap();
        std::fs::write(root.join("child/dependencies.json"), "{}").unwrap();
        std::fs::write(root.join("child/c.ts"), "export const c = 3;\n").unwrap();
        std::fs::write(root.join("a.test.ts"), "it('x', () => {});\n").unwrap();

        let cache = FileCache::new();
        let files = owned_files(root, &cache);
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(names.contains(&"a.ts".to_string()));
        assert!(names.contains(&"b.ts".to_string()));
        assert!(!names.contains(&"c.ts".to_string()));
        assert!(!names.contains(&"a.test.ts".to_string()));
    }
}
