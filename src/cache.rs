// src/cache.rs
//! Read-through caches for parsed sources and manifests.
//!
//! Constructed once per run and passed to every component that needs it,
//! so parallel workers share one view. A write race recomputes redundantly,
//! which is acceptable: parsing is a pure function of file content.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::parse::SourceFile;
use crate::subsystem::Manifest;

#[derive(Debug, Default)]
pub struct FileCache {
    files: RwLock<HashMap<PathBuf, Arc<SourceFile>>>,
    manifests: RwLock<HashMap<PathBuf, Arc<Manifest>>>,
}

impl FileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed facts for a source file. Unreadable files parse as empty.
    #[must_use]
    pub fn source(&self, path: &Path) -> Arc<SourceFile> {
        if let Some(cached) = self.files.read().expect("cache lock").get(path) {
            return Arc::clone(cached);
        }

        let text = fs::read_to_string(path).unwrap_or_default();
        let parsed = Arc::new(SourceFile::parse(path, text));
        self.files
            .write()
            .expect("cache lock")
            .entry(path.to_path_buf())
            .or_insert(parsed)
            .clone()
    }

    /// Parsed manifest for a `dependencies.json` path. Malformed or
    /// unreadable manifests are treated as empty, not fatal.
    #[must_use]
    pub fn manifest(&self, path: &Path) -> Arc<Manifest> {
        if let Some(cached) = self.manifests.read().expect("cache lock").get(path) {
            return Arc::clone(cached);
        }

        let manifest = fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str::<Manifest>(&text).ok())
            .unwrap_or_default();
        self.manifests
            .write()
            .expect("cache lock")
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(manifest))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_parses_empty() {
        let cache = FileCache::new();
        let sf = cache.source(Path::new("/nonexistent/never.ts"));
        assert_eq!(sf.lines, 0);
        assert!(sf.imports.is_empty());
    }

    #[test]
    fn malformed_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dependencies.json");
        std::fs::write(&path, "{ not json").unwrap();
        let cache = FileCache::new();
        let m = cache.manifest(&path);
        assert!(m.allowed.is_empty());
        assert!(m.subsystems.is_empty());
    }

    #[test]
    fn source_is_cached_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "export const a = 1;\n").unwrap();
        let cache = FileCache::new();
        let first = cache.source(&path);
        // Mutate on disk; the cache must keep serving the first parse.
        std::fs::write(&path, "export const changed = 2;\n").unwrap();
        let second = cache.source(&path);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
