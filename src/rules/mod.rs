// src/rules/mod.rs
//! Rule checkers. Each check takes the shared context and returns the
//! violations it found; the orchestrator owns ordering and collection.

pub mod boundaries;
pub mod complexity;
pub mod domain;
pub mod ruleof6;
pub mod structure;

use std::path::PathBuf;

use crate::cache::FileCache;
use crate::config::Config;
use crate::overrides::OverrideSet;
use crate::paths::PathContext;
use crate::permissions::PermissionResolver;
use crate::subsystem::SubsystemNode;

/// Everything a rule checker may need, built once per run.
pub struct CheckContext<'a> {
    pub config: &'a Config,
    pub ctx: &'a PathContext,
    pub cache: &'a FileCache,
    pub resolver: &'a PermissionResolver<'a>,
    pub overrides: &'a OverrideSet,
    pub subsystems: &'a [SubsystemNode],
    /// Every source file under the target root (tests excluded).
    pub source_files: &'a [PathBuf],
    /// Every index file under the target root (tests excluded).
    pub index_files: &'a [PathBuf],
}

impl CheckContext<'_> {
    /// Display form of a path relative to the target root.
    #[must_use]
    pub fn display(&self, path: &std::path::Path) -> String {
        path.strip_prefix(&self.ctx.target_root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}
