// src/permissions.rs
//! The permission resolver: computes each subsystem's effective
//! allowed-import set from its own declarations plus inheritance.
//!
//! Inheritance has three automatic sources: every ancestor subsystem's own
//! path (a subsystem may always import its ancestors directly), every
//! ancestor's `allowedChildren` grant (cascades to all descendants, not
//! just direct children), and the domain shared-object sentinel for nodes
//! inside the domain container. The domain-utils carve-out is applied at
//! check time by the legality engine, never stored here.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::cache::FileCache;
use crate::config::MANIFEST_FILE;
use crate::paths::PathContext;
use crate::subsystem::SubsystemNode;

/// Sentinel granting same-domain shared-object access (step 3 of the
/// resolution algorithm).
pub const DOMAIN_OBJECTS_SENTINEL: &str = "_objects";

pub struct PermissionResolver<'a> {
    ctx: &'a PathContext,
    cache: &'a FileCache,
    memo: RwLock<HashMap<PathBuf, Arc<HashSet<String>>>>,
}

impl<'a> PermissionResolver<'a> {
    #[must_use]
    pub fn new(ctx: &'a PathContext, cache: &'a FileCache) -> Self {
        Self {
            ctx,
            cache,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Ancestor subsystem paths (alias form), nearest first, walking from
    /// the node's parent up to the scan root.
    #[must_use]
    pub fn ancestors(&self, dir: &Path) -> Vec<String> {
        let mut ancestors = Vec::new();
        let mut current = dir.parent();

        while let Some(cur) = current {
            if cur == self.ctx.target_root || !cur.starts_with(&self.ctx.target_root) {
                break;
            }
            if cur.join(MANIFEST_FILE).exists() {
                ancestors.push(self.ctx.alias_of(cur));
            }
            current = cur.parent();
        }

        ancestors
    }

    /// Full inherited set: ancestor paths plus every ancestor's
    /// `allowedChildren` entries.
    #[must_use]
    pub fn inheritance_chain(&self, dir: &Path) -> Vec<String> {
        let mut inherited = Vec::new();
        let mut current = dir.parent();

        while let Some(cur) = current {
            if cur == self.ctx.target_root || !cur.starts_with(&self.ctx.target_root) {
                break;
            }
            let manifest_file = cur.join(MANIFEST_FILE);
            if manifest_file.exists() {
                inherited.push(self.ctx.alias_of(cur));
                let manifest = self.cache.manifest(&manifest_file);
                inherited.extend(manifest.allowed_children.iter().cloned());
            }
            current = cur.parent();
        }

        inherited
    }

    /// Effective allowed set for a node, memoized per subsystem.
    #[must_use]
    pub fn effective_allowed(&self, node: &SubsystemNode) -> Arc<HashSet<String>> {
        if let Some(cached) = self.memo.read().expect("memo lock").get(&node.path) {
            return Arc::clone(cached);
        }

        let mut allowed: HashSet<String> = node.manifest.allowed.iter().cloned().collect();
        allowed.extend(node.manifest.allowed_children.iter().cloned());
        allowed.extend(self.inheritance_chain(&node.path));

        if self.ctx.is_domain_path(&node.path) {
            allowed.insert(DOMAIN_OBJECTS_SENTINEL.to_string());
        }

        let allowed = Arc::new(allowed);
        self.memo
            .write()
            .expect("memo lock")
            .entry(node.path.clone())
            .or_insert_with(|| Arc::clone(&allowed))
            .clone()
    }

    /// Explicitly declared `allowed` entries that duplicate automatic
    /// ancestor inheritance.
    #[must_use]
    pub fn redundant_ancestors(&self, node: &SubsystemNode) -> Vec<String> {
        let ancestors = self.ancestors(&node.path);
        node.manifest
            .allowed
            .iter()
            .filter(|dep| ancestors.contains(dep))
            .cloned()
            .collect()
    }
}
