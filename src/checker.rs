// src/checker.rs
//! Orchestrator: builds the subsystem model once, then runs every rule
//! checker inside a bounded worker pool and concatenates their findings.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cache::FileCache;
use crate::config::{is_test_file, Config};
use crate::error::{Result, WardenError};
use crate::overrides::OverrideSet;
use crate::paths::PathContext;
use crate::permissions::PermissionResolver;
use crate::rules::{self, CheckContext};
use crate::subsystem;
use crate::types::CheckResults;

pub struct ArchitectureChecker {
    config: Config,
    target: PathBuf,
}

impl ArchitectureChecker {
    #[must_use]
    pub fn new(target: &Path, config: Config) -> Self {
        Self {
            config,
            target: target.to_path_buf(),
        }
    }

    /// Runs every check and returns the aggregated results. All-or-nothing:
    /// malformed inputs inside the tree degrade per file, but a missing
    /// target is a hard error.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist or the worker pool
    /// cannot be built.
    pub fn run(&self) -> Result<CheckResults> {
        if !self.target.is_dir() {
            return Err(WardenError::MissingTarget(self.target.clone()));
        }

        let start = Instant::now();
        let ctx = PathContext::new(&self.target);
        let cache = FileCache::new();
        let overrides = OverrideSet::load(&self.target, &ctx.project_root);
        let resolver = PermissionResolver::new(&ctx, &cache);

        let subsystems = subsystem::discover(&ctx, &cache);
        let source_files = subsystem::find_source_files(&self.target);
        let index_files: Vec<PathBuf> = source_files
            .iter()
            .filter(|p| {
                matches!(
                    p.file_name().and_then(|n| n.to_str()),
                    Some("index.ts" | "index.tsx")
                ) && !is_test_file(p)
            })
            .cloned()
            .collect();

        let cx = CheckContext {
            config: &self.config,
            ctx: &ctx,
            cache: &cache,
            resolver: &resolver,
            overrides: &overrides,
            subsystems: &subsystems,
            source_files: &source_files,
            index_files: &index_files,
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| WardenError::Other(e.to_string()))?;

        let mut results = CheckResults::new(self.target.to_string_lossy());
        pool.install(|| {
            // Complexity and structure first, then import legality, then
            // domain rules and size budgets; reporting sorts afterwards,
            // so the order only shapes readability of raw output.
            results.extend(rules::complexity::check_directory_complexity(&cx));
            results.extend(rules::complexity::check_subsystem_completeness(&cx));

            results.extend(rules::structure::check_subsystem_declarations(&cx));
            results.extend(rules::structure::check_declared_subsystems_exist(&cx));
            results.extend(rules::structure::check_manifest_path_format(&cx));
            results.extend(rules::structure::check_hierarchical_redundancy(&cx));
            results.extend(rules::structure::check_redundant_dependencies(&cx));
            results.extend(rules::structure::check_ancestor_redundancy(&cx));
            results.extend(rules::structure::check_domain_utils_redundancy(&cx));
            results.extend(rules::structure::check_nonexistent_dependencies(&cx));
            results.extend(rules::structure::check_file_folder_conflicts(&cx));

            results.extend(rules::boundaries::check_import_boundaries(&cx));
            results.extend(rules::boundaries::check_reexport_boundaries(&cx));
            results.extend(rules::boundaries::check_outbound_dependencies(&cx));
            results.extend(rules::boundaries::check_router_import_patterns(&cx));
            results.extend(rules::boundaries::check_domain_utils_imports(&cx));
            results.extend(rules::boundaries::check_standalone_index_reexports(&cx));

            results.extend(rules::domain::check_domain_structure(&cx));
            results.extend(rules::domain::check_domain_import_restrictions(&cx));

            results.extend(rules::ruleof6::check_subsystem_count(&cx));
            results.extend(rules::ruleof6::check_file_functions(&cx));
            results.extend(rules::ruleof6::check_object_parameter_keys(&cx));
        });

        results.execution_time_ms = start.elapsed().as_millis();
        Ok(results)
    }
}
