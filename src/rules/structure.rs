// src/rules/structure.rs
//! Subsystem structure and declaration checks: parent declarations,
//! declared-child existence, manifest path format, redundancy, nonexistent
//! targets, and file/folder naming conflicts.

use std::path::{Path, PathBuf};

use crate::config::MANIFEST_FILE;
use crate::paths;
use crate::subsystem::SubsystemNode;
use crate::types::{Category, Remediation, Violation};

use super::CheckContext;

/// Every subsystem below the target root must be declared in its parent
/// manifest's `subsystems` array (when the parent is itself a subsystem).
#[must_use]
pub fn check_subsystem_declarations(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        if node.parent_dir == cx.ctx.target_root {
            continue;
        }
        let parent_manifest = node.parent_dir.join(MANIFEST_FILE);
        if !parent_manifest.exists() {
            continue;
        }

        let parent = cx.cache.manifest(&parent_manifest);
        let relative = format!("./{}", node.name);
        if !parent.subsystems.contains(&relative) {
            violations.push(
                Violation::error(
                    Category::SubsystemStructure,
                    format!(
                        "Subsystem {} not declared in {}",
                        node.path.display(),
                        parent_manifest.display()
                    ),
                )
                .subsystem(node.path.to_string_lossy())
                .recommend(
                    Remediation::AddAllowedChildren,
                    format!(
                        "Add \"{relative}\" to the \"subsystems\" array in {}",
                        parent_manifest.display()
                    ),
                ),
            );
        }
    }

    violations
}

/// Declared child subsystems must exist on disk with their own manifest.
#[must_use]
pub fn check_declared_subsystems_exist(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        for declared in &node.manifest.subsystems {
            let Some(child_name) = declared.strip_prefix("./") else {
                continue;
            };
            let child_dir = node.path.join(child_name);
            let child_manifest = child_dir.join(MANIFEST_FILE);
            if child_manifest.exists() {
                continue;
            }

            let (recommendation, kind) = if child_dir.exists() {
                (
                    format!(
                        "Create {} to formalize this subsystem, or remove '{declared}' from {}/{MANIFEST_FILE} 'subsystems' array if it's not a subsystem",
                        child_manifest.display(),
                        node.path.display()
                    ),
                    Remediation::CreateOrRemoveSubsystem,
                )
            } else {
                (
                    format!(
                        "Remove '{declared}' from {}/{MANIFEST_FILE} 'subsystems' array (directory does not exist)",
                        node.path.display()
                    ),
                    Remediation::RemoveInvalidSubsystem,
                )
            };

            violations.push(
                Violation::error(
                    Category::SubsystemStructure,
                    format!(
                        "Declared subsystem missing {MANIFEST_FILE}: {} declares '{declared}' but {} does not exist",
                        node.name,
                        child_manifest.display()
                    ),
                )
                .subsystem(node.path.to_string_lossy())
                .recommend(kind, recommendation),
            );
        }
    }

    violations
}

/// `allowed`/`allowedChildren` entries must be root-alias paths, not
/// relative ones.
#[must_use]
pub fn check_manifest_path_format(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        let manifest_path = node.manifest_path();
        for (list_name, list) in [
            ("allowed", &node.manifest.allowed),
            ("allowedChildren", &node.manifest.allowed_children),
        ] {
            for dep in list {
                if is_invalid_relative(dep) {
                    violations.push(
                        Violation::error(
                            Category::DependencyFormat,
                            format!(
                                "Relative path in {}: '{dep}' - use absolute paths with ~/ prefix instead",
                                manifest_path.display()
                            ),
                        )
                        .subsystem(node.path.to_string_lossy())
                        .recommend(
                            Remediation::FixDependencyPathFormat,
                            format!(
                                "Change relative path '{dep}' to absolute path with ~/ prefix in {} '{list_name}' array",
                                manifest_path.display()
                            ),
                        ),
                    );
                }
            }
        }
    }

    violations
}

fn is_invalid_relative(dep: &str) -> bool {
    dep.starts_with("../") || (dep.starts_with("./") && !dep.contains("subsystem"))
}

/// Within one list, an entry shadowed by a broader entry is redundant -
/// unless the narrower entry is itself a subsystem, which needs explicit
/// permission past one level.
#[must_use]
pub fn check_hierarchical_redundancy(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        for (list_name, list) in [
            ("allowed", &node.manifest.allowed),
            ("allowedChildren", &node.manifest.allowed_children),
        ] {
            for dep in list {
                for other in list {
                    if dep == other {
                        continue;
                    }
                    let Some(child_suffix) = dep.strip_prefix(&format!("{other}/")) else {
                        continue;
                    };
                    let Some(child_path) = resolve_child(cx, other, child_suffix) else {
                        continue;
                    };
                    if child_path.join(MANIFEST_FILE).exists() {
                        continue; // subsystems need their own explicit entry
                    }
                    violations.push(
                        Violation::error(
                            Category::Redundancy,
                            format!(
                                "Hierarchical redundancy in {}: '{dep}' is redundant because '{other}' already allows access",
                                node.name
                            ),
                        )
                        .subsystem(node.path.to_string_lossy())
                        .recommend(
                            Remediation::RemoveRedundantDependency,
                            format!(
                                "Remove '{dep}' from {}/{MANIFEST_FILE} '{list_name}' array (redundant with '{other}')",
                                node.path.display()
                            ),
                        ),
                    );
                }
            }
        }
    }

    violations
}

fn resolve_child(cx: &CheckContext<'_>, base: &str, suffix: &str) -> Option<PathBuf> {
    cx.ctx
        .resolve_alias(base)
        .map(|b| b.join(suffix))
        .or_else(|| Some(Path::new(base).join(suffix)))
}

/// Entries already provided by the parent's `allowedChildren` cascade are
/// redundant in the child.
#[must_use]
pub fn check_redundant_dependencies(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        if node.parent_dir == cx.ctx.target_root {
            continue;
        }
        let parent_manifest = node.parent_dir.join(MANIFEST_FILE);
        if !parent_manifest.exists() {
            continue;
        }
        let parent = cx.cache.manifest(&parent_manifest);
        if parent.allowed_children.is_empty() {
            continue;
        }

        for (list_name, list) in [
            ("allowed", &node.manifest.allowed),
            ("allowedChildren", &node.manifest.allowed_children),
        ] {
            for dep in list {
                if parent.allowed_children.contains(dep) {
                    violations.push(
                        Violation::error(
                            Category::Redundancy,
                            format!(
                                "Redundant dependency in {}: '{dep}' is already provided by parent allowedChildren",
                                node.name
                            ),
                        )
                        .subsystem(node.path.to_string_lossy())
                        .recommend(
                            Remediation::RemoveRedundantDependency,
                            format!(
                                "Remove '{dep}' from {}/{MANIFEST_FILE} '{list_name}' array (redundant with parent)",
                                node.path.display()
                            ),
                        ),
                    );
                }
            }
        }
    }

    violations
}

/// Ancestors are inherited automatically; declaring one explicitly adds no
/// information.
#[must_use]
pub fn check_ancestor_redundancy(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        for ancestor in cx.resolver.redundant_ancestors(node) {
            violations.push(
                Violation::error(
                    Category::Redundancy,
                    format!(
                        "Redundant ancestor declaration in {}: '{ancestor}' is automatically inherited from parent subsystem",
                        node.name
                    ),
                )
                .subsystem(node.path.to_string_lossy())
                .recommend(
                    Remediation::RemoveRedundantDependency,
                    format!(
                        "Remove '{ancestor}' from {}/{MANIFEST_FILE} 'allowed' array (automatically inherited)",
                        node.path.display()
                    ),
                ),
            );
        }
    }

    violations
}

/// Domain utils are implicitly importable everywhere; declaring them is
/// redundant.
#[must_use]
pub fn check_domain_utils_redundancy(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        for dep in &node.manifest.allowed {
            if paths::is_domain_utils_spec(dep) {
                violations.push(
                    Violation::error(
                        Category::Redundancy,
                        format!(
                            "Redundant domain utils declaration in {}: '{dep}' is implicitly allowed for all subsystems",
                            node.name
                        ),
                    )
                    .subsystem(node.path.to_string_lossy())
                    .recommend(
                        Remediation::RemoveRedundantDependency,
                        format!(
                            "Remove '{dep}' from {}/{MANIFEST_FILE} 'allowed' array (domain utils are implicitly allowed)",
                            node.path.display()
                        ),
                    ),
                );
            }
        }
    }

    violations
}

/// Filesystem-shaped entries must point at something that exists, probing
/// source-file and index variants.
#[must_use]
pub fn check_nonexistent_dependencies(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        for (list_name, list, kind) in [
            (
                "allowed",
                &node.manifest.allowed,
                Remediation::RemoveForbiddenDependency,
            ),
            (
                "allowedChildren",
                &node.manifest.allowed_children,
                Remediation::RemoveForbiddenDependency,
            ),
        ] {
            for dep in list {
                if !is_filesystem_dependency(dep) {
                    continue;
                }
                let Some(resolved) = resolve_dependency(cx, dep) else {
                    continue;
                };
                if target_exists(&resolved) {
                    continue;
                }
                violations.push(
                    Violation::error(
                        Category::NonexistentDependency,
                        format!(
                            "Non-existent dependency in {}: '{dep}' points to non-existent path {}",
                            node.name,
                            resolved.display()
                        ),
                    )
                    .subsystem(node.path.to_string_lossy())
                    .recommend(
                        kind,
                        format!(
                            "Remove '{dep}' from {}/{MANIFEST_FILE} '{list_name}' array (path does not exist)",
                            node.path.display()
                        ),
                    ),
                );
            }
        }
    }

    violations
}

fn is_filesystem_dependency(dep: &str) -> bool {
    dep.starts_with("~/") || dep.starts_with("./") || dep.starts_with("../")
}

fn resolve_dependency(cx: &CheckContext<'_>, dep: &str) -> Option<PathBuf> {
    if dep.starts_with("~/") {
        cx.ctx.resolve_alias(dep)
    } else if dep.starts_with("./") || dep.starts_with("../") {
        Some(PathBuf::from(dep))
    } else {
        None
    }
}

/// A dependency target may be a directory, a source file without its
/// extension written out, or a directory with only an index file.
fn target_exists(path: &Path) -> bool {
    if path.exists() {
        return true;
    }

    const EXTS: &[&str] = &["ts", "tsx", "js", "jsx"];
    let known_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTS.contains(&e) || e == "service");

    let as_str = path.to_string_lossy();
    let candidates: Vec<PathBuf> = if known_ext {
        EXTS.iter()
            .map(|ext| PathBuf::from(format!("{as_str}.{ext}")))
            .collect()
    } else {
        EXTS.iter()
            .map(|ext| path.with_extension(ext))
            .collect()
    };

    if candidates.iter().any(|c| c.exists()) {
        return true;
    }

    EXTS.iter().any(|ext| path.join(format!("index.{ext}")).exists())
}

/// A file and a sibling directory with the same stem is a naming conflict
/// (index files excluded).
#[must_use]
pub fn check_file_folder_conflicts(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for file in cx.source_files {
        let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem == "index" {
            continue;
        }
        let Some(parent) = file.parent() else {
            continue;
        };
        let folder = parent.join(stem);
        if folder.is_dir() {
            violations.push(
                Violation::error(
                    Category::FileConflict,
                    format!(
                        "File/folder naming conflict: {} vs {}/",
                        cx.display(file),
                        cx.display(&folder)
                    ),
                )
                .file(file.to_string_lossy())
                .recommend(
                    Remediation::ResolveFileFolderConflict,
                    format!(
                        "Move {} contents to {}/index.ts",
                        cx.display(file),
                        cx.display(&folder)
                    ),
                ),
            );
        }
    }

    violations
}
