// src/rules/boundaries.rs
//! Import-edge checks: subsystem interface boundaries, outbound
//! declarations, router/domain-utils overlays, and re-export legality.

use std::path::Path;

use rayon::prelude::*;

use crate::config::MANIFEST_FILE;
use crate::legality::{self, Decision, ImportCheck};
use crate::paths::{self, ImportPath};
use crate::subsystem::{self, SubsystemKind, SubsystemNode};
use crate::types::{Category, Remediation, Violation};

use super::CheckContext;

/// External files must reach a subsystem through its index, not its
/// internals. Router and API subsystems are exempt; index files are exempt
/// as importers; same-domain and domain-utils imports carry their own
/// permission.
#[must_use]
pub fn check_import_boundaries(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        if node.is_boundary_exempt() {
            continue;
        }

        let bypasses = find_boundary_bypasses(cx, node);
        if bypasses.is_empty() {
            continue;
        }

        let type_desc = match node.kind {
            SubsystemKind::Unspecified => String::new(),
            kind => format!(" (type: {kind})"),
        };
        violations.push(
            Violation::error(
                Category::ImportBoundary,
                format!("External imports bypass {}/index{type_desc}", node.name),
            )
            .subsystem(node.path.to_string_lossy())
            .recommend(
                Remediation::CreateSubsystemIndex,
                format!(
                    "Create or update {}/index.ts to reexport internal modules",
                    node.path.display()
                ),
            ),
        );

        let alias = cx.ctx.alias_of(&node.path);
        for (file, line, spec) in bypasses {
            violations.push(
                Violation::error(
                    Category::ImportBoundary,
                    format!("{}:{line} imports '{spec}'", cx.display(&file)),
                )
                .subsystem(node.path.to_string_lossy())
                .file(file.to_string_lossy())
                .line(line)
                .recommend(
                    Remediation::UseSubsystemInterface,
                    format!("Change import from '{spec}' to '{alias}' (via index.ts)"),
                ),
            );
        }
    }

    violations
}

fn find_boundary_bypasses(
    cx: &CheckContext<'_>,
    node: &SubsystemNode,
) -> Vec<(std::path::PathBuf, usize, String)> {
    let alias = cx.ctx.alias_of(&node.path);
    let prefix = format!("{alias}/");
    let mut found = Vec::new();

    for file in cx.source_files {
        // Index files may reach into their own children by design.
        if is_index_file(file) {
            continue;
        }
        if file.starts_with(&node.path) {
            continue;
        }
        // Files in declared child subsystems import their parent freely.
        if subsystem::in_child_subsystem(file, node, cx.subsystems) {
            continue;
        }

        let source = cx.cache.source(file);
        for (spec, line) in source.outbound_specifiers() {
            let Some(sub_path) = spec.strip_prefix(&prefix) else {
                continue;
            };
            if sub_path.is_empty() || sub_path == "index" {
                continue;
            }
            if file_has_import_permission(cx, file, spec) {
                continue;
            }
            found.push((file.clone(), line, spec.to_string()));
        }
    }

    found
}

/// Same-domain files and domain-utils targets carry implicit permission
/// through the subsystem interface.
fn file_has_import_permission(cx: &CheckContext<'_>, file: &Path, spec: &str) -> bool {
    let Some(import_domain) = paths::domain_of_spec(spec) else {
        return false;
    };

    if cx
        .ctx
        .domain_of_path(file)
        .is_some_and(|d| d == import_domain)
    {
        return true;
    }

    // Direct imports from a domain's utils are pure and side-effect free.
    paths::is_domain_utils_spec(spec)
}

/// Index files may only re-export child subsystems, internal files, or
/// external libraries; see the legality engine for the full state machine.
#[must_use]
pub fn check_reexport_boundaries(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        let index_file = node.path.join("index.ts");
        if !index_file.exists() {
            continue;
        }
        let source = cx.cache.source(&index_file);

        let mut found = Vec::new();
        for fact in source.reexports() {
            let spec = fact.from_path.as_deref().unwrap_or_default();
            if let Some(v) = legality::check_reexport(
                &node.path,
                &node.manifest.subsystems,
                spec,
                fact.line,
                cx.ctx,
            ) {
                found.push(v);
            }
        }

        if found.is_empty() {
            continue;
        }

        violations.push(
            Violation::error(
                Category::ReexportBoundary,
                format!("Invalid reexports in {}/index.ts", node.name),
            )
            .subsystem(node.path.to_string_lossy())
            .recommend(
                Remediation::FixReexportBoundary,
                format!(
                    "Fix reexports in {}/index.ts to only expose internal modules",
                    node.path.display()
                ),
            ),
        );

        for v in found {
            let recommendation = if v.reason == legality::reexports::REASON_ENCAPSULATION {
                format!(
                    "Remove reexport '{}' from index.ts - external dependencies should be imported directly",
                    v.spec
                )
            } else {
                format!(
                    "Fix reexport pattern '{}' in index.ts to follow subsystem rules",
                    v.spec
                )
            };
            violations.push(
                Violation::error(
                    Category::ReexportBoundary,
                    format!("Line {}: reexport from '{}' - {}", v.line, v.spec, v.reason),
                )
                .subsystem(node.path.to_string_lossy())
                .file(index_file.to_string_lossy())
                .line(v.line)
                .recommend(Remediation::FixReexportBoundary, recommendation),
            );
        }
    }

    violations
}

/// Every root-alias import edge must be granted by the effective permission
/// set. Subsystems are checked in parallel; each worker returns its own
/// list and the results are concatenated.
#[must_use]
pub fn check_outbound_dependencies(cx: &CheckContext<'_>) -> Vec<Violation> {
    cx.subsystems
        .par_iter()
        .map(|node| check_subsystem_outbound(cx, node))
        .reduce(Vec::new, |mut acc, mut v| {
            acc.append(&mut v);
            acc
        })
}

fn check_subsystem_outbound(cx: &CheckContext<'_>, node: &SubsystemNode) -> Vec<Violation> {
    let mut violations = Vec::new();
    let allowed = cx.resolver.effective_allowed(node);
    let alias = cx.ctx.alias_of(&node.path);

    for file in &node.files {
        for (spec, line) in file.outbound_specifiers() {
            if !ImportPath::parse(spec).is_root_relative() {
                continue;
            }

            let decision = legality::decide(&ImportCheck {
                spec,
                subsystem_alias: &alias,
                subsystem_path: &node.path,
                allowed: allowed.as_ref(),
                ctx: cx.ctx,
            });

            if decision == Decision::Deny {
                let recommendation = format!(
                    "Add '{spec}' to {}/{MANIFEST_FILE} 'allowed' array",
                    node.path.display()
                );
                violations.push(
                    Violation::error(
                        Category::ImportBoundary,
                        format!(
                            "Undeclared outbound dependency in {}: {} imports '{spec}'",
                            node.name,
                            cx.display(&file.path),
                        ),
                    )
                    .subsystem(node.path.to_string_lossy())
                    .file(file.path.to_string_lossy())
                    .line(line)
                    .recommend(Remediation::AddAllowedDependency, recommendation),
                );
            }
        }
    }

    violations
}

/// Importing a router's own index is legal but advisory: routers aggregate
/// children, and naming the child keeps dependencies explicit.
#[must_use]
pub fn check_router_import_patterns(cx: &CheckContext<'_>) -> Vec<Violation> {
    let routers: Vec<(&SubsystemNode, String)> = cx
        .subsystems
        .iter()
        .filter(|n| n.kind == SubsystemKind::Router)
        .map(|n| (n, cx.ctx.alias_of(&n.path)))
        .collect();

    let mut violations = Vec::new();

    for node in cx.subsystems {
        for file in &node.files {
            for (spec, line) in file.outbound_specifiers() {
                for (router, router_alias) in &routers {
                    if spec != router_alias {
                        continue;
                    }
                    let children: Vec<&str> = router
                        .manifest
                        .subsystems
                        .iter()
                        .map(|c| c.trim_start_matches("./"))
                        .collect();
                    let children_list = children.join(", ");
                    violations.push(
                        Violation::warning(
                            Category::ImportBoundary,
                            format!(
                                "Import from router subsystem in {}: {} imports '{spec}' - available children: {children_list}",
                                node.name,
                                cx.display(&file.path),
                            ),
                        )
                        .subsystem(node.path.to_string_lossy())
                        .file(file.path.to_string_lossy())
                        .line(line)
                        .recommend(
                            Remediation::UseSpecificChild,
                            format!(
                                "Consider importing from specific child subsystem instead: {router_alias}/[{children_list}]"
                            ),
                        ),
                    );
                }
            }
        }
    }

    violations
}

/// Domain utils must be imported through their index, not file by file.
/// The utils index itself aggregating its own domain's files is the one
/// exception.
#[must_use]
pub fn check_domain_utils_imports(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        for file in &node.files {
            for (spec, line) in file.outbound_specifiers() {
                if !paths::is_domain_utils_file_spec(spec) {
                    continue;
                }

                let Some(domain) = paths::domain_of_spec(spec) else {
                    continue;
                };

                if is_utils_index(&file.path)
                    && cx.ctx.domain_of_path(&file.path).as_deref() == Some(domain)
                {
                    continue;
                }

                let proper = format!("~/lib/domains/{domain}/utils");
                violations.push(
                    Violation::error(
                        Category::ImportBoundary,
                        format!(
                            "Direct utils file import in {}: {} imports '{spec}'",
                            node.name,
                            cx.display(&file.path),
                        ),
                    )
                    .subsystem(node.path.to_string_lossy())
                    .file(file.path.to_string_lossy())
                    .line(line)
                    .recommend(
                        Remediation::UseUtilsInterface,
                        format!("Change import from '{spec}' to '{proper}' (use utils index.ts)"),
                    ),
                );
            }
        }
    }

    violations
}

/// Index files without a manifest still must not re-export upward.
#[must_use]
pub fn check_standalone_index_reexports(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for index_file in cx.index_files {
        let Some(dir) = index_file.parent() else {
            continue;
        };
        if dir.join(MANIFEST_FILE).exists() {
            continue; // formal subsystems are covered by the reexport check
        }

        let source = cx.cache.source(index_file);
        let upward: Vec<_> = source
            .reexports()
            .filter_map(|fact| {
                let spec = fact.from_path.as_deref()?;
                legality::is_upward_reexport(dir, spec, cx.ctx)
                    .then(|| (spec.to_string(), fact.line))
            })
            .collect();

        if upward.is_empty() {
            continue;
        }

        violations.push(
            Violation::error(
                Category::ReexportBoundary,
                format!("Invalid upward reexports in {}", cx.display(index_file)),
            )
            .subsystem(dir.to_string_lossy())
            .recommend(
                Remediation::FixReexportBoundary,
                format!(
                    "Fix upward reexports in {} - index files should not reexport from parent directories",
                    cx.display(index_file)
                ),
            ),
        );

        for (spec, line) in upward {
            violations.push(
                Violation::error(
                    Category::ReexportBoundary,
                    format!(
                        "Line {line}: reexport from '{spec}' - {}",
                        legality::reexports::REASON_UPWARD
                    ),
                )
                .subsystem(dir.to_string_lossy())
                .file(index_file.to_string_lossy())
                .line(line)
                .recommend(
                    Remediation::FixUpwardReexport,
                    "Either move implementation to this directory or import directly from original location",
                ),
            );
        }
    }

    violations
}

fn is_index_file(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some("index.ts" | "index.tsx")
    )
}

fn is_utils_index(path: &Path) -> bool {
    is_index_file(path)
        && path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|n| n == "utils")
}
