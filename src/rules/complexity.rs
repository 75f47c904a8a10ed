// src/rules/complexity.rs
//! Line-count thresholds: past the doc threshold a directory needs a
//! README (warning); past the complexity threshold it needs the full
//! subsystem structure (error). Overrides from `.architecture-exceptions`
//! substitute custom thresholds and are recorded in violation metadata.

use std::path::Path;

use serde_json::json;
use walkdir::WalkDir;

use crate::config::{should_prune, MANIFEST_FILE};
use crate::overrides::Override;
use crate::subsystem::{self, SubsystemNode};
use crate::types::{Category, Remediation, Violation};

use super::CheckContext;

/// Scans every directory under the target for complexity-based structure
/// requirements.
#[must_use]
pub fn check_directory_complexity(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for dir in directories_to_check(cx) {
        // Declared child subsystems are checked via subsystem completeness.
        if subsystem::is_declared_child(&dir, cx.cache) {
            continue;
        }
        if cx.ctx.is_rule_exception(&dir) {
            continue;
        }

        let lines = subsystem::count_source_lines(&dir, cx.cache);
        let thresholds = Thresholds::for_dir(cx, &dir);

        if lines > thresholds.complexity {
            let missing = missing_structure_files(&dir);
            if !missing.is_empty() {
                violations.push(structure_violation(cx, &dir, lines, &missing, &thresholds));
            }
        } else if lines > thresholds.doc && !dir.join("README.md").exists() {
            violations.push(readme_warning(cx, &dir, lines, &thresholds));
        }
    }

    violations
}

/// Subsystems over the complexity threshold must carry their full file
/// set (manifest + README).
#[must_use]
pub fn check_subsystem_completeness(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in cx.subsystems {
        let thresholds = Thresholds::for_dir(cx, &node.path);
        if node.total_lines <= thresholds.complexity {
            continue;
        }
        let missing = missing_structure_files(&node.path);
        if missing.is_empty() {
            continue;
        }
        violations.push(completeness_violation(cx, node, &missing, &thresholds));
    }

    violations
}

struct Thresholds {
    complexity: usize,
    doc: usize,
    source: Option<Override>,
}

impl Thresholds {
    fn for_dir(cx: &CheckContext<'_>, dir: &Path) -> Self {
        let defaults = &cx.config.rules;
        match cx.overrides.for_path(dir) {
            Some(rule) => {
                // One override covers both thresholds; the doc threshold
                // scales proportionally.
                let ratio = defaults.doc_threshold as f64 / defaults.complexity_threshold as f64;
                Self {
                    complexity: rule.threshold,
                    doc: (rule.threshold as f64 * ratio) as usize,
                    source: Some(rule.clone()),
                }
            }
            None => Self {
                complexity: defaults.complexity_threshold,
                doc: defaults.doc_threshold,
                source: None,
            },
        }
    }

    fn annotate(&self, violation: Violation, default_threshold: usize) -> Violation {
        match &self.source {
            Some(rule) => violation
                .meta("custom_threshold", json!(rule.threshold))
                .meta("default_threshold", json!(default_threshold))
                .meta(
                    "exception_source",
                    json!(rule.source.to_string_lossy().to_string()),
                )
                .meta("justification", json!(rule.justification)),
            None => violation,
        }
    }
}

fn directories_to_check(cx: &CheckContext<'_>) -> Vec<std::path::PathBuf> {
    WalkDir::new(&cx.ctx.target_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && (should_prune(&e.file_name().to_string_lossy())
                    || cx.ctx.is_traversal_exception(e.path())))
        })
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn missing_structure_files(dir: &Path) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !dir.join(MANIFEST_FILE).exists() {
        missing.push(MANIFEST_FILE);
    }
    if !dir.join("README.md").exists() {
        missing.push("README.md");
    }
    missing
}

fn structure_violation(
    cx: &CheckContext<'_>,
    dir: &Path,
    lines: usize,
    missing: &[&str],
    thresholds: &Thresholds,
) -> Violation {
    let (recommendation, kind) = structure_recommendation(dir, missing);
    let violation = Violation::error(
        Category::Complexity,
        format!(
            "{} ({lines} lines) missing: {}",
            dir.display(),
            missing.join(" ")
        ),
    )
    .subsystem(dir.to_string_lossy())
    .recommend(kind, recommendation);
    thresholds.annotate(violation, cx.config.rules.complexity_threshold)
}

fn readme_warning(
    cx: &CheckContext<'_>,
    dir: &Path,
    lines: usize,
    thresholds: &Thresholds,
) -> Violation {
    let violation = Violation::warning(
        Category::Complexity,
        format!("{} ({lines} lines) - missing README.md", dir.display()),
    )
    .subsystem(dir.to_string_lossy())
    .recommend(
        Remediation::CreateReadme,
        format!("Create {}/README.md file", dir.display()),
    );
    thresholds.annotate(violation, cx.config.rules.doc_threshold)
}

fn completeness_violation(
    cx: &CheckContext<'_>,
    node: &SubsystemNode,
    missing: &[&str],
    thresholds: &Thresholds,
) -> Violation {
    let (recommendation, kind) = structure_recommendation(&node.path, missing);
    let violation = Violation::error(
        Category::SubsystemStructure,
        format!(
            "Subsystem {} ({} lines) missing: {}",
            node.path.display(),
            node.total_lines,
            missing.join(" ")
        ),
    )
    .subsystem(node.path.to_string_lossy())
    .recommend(kind, recommendation);
    thresholds.annotate(violation, cx.config.rules.complexity_threshold)
}

fn structure_recommendation(dir: &Path, missing: &[&str]) -> (String, Remediation) {
    if missing.len() == 1 && missing[0] == "README.md" {
        (
            format!("Create {}/README.md file", dir.display()),
            Remediation::CreateReadme,
        )
    } else {
        (
            format!(
                "Create missing files in {}: {}",
                dir.display(),
                missing.join(", ")
            ),
            Remediation::CreateSubsystemFiles,
        )
    }
}
