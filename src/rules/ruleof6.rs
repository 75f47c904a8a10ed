// src/rules/ruleof6.rs
//! The Rule of 6: at most 6 child subsystems, 6 functions per file,
//! 6 arguments, 6 destructured object keys, and function bodies within
//! 50 lines (hard-flagged at 100). Most findings are warnings; the gate
//! rests on boundary rules, not size rules.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::parse::{FunctionFact, SourceFile};
use crate::types::{Category, Remediation, Violation};

use super::CheckContext;

/// Declared child subsystems per parent.
#[must_use]
pub fn check_subsystem_count(cx: &CheckContext<'_>) -> Vec<Violation> {
    let max = cx.config.rules.max_subsystems;
    let mut violations = Vec::new();

    for node in cx.subsystems {
        let declared = node.manifest.subsystems.len();
        if declared > max {
            violations.push(
                Violation::error(
                    Category::SubsystemCount,
                    format!(
                        "Subsystem '{}' declares {declared} child subsystems (max {max})",
                        node.name
                    ),
                )
                .subsystem(node.path.to_string_lossy())
                .recommend(
                    Remediation::ReduceSubsystems,
                    "Introduce a router subsystem to group related children. \
                     Focus on meaningful groupings, not arbitrary splits.",
                ),
            );
        }
    }

    violations
}

/// Function count, line span, and argument count per file, in parallel.
#[must_use]
pub fn check_file_functions(cx: &CheckContext<'_>) -> Vec<Violation> {
    let files: Vec<&Arc<SourceFile>> = cx
        .subsystems
        .iter()
        .flat_map(|node| node.files.iter())
        .filter(|f| !is_type_file(&f.path))
        .collect();

    files
        .par_iter()
        .map(|file| check_single_file(cx, file.as_ref()))
        .reduce(Vec::new, |mut acc, mut v| {
            acc.append(&mut v);
            acc
        })
}

fn check_single_file(cx: &CheckContext<'_>, file: &SourceFile) -> Vec<Violation> {
    let mut violations = Vec::new();
    let relative = cx.display(&file.path);
    let functions = &file.functions;

    let file_override = cx.overrides.for_path(&file.path);
    let file_max = file_override.map_or(cx.config.rules.max_functions_per_file, |o| o.threshold);

    if functions.len() > file_max {
        let qualifier = if file_override.is_some() {
            "custom limit"
        } else {
            "max"
        };
        violations.push(
            Violation::warning(
                Category::FileFunctions,
                format!(
                    "File '{relative}' has {} functions ({qualifier} {file_max})",
                    functions.len()
                ),
            )
            .file(relative.clone())
            .recommend(
                Remediation::ReduceFunctions,
                "Split into multiple files by grouping related functions. \
                 Prefix internal helpers with '_'.",
            ),
        );
    }

    for func in functions {
        violations.extend(check_function_lines(cx, func, &relative));
        violations.extend(check_function_args(cx, func, &relative));
    }

    violations
}

fn check_function_lines(
    cx: &CheckContext<'_>,
    func: &FunctionFact,
    relative: &str,
) -> Vec<Violation> {
    let rules = &cx.config.rules;
    let mut violations = Vec::new();

    if let Some(custom) = cx.overrides.for_function(relative, &func.name) {
        if func.line_count > custom.threshold {
            violations.push(
                Violation::warning(
                    Category::FunctionLines,
                    format!(
                        "Function '{}' has {} lines (custom limit {})",
                        func.name, func.line_count, custom.threshold
                    ),
                )
                .file(relative)
                .line(func.line_start)
                .recommend(
                    Remediation::ReduceFunctionLines,
                    format!(
                        "Refactor to stay within custom threshold. Justification: {}",
                        custom.justification
                    ),
                ),
            );
        }
        return violations;
    }

    if func.line_count > rules.max_function_lines_warning {
        if func.line_count >= rules.max_function_lines_error {
            violations.push(
                Violation::warning(
                    Category::FunctionLines,
                    format!(
                        "Function '{}' has {} lines (enforced max {})",
                        func.name, func.line_count, rules.max_function_lines_error
                    ),
                )
                .file(relative)
                .line(func.line_start)
                .recommend(
                    Remediation::ReduceFunctionLines,
                    "Immediately refactor into max 6 function calls at the same \
                     abstraction level. Avoid creating meaningless wrapper functions.",
                ),
            );
        } else {
            violations.push(
                Violation::warning(
                    Category::FunctionLines,
                    format!(
                        "Function '{}' has {} lines (recommended max {})",
                        func.name, func.line_count, rules.max_function_lines_warning
                    ),
                )
                .file(relative)
                .line(func.line_start)
                .recommend(
                    Remediation::ReduceFunctionLines,
                    "Break down into max 6 smaller functions at the same \
                     abstraction level. Focus on single responsibility.",
                ),
            );
        }
    }

    violations
}

fn check_function_args(
    cx: &CheckContext<'_>,
    func: &FunctionFact,
    relative: &str,
) -> Vec<Violation> {
    let max = cx.config.rules.max_function_args;
    if func.arg_count <= max {
        return Vec::new();
    }
    vec![
        Violation::warning(
            Category::FunctionArgs,
            format!(
                "Function '{}' has {} arguments (max {max})",
                func.name, func.arg_count
            ),
        )
        .file(relative)
        .line(func.line_start)
        .recommend(
            Remediation::ReduceFunctionArgs,
            format!(
                "Use max 3 arguments, or 1 object with max {} keys. \
                 Group related parameters meaningfully.",
                cx.config.rules.max_object_keys
            ),
        ),
    ]
}

/// Destructured object parameters must stay within the key budget.
#[must_use]
pub fn check_object_parameter_keys(cx: &CheckContext<'_>) -> Vec<Violation> {
    let max = cx.config.rules.max_object_keys;
    let mut violations = Vec::new();

    for node in cx.subsystems {
        for file in &node.files {
            if is_type_file(&file.path) {
                continue;
            }
            let relative = cx.display(&file.path);
            for fact in crate::parse::functions::object_params(&file.stripped, max) {
                violations.push(
                    Violation::warning(
                        Category::FunctionArgs,
                        format!(
                            "Object parameter has {} keys (max {max}): {}",
                            fact.key_count, fact.preview
                        ),
                    )
                    .file(relative.clone())
                    .line(fact.line)
                    .recommend(
                        Remediation::ReduceFunctionArgs,
                        "Group related keys into nested objects or split into \
                         multiple focused parameters with clear semantic meaning.",
                    ),
                );
            }
        }
    }

    violations
}

/// Pure type-definition files are exempt from function-shape rules.
fn is_type_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name == "types.ts"
        || name == "types.tsx"
        || path.components().any(|c| c.as_os_str() == "types")
}
