// tests/integration_check.rs
//! End-to-end checks against throwaway project trees.
//!
//! VERIFICATION STRATEGY:
//! 1. Clean trees yield zero errors (no false positives).
//! 2. Each violation class is provoked in isolation and counted exactly.
//! 3. Running twice over an unchanged tree yields identical results.

use std::fs;
use std::path::{Path, PathBuf};

use archwarden_core::checker::ArchitectureChecker;
use archwarden_core::config::Config;
use archwarden_core::types::{Category, CheckResults};
use tempfile::TempDir;

// --- Helpers ---

struct Project {
    _dir: TempDir,
    src: PathBuf,
}

/// Builds a project tree from (path, content) pairs rooted at `src/`.
fn project(files: &[(&str, &str)]) -> Project {
    let dir = tempfile::tempdir().unwrap();
    // Marker so project-root detection stops at the tempdir.
    fs::write(dir.path().join("package.json"), "{}").unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();

    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    Project { _dir: dir, src }
}

fn run(p: &Project) -> CheckResults {
    ArchitectureChecker::new(&p.src, Config::new())
        .run()
        .unwrap()
}

fn errors_of(results: &CheckResults, category: Category) -> usize {
    results
        .errors
        .iter()
        .filter(|v| v.category == category)
        .count()
}

// --- Scenarios ---

#[test]
fn clean_project_passes() {
    let p = project(&[
        (
            "src/app/dependencies.json",
            r#"{"allowed": ["~/widgets"]}"#,
        ),
        (
            "src/app/main.ts",
            "import { Button } from '~/widgets';\nimport { z } from 'zod';\n\nexport function render() {\n  return Button;\n}\n",
        ),
        ("src/widgets/dependencies.json", "{}"),
        (
            "src/widgets/index.ts",
            "export { Button } from './Button';\n",
        ),
        (
            "src/widgets/Button.tsx",
            "export const Button = () => null;\n",
        ),
    ]);

    let results = run(&p);
    assert!(
        results.errors.is_empty(),
        "unexpected errors: {:?}",
        results.errors.iter().map(|e| &e.message).collect::<Vec<_>>()
    );
}

#[test]
fn boundary_bypass_names_the_subsystem() {
    let p = project(&[
        ("src/widgets/dependencies.json", "{}"),
        (
            "src/widgets/Internal.tsx",
            "export const Internal = () => null;\n",
        ),
        (
            "src/pages/home.ts",
            "import { Internal } from '~/widgets/Internal';\nexport const home = Internal;\n",
        ),
    ]);

    let results = run(&p);
    let groups: Vec<_> = results
        .errors
        .iter()
        .filter(|v| v.message.contains("External imports bypass widgets/index"))
        .collect();
    assert_eq!(groups.len(), 1, "exactly one boundary group expected");
    assert!(groups[0]
        .subsystem
        .as_ref()
        .is_some_and(|s| s.contains("widgets")));
}

#[test]
fn router_subsystem_is_boundary_exempt() {
    let p = project(&[
        (
            "src/flows/dependencies.json",
            r#"{"type": "router", "subsystems": ["./checkout"]}"#,
        ),
        ("src/flows/checkout/dependencies.json", "{}"),
        (
            "src/flows/checkout/steps.ts",
            "export const steps = [];\n",
        ),
        (
            "src/pages/home.ts",
            "import { steps } from '~/flows/checkout/steps';\nexport const home = steps;\n",
        ),
    ]);

    let results = run(&p);
    // The router itself is exempt, but ~/flows/checkout is its own
    // (non-router) subsystem and still protects its internals.
    assert!(results
        .errors
        .iter()
        .all(|v| !v.message.contains("bypass flows/index")));
    assert!(errors_of(&results, Category::ImportBoundary) > 0);
}

#[test]
fn redundant_ancestor_is_flagged() {
    let p = project(&[
        (
            "src/a/dependencies.json",
            r#"{"subsystems": ["./b"]}"#,
        ),
        (
            "src/a/b/dependencies.json",
            r#"{"allowed": ["~/a"]}"#,
        ),
        ("src/a/index.ts", "export {};\n"),
        ("src/a/b/impl.ts", "export const impl = 1;\n"),
    ]);

    let results = run(&p);
    let redundancy: Vec<_> = results
        .errors
        .iter()
        .filter(|v| v.category == Category::Redundancy)
        .collect();
    assert_eq!(redundancy.len(), 1);
    assert!(redundancy[0].message.contains("'~/a'"));
    assert!(redundancy[0]
        .recommendation
        .as_ref()
        .is_some_and(|r| r.contains("Remove '~/a'")));
}

#[test]
fn ancestor_import_needs_no_declaration() {
    let p = project(&[
        (
            "src/a/dependencies.json",
            r#"{"subsystems": ["./b"]}"#,
        ),
        ("src/a/index.ts", "export const helper = 1;\n"),
        ("src/a/b/dependencies.json", "{}"),
        (
            "src/a/b/impl.ts",
            "import { helper } from '~/a';\nexport const impl = helper;\n",
        ),
    ]);

    let results = run(&p);
    assert!(
        results.errors.is_empty(),
        "ancestor access must be implicit: {:?}",
        results.errors.iter().map(|e| &e.message).collect::<Vec<_>>()
    );
}

#[test]
fn undeclared_outbound_dependency_is_reported() {
    let p = project(&[
        ("src/a/dependencies.json", "{}"),
        (
            "src/a/main.ts",
            "import { x } from '~/elsewhere';\nexport const a = x;\n",
        ),
        ("src/elsewhere/dependencies.json", "{}"),
        ("src/elsewhere/index.ts", "export const x = 1;\n"),
    ]);

    let results = run(&p);
    let outbound: Vec<_> = results
        .errors
        .iter()
        .filter(|v| v.message.contains("Undeclared outbound dependency"))
        .collect();
    assert_eq!(outbound.len(), 1);
    assert!(outbound[0]
        .recommendation
        .as_ref()
        .is_some_and(|r| r.contains("'allowed' array")));
}

#[test]
fn external_imports_never_violate() {
    let p = project(&[
        ("src/a/dependencies.json", "{}"),
        (
            "src/a/main.ts",
            "import React from 'react';\nimport { get } from 'lodash/get';\nimport * as fs from 'node:fs';\nexport const a = 1;\n",
        ),
    ]);

    let results = run(&p);
    assert_eq!(errors_of(&results, Category::ImportBoundary), 0);
}

#[test]
fn seven_functions_warn_once() {
    let body: String = (1..=7)
        .map(|i| format!("export function f{i}() {{\n  return {i};\n}}\n"))
        .collect();
    let p = project(&[
        ("src/tools/dependencies.json", "{}"),
        ("src/tools/helpers.ts", body.as_str()),
    ]);

    let results = run(&p);
    let warnings: Vec<_> = results
        .warnings
        .iter()
        .filter(|v| v.category == Category::FileFunctions)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("7 functions"));
    assert!(warnings[0].message.contains("max 6"));
}

#[test]
fn upward_reexport_denied_in_standalone_index() {
    let p = project(&[
        (
            "src/features/cards/index.ts",
            "export { Card } from '../shared';\n",
        ),
        ("src/shared.ts", "export const Card = 1;\n"),
    ]);

    let results = run(&p);
    assert!(errors_of(&results, Category::ReexportBoundary) > 0);
}

#[test]
fn declared_but_missing_child_subsystem() {
    let p = project(&[
        (
            "src/a/dependencies.json",
            r#"{"subsystems": ["./ghost"]}"#,
        ),
        ("src/a/impl.ts", "export const a = 1;\n"),
    ]);

    let results = run(&p);
    assert_eq!(errors_of(&results, Category::SubsystemStructure), 1);
}

#[test]
fn file_folder_conflict_detected() {
    let p = project(&[
        ("src/a/dependencies.json", "{}"),
        ("src/a/grid.ts", "export const grid = 1;\n"),
        ("src/a/grid/cell.ts", "export const cell = 1;\n"),
    ]);

    let results = run(&p);
    assert_eq!(errors_of(&results, Category::FileConflict), 1);
}

#[test]
fn relative_manifest_paths_are_format_errors() {
    let p = project(&[
        (
            "src/a/dependencies.json",
            r#"{"allowed": ["../sibling", "~/fine"]}"#,
        ),
        ("src/fine/dependencies.json", "{}"),
        ("src/fine/index.ts", "export {};\n"),
    ]);

    let results = run(&p);
    assert_eq!(errors_of(&results, Category::DependencyFormat), 1);
}

#[test]
fn nonexistent_dependency_target() {
    let p = project(&[
        (
            "src/a/dependencies.json",
            r#"{"allowed": ["~/does/not/exist"]}"#,
        ),
        ("src/a/impl.ts", "export const a = 1;\n"),
    ]);

    let results = run(&p);
    assert_eq!(errors_of(&results, Category::NonexistentDependency), 1);
}

#[test]
fn run_twice_is_idempotent() {
    let p = project(&[
        ("src/widgets/dependencies.json", "{}"),
        (
            "src/widgets/Internal.tsx",
            "export const Internal = () => null;\n",
        ),
        (
            "src/pages/home.ts",
            "import { Internal } from '~/widgets/Internal';\nexport const home = Internal;\n",
        ),
    ]);

    let first = run(&p);
    let second = run(&p);

    let digest = |r: &CheckResults| -> Vec<String> {
        let mut all: Vec<String> = r
            .all_issues()
            .map(|v| format!("{:?}|{}|{:?}", v.category, v.message, v.line))
            .collect();
        all.sort();
        all
    };
    assert_eq!(digest(&first), digest(&second));
}

#[test]
fn missing_target_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-dir");
    let result = ArchitectureChecker::new(Path::new(&missing), Config::new()).run();
    assert!(result.is_err());
}
