// tests/integration_domain.rs
//! Domain-container scenarios: the utils carve-out, the utils-interface
//! overlay, service import restrictions, and cross-domain bans.

use std::fs;
use std::path::PathBuf;

use archwarden_core::checker::ArchitectureChecker;
use archwarden_core::config::Config;
use archwarden_core::types::{Category, CheckResults, Remediation};
use tempfile::TempDir;

struct Project {
    _dir: TempDir,
    src: PathBuf,
}

fn project(files: &[(&str, &str)]) -> Project {
    let dir = tempfile::tempdir().unwrap();
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

#[test]
fn domain_utils_are_importable_without_declaration() {
    let p = project(&[
        ("src/app/dependencies.json", "{}"),
        (
            "src/app/main.ts",
            "import { project } from '~/lib/domains/geo/utils';\nexport const m = project;\n",
        ),
        (
            "src/lib/domains/geo/utils/index.ts",
            "export const project = 1;\n",
        ),
    ]);

    let results = run(&p);
    assert!(
        results.errors.is_empty(),
        "utils carve-out must be implicit: {:?}",
        results.errors.iter().map(|e| &e.message).collect::<Vec<_>>()
    );
}

#[test]
fn direct_utils_file_import_is_an_error() {
    let p = project(&[
        ("src/app/dependencies.json", "{}"),
        (
            "src/app/main.ts",
            "import { project } from '~/lib/domains/geo/utils/project';\nexport const m = project;\n",
        ),
        (
            "src/lib/domains/geo/utils/index.ts",
            "export * from '~/lib/domains/geo/utils/project';\n",
        ),
        (
            "src/lib/domains/geo/utils/project.ts",
            "export const project = 1;\n",
        ),
    ]);

    let results = run(&p);
    let utils_errors: Vec<_> = results
        .errors
        .iter()
        .filter(|v| v.recommendation_type == Some(Remediation::UseUtilsInterface))
        .collect();
    assert_eq!(utils_errors.len(), 1);
    assert!(utils_errors[0]
        .recommendation
        .as_ref()
        .is_some_and(|r| r.contains("~/lib/domains/geo/utils")));
}

#[test]
fn utils_index_may_aggregate_its_own_files() {
    let p = project(&[
        ("src/lib/domains/geo/utils/dependencies.json", "{}"),
        (
            "src/lib/domains/geo/utils/index.ts",
            "export * from '~/lib/domains/geo/utils/project';\n",
        ),
        (
            "src/lib/domains/geo/utils/project.ts",
            "export const project = 1;\n",
        ),
    ]);

    let results = run(&p);
    assert!(results
        .errors
        .iter()
        .all(|v| v.recommendation_type != Some(Remediation::UseUtilsInterface)));
}

#[test]
fn declaring_domain_utils_is_redundant() {
    let p = project(&[
        (
            "src/app/dependencies.json",
            r#"{"allowed": ["~/lib/domains/geo/utils"]}"#,
        ),
        ("src/app/main.ts", "export const m = 1;\n"),
        (
            "src/lib/domains/geo/utils/index.ts",
            "export const project = 1;\n",
        ),
    ]);

    let results = run(&p);
    let redundancy: Vec<_> = results
        .errors
        .iter()
        .filter(|v| v.category == Category::Redundancy)
        .collect();
    assert_eq!(redundancy.len(), 1);
    assert!(redundancy[0].message.contains("implicitly allowed"));
}

#[test]
fn domain_index_must_not_reexport_utils() {
    let p = project(&[
        (
            "src/lib/domains/geo/dependencies.json",
            r#"{"subsystems": ["./utils"]}"#,
        ),
        (
            "src/lib/domains/geo/index.ts",
            "export * from './utils';\n",
        ),
        ("src/lib/domains/geo/utils/dependencies.json", "{}"),
        (
            "src/lib/domains/geo/utils/index.ts",
            "export const project = 1;\n",
        ),
    ]);

    let results = run(&p);
    let reexport: Vec<_> = results
        .errors
        .iter()
        .filter(|v| v.category == Category::ReexportBoundary)
        .collect();
    assert!(
        reexport
            .iter()
            .any(|v| v.message.contains("domain index should not reexport utils")),
        "got: {:?}",
        reexport.iter().map(|v| &v.message).collect::<Vec<_>>()
    );
}

#[test]
fn services_need_manifest_and_index() {
    let p = project(&[(
        "src/lib/domains/billing/services/invoice.ts",
        "export const invoice = 1;\n",
    )]);

    let results = run(&p);
    let structure: Vec<_> = results
        .errors
        .iter()
        .filter(|v| v.category == Category::DomainStructure)
        .collect();
    // Missing dependencies.json and missing index.ts.
    assert_eq!(structure.len(), 2);
}

#[test]
fn service_import_from_restricted_domain_file() {
    let p = project(&[
        ("src/lib/domains/billing/services/dependencies.json", "{}"),
        ("src/lib/domains/billing/services/index.ts", "export * from '~/lib/domains/billing/services/invoice';\n"),
        (
            "src/lib/domains/billing/services/invoice.ts",
            "export const invoice = 1;\n",
        ),
        (
            "src/lib/domains/billing/components/widget.ts",
            "import { invoice } from '~/lib/domains/billing/services/invoice';\nexport const w = invoice;\n",
        ),
    ]);

    let results = run(&p);
    let domain_errors: Vec<_> = results
        .errors
        .iter()
        .filter(|v| v.recommendation_type == Some(Remediation::FixDomainServiceImport))
        .collect();
    assert_eq!(domain_errors.len(), 1);
}

#[test]
fn api_layer_may_import_services() {
    let p = project(&[
        ("src/lib/domains/billing/services/dependencies.json", "{}"),
        ("src/lib/domains/billing/services/index.ts", "export {};\n"),
        (
            "src/lib/domains/billing/services/invoice.ts",
            "export const invoice = 1;\n",
        ),
        (
            "src/api/billing/route.ts",
            "import { invoice } from '~/lib/domains/billing/services/invoice';\nexport const handler = invoice;\n",
        ),
    ]);

    let results = run(&p);
    assert!(results
        .errors
        .iter()
        .all(|v| v.category != Category::DomainImport));
}

#[test]
fn cross_domain_service_import_is_banned() {
    let p = project(&[
        (
            "src/lib/domains/billing/services/invoice.ts",
            "export const invoice = 1;\n",
        ),
        ("src/lib/domains/billing/services/dependencies.json", "{}"),
        ("src/lib/domains/billing/services/index.ts", "export {};\n"),
        (
            "src/lib/domains/geo/resolver.ts",
            "import { invoice } from '~/lib/domains/billing/services/invoice';\nexport const r = invoice;\n",
        ),
    ]);

    let results = run(&p);
    let cross: Vec<_> = results
        .errors
        .iter()
        .filter(|v| v.recommendation_type == Some(Remediation::RemoveCrossDomainImport))
        .collect();
    assert_eq!(cross.len(), 1);
    assert!(cross[0].message.contains("'geo'"));
    assert!(cross[0].message.contains("'billing'"));
}
