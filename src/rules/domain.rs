// src/rules/domain.rs
//! Domain-container rules: required structure inside each domain, service
//! import restrictions, and the cross-domain import ban.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::{is_test_file, should_prune, MANIFEST_FILE};
use crate::types::{Category, Remediation, Violation};

use super::CheckContext;

/// Services need a manifest and an index; infrastructure children need
/// manifests; utils needs an index.
#[must_use]
pub fn check_domain_structure(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for domain_dir in domain_dirs(cx) {
        violations.extend(check_services_structure(&domain_dir));
        violations.extend(check_infrastructure_structure(&domain_dir));
        violations.extend(check_utils_structure(&domain_dir));
    }

    violations
}

fn check_services_structure(domain_dir: &Path) -> Vec<Violation> {
    let services = domain_dir.join("services");
    if !services.exists() {
        return Vec::new();
    }

    let mut violations = Vec::new();
    if !services.join(MANIFEST_FILE).exists() {
        violations.push(
            Violation::error(
                Category::DomainStructure,
                format!("{} needs {MANIFEST_FILE}", services.display()),
            )
            .subsystem(services.to_string_lossy())
            .recommend(
                Remediation::CreateManifest,
                format!("Create {}/{MANIFEST_FILE} file", services.display()),
            ),
        );
    }
    if !services.join("index.ts").exists() {
        violations.push(
            Violation::error(
                Category::DomainStructure,
                format!("{} missing index.ts to expose services", services.display()),
            )
            .subsystem(services.to_string_lossy())
            .recommend(
                Remediation::CreateSubsystemIndex,
                format!(
                    "Create {}/index.ts file to reexport service modules",
                    services.display()
                ),
            ),
        );
    }
    violations
}

fn check_infrastructure_structure(domain_dir: &Path) -> Vec<Violation> {
    let mut violations = Vec::new();

    for entry in WalkDir::new(domain_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !should_prune(&e.file_name().to_string_lossy()))
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let under_infra = path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|n| n == "infrastructure");
        if under_infra && !path.join(MANIFEST_FILE).exists() {
            violations.push(
                Violation::error(
                    Category::DomainStructure,
                    format!("Infrastructure {} needs {MANIFEST_FILE}", path.display()),
                )
                .subsystem(path.to_string_lossy())
                .recommend(
                    Remediation::CreateManifest,
                    format!("Create {}/{MANIFEST_FILE} file", path.display()),
                ),
            );
        }
    }

    violations
}

fn check_utils_structure(domain_dir: &Path) -> Vec<Violation> {
    let utils = domain_dir.join("utils");
    if utils.exists() && !utils.join("index.ts").exists() {
        return vec![
            Violation::error(
                Category::DomainStructure,
                format!("{} missing index.ts to expose utilities", utils.display()),
            )
            .subsystem(utils.to_string_lossy())
            .recommend(
                Remediation::CreateSubsystemIndex,
                format!(
                    "Create {}/index.ts file to reexport utility modules",
                    utils.display()
                ),
            ),
        ];
    }
    Vec::new()
}

/// Domain services are backend entry points: importable by the domain's
/// own index and `services/*`, or by API/server code outside the domain.
/// Cross-domain service/infrastructure imports are banned outright.
#[must_use]
pub fn check_domain_import_restrictions(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for service_file in service_files(cx) {
        violations.extend(check_service_importers(cx, &service_file));
    }

    violations.extend(check_cross_domain_imports(cx));
    violations
}

fn service_files(cx: &CheckContext<'_>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for domain_dir in domain_dirs(cx) {
        let services = domain_dir.join("services");
        if !services.exists() {
            continue;
        }
        for entry in WalkDir::new(&services)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().is_some_and(|e| e == "ts")
                && path.file_name().is_some_and(|n| n != "index.ts")
                && !is_test_file(path)
            {
                files.push(path.to_path_buf());
            }
        }
    }
    files
}

fn check_service_importers(cx: &CheckContext<'_>, service_file: &Path) -> Vec<Violation> {
    let mut violations = Vec::new();
    let Some(domain) = cx.ctx.domain_of_path(service_file) else {
        return violations;
    };
    let service_name = service_file
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().to_string());

    let service_alias = cx
        .ctx
        .alias_of(service_file)
        .trim_end_matches(".ts")
        .to_string();
    let services_index_alias = format!("~/lib/domains/{domain}/services");

    for file in cx.source_files {
        if file == service_file {
            continue;
        }
        let file_str = file.to_string_lossy();
        // API and server layers are the intended consumers.
        if file_str.contains("/api/") || file_str.contains("/server/") {
            continue;
        }

        let source = cx.cache.source(file);
        let imports_service = source
            .outbound_specifiers()
            .any(|(spec, _)| spec == service_alias || spec == services_index_alias);
        if !imports_service {
            continue;
        }

        let relative = cx.display(file);
        let in_same_domain = cx.ctx.domain_of_path(file).as_deref() == Some(domain.as_str());

        if in_same_domain {
            let is_domain_index = relative == format!("lib/domains/{domain}/index.ts");
            let in_services = relative.starts_with(&format!("lib/domains/{domain}/services"));
            if is_domain_index || in_services {
                continue;
            }
            violations.push(
                Violation::error(
                    Category::DomainImport,
                    format!(
                        "Service {service_name} imported by restricted file {relative} - only domain index.ts and services/* can import domain services"
                    ),
                )
                .subsystem(service_file.parent().unwrap_or(service_file).to_string_lossy())
                .file(relative.clone())
                .recommend(
                    Remediation::FixDomainServiceImport,
                    format!(
                        "Remove service import from {relative} - only domain index.ts and services/* can import domain services"
                    ),
                ),
            );
        } else {
            violations.push(
                Violation::error(
                    Category::DomainImport,
                    format!(
                        "Service {service_name} imported by non-domain file {relative} - services should only be used through API/server layer"
                    ),
                )
                .subsystem(service_file.parent().unwrap_or(service_file).to_string_lossy())
                .file(relative.clone())
                .recommend(
                    Remediation::MoveServiceToApi,
                    format!(
                        "Move service import from {relative} to API/server code, or use domain public interface"
                    ),
                ),
            );
        }
    }

    violations
}

/// A domain may import another domain's utils, nothing else of it.
fn check_cross_domain_imports(cx: &CheckContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    let domains = domain_dirs(cx);

    for domain_dir in &domains {
        let Some(domain) = cx.ctx.domain_of_path(domain_dir) else {
            continue;
        };

        for file in cx.source_files {
            if !file.starts_with(domain_dir) {
                continue;
            }
            let source = cx.cache.source(file);

            'file_scan: for other_dir in &domains {
                if other_dir == domain_dir {
                    continue;
                }
                let Some(other) = cx.ctx.domain_of_path(other_dir) else {
                    continue;
                };

                let forbidden = [
                    format!("~/lib/domains/{other}/services"),
                    format!("~/lib/domains/{other}/infrastructure"),
                    format!("~/lib/domains/{other}/_"),
                    format!("~/lib/domains/{other}/index"),
                ];

                for (spec, line) in source.outbound_specifiers() {
                    if forbidden.iter().any(|f| spec.starts_with(f.as_str())) {
                        let relative = cx.display(file);
                        violations.push(
                            Violation::error(
                                Category::DomainImport,
                                format!(
                                    "Cross-domain import violation: {relative} - domain '{domain}' importing from domain '{other}'"
                                ),
                            )
                            .subsystem(file.parent().unwrap_or(file).to_string_lossy())
                            .file(relative)
                            .line(line)
                            .recommend(
                                Remediation::RemoveCrossDomainImport,
                                format!(
                                    "Remove cross-domain import from {} - domains should only import other domain utils, not services/infrastructure",
                                    cx.display(file)
                                ),
                            ),
                        );
                        // One report per file per offending domain.
                        continue 'file_scan;
                    }
                }
            }
        }
    }

    violations
}

fn domain_dirs(cx: &CheckContext<'_>) -> Vec<PathBuf> {
    let domains_root = cx.ctx.target_root.join("lib").join("domains");
    let Ok(entries) = std::fs::read_dir(&domains_root) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}
