// src/legality/reexports.rs
//! Re-export legality for index (barrel) files.
//!
//! A narrow state machine over each re-export's source path:
//! relative child references must name a declared child subsystem or an
//! existing internal file; upward references are denied; root-alias
//! references must stay inside the subsystem's own subtree. Domain utils
//! get two dedicated rules: a domain index must not funnel its utils, and
//! a domain's utils subsystem may re-export same-domain siblings (it acts
//! as a client-safe facade).

use std::path::Path;

use crate::paths::PathContext;

pub const REASON_UPWARD: &str = "index files cannot reexport from parent directories - either move implementation here or import directly from original location";
pub const REASON_DOMAIN_INDEX_UTILS: &str =
    "domain index should not reexport utils - import directly from utils instead";
pub const REASON_ENCAPSULATION: &str = "reexport from external subsystem violates encapsulation";
pub const REASON_INVALID_INTERNAL: &str =
    "reexport does not resolve to a declared child subsystem or internal file";
pub const REASON_INVALID_PATTERN: &str = "invalid reexport pattern";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReexportViolation {
    pub line: usize,
    pub spec: String,
    pub reason: &'static str,
}

/// Classifies whether a re-export source points upward: at an ancestor or
/// an ancestor's sibling rather than a descendant. Root-alias paths are
/// upward when they share a >= 2 segment prefix with the subsystem while
/// having equal-or-fewer total segments.
#[must_use]
pub fn is_upward_reexport(dir: &Path, spec: &str, ctx: &PathContext) -> bool {
    // A domain's utils may reach back into its own domain; that is the
    // facade exception, not an upward re-export.
    if ctx.is_domain_utils_dir(dir) {
        if let Some(domain) = ctx.domain_of_path(dir) {
            let domain_prefix = format!("~/lib/domains/{domain}");
            let own_alias = ctx.alias_of(dir);
            if spec.starts_with(&domain_prefix) && !spec.starts_with(&format!("{own_alias}/")) {
                return false;
            }
        }
    }

    if spec.starts_with("../") {
        return true;
    }

    if spec.starts_with("~/") {
        let alias = ctx.alias_of(dir);
        if spec == alias || spec.starts_with(&format!("{alias}/")) {
            return false;
        }

        let spec_parts: Vec<&str> = spec.split('/').collect();
        let alias_parts: Vec<&str> = alias.split('/').collect();
        let common = spec_parts
            .iter()
            .zip(alias_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();

        if spec_parts.len() <= alias_parts.len() && common >= 2 {
            return true;
        }
    }

    false
}

/// Checks one re-export statement of a subsystem's index file. Returns the
/// violation, or `None` when the re-export is legal.
#[must_use]
pub fn check_reexport(
    dir: &Path,
    declared_children: &[String],
    spec: &str,
    line: usize,
    ctx: &PathContext,
) -> Option<ReexportViolation> {
    let violation = |reason: &'static str| {
        Some(ReexportViolation {
            line,
            spec: spec.to_string(),
            reason,
        })
    };

    if is_upward_reexport(dir, spec, ctx) {
        return violation(REASON_UPWARD);
    }

    // A domain's top-level index must not funnel its utils; consumers
    // import utils directly.
    if is_domain_index(dir, ctx) {
        if spec == "./utils" || spec.starts_with("./utils/") {
            return violation(REASON_DOMAIN_INDEX_UTILS);
        }
        let utils_alias = format!("{}/utils", ctx.alias_of(dir));
        if spec == utils_alias || spec.starts_with(&format!("{utils_alias}/")) {
            return violation(REASON_DOMAIN_INDEX_UTILS);
        }
    }

    // Domain utils re-exporting inside its own domain (absolutely or
    // relatively) builds the client-safe facade; allowed.
    if ctx.is_domain_utils_dir(dir) {
        if let Some(domain) = ctx.domain_of_path(dir) {
            let domain_prefix = format!("~/lib/domains/{domain}");
            if spec.starts_with(&domain_prefix) || spec.starts_with("../") {
                return None;
            }
        }
    }

    if let Some(child_name) = spec.strip_prefix("./") {
        if declared_children.contains(&format!("./{child_name}")) {
            return None;
        }
        if internal_file_exists(dir, child_name) {
            return None;
        }
        return violation(REASON_INVALID_INTERNAL);
    }

    if spec.starts_with("../") {
        return violation(REASON_ENCAPSULATION);
    }

    if spec.starts_with("~/") {
        let alias = ctx.alias_of(dir);
        if spec.starts_with(&format!("{alias}/")) {
            return None;
        }
        return violation(REASON_ENCAPSULATION);
    }

    if !spec.starts_with('.') && !spec.starts_with('~') {
        // Bare external specifier.
        return None;
    }

    violation(REASON_INVALID_PATTERN)
}

/// True when `dir` is a domain's top-level directory with an index file.
fn is_domain_index(dir: &Path, ctx: &PathContext) -> bool {
    ctx.is_domain_root(dir) && (dir.join("index.ts").exists() || dir.join("index.tsx").exists())
}

/// An internal reference resolves to `<name>.ts[x]` or `<name>/index.ts[x]`
/// within the subsystem.
fn internal_file_exists(dir: &Path, name: &str) -> bool {
    dir.join(format!("{name}.ts")).exists()
        || dir.join(format!("{name}.tsx")).exists()
        || dir.join(name).join("index.ts").exists()
        || dir.join(name).join("index.tsx").exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        src: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        Fixture { _dir: dir, src }
    }

    #[test]
    fn upward_relative_is_denied() {
        let f = fixture();
        let dir = f.src.join("widgets");
        std::fs::create_dir_all(&dir).unwrap();
        let ctx = PathContext::new(&f.src);
        let v = check_reexport(&dir, &[], "../types", 3, &ctx).unwrap();
        assert_eq!(v.reason, REASON_UPWARD);
        assert_eq!(v.line, 3);
    }

    #[test]
    fn upward_alias_classification() {
        let f = fixture();
        let dir = f.src.join("lib/auth/session");
        std::fs::create_dir_all(&dir).unwrap();
        let ctx = PathContext::new(&f.src);

        // Ancestor: fewer segments, shared prefix.
        assert!(is_upward_reexport(&dir, "~/lib/auth", &ctx));
        // Ancestor's sibling: equal segments, shared prefix.
        assert!(is_upward_reexport(&dir, "~/lib/flags/core", &ctx));
        // Own subtree: downward, fine.
        assert!(!is_upward_reexport(&dir, "~/lib/auth/session/token", &ctx));
        // Self: not upward.
        assert!(!is_upward_reexport(&dir, "~/lib/auth/session", &ctx));
    }

    #[test]
    fn declared_child_and_internal_file_allowed() {
        let f = fixture();
        let dir = f.src.join("widgets");
        write(&dir.join("Button.tsx"), "export const Button = 1;\n");
        std::fs::create_dir_all(dir.join("grid")).unwrap();
        write(&dir.join("grid/index.ts"), "export {};\n");
        let ctx = PathContext::new(&f.src);

        let children = vec!["./panel".to_string()];
        assert!(check_reexport(&dir, &children, "./panel", 1, &ctx).is_none());
        assert!(check_reexport(&dir, &children, "./Button", 2, &ctx).is_none());
        assert!(check_reexport(&dir, &children, "./grid", 3, &ctx).is_none());

        let v = check_reexport(&dir, &children, "./ghost", 4, &ctx).unwrap();
        assert_eq!(v.reason, REASON_INVALID_INTERNAL);
    }

    #[test]
    fn alias_outside_subtree_is_encapsulation_violation() {
        let f = fixture();
        let dir = f.src.join("widgets");
        std::fs::create_dir_all(&dir).unwrap();
        let ctx = PathContext::new(&f.src);

        assert!(check_reexport(&dir, &[], "~/widgets/inner", 1, &ctx).is_none());
        // Unrelated path, more segments than the subsystem: not "upward",
        // but still breaks encapsulation.
        let v = check_reexport(&dir, &[], "~/other/place/deep", 2, &ctx).unwrap();
        assert_eq!(v.reason, REASON_ENCAPSULATION);
    }

    #[test]
    fn bare_external_reexport_allowed() {
        let f = fixture();
        let dir = f.src.join("widgets");
        std::fs::create_dir_all(&dir).unwrap();
        let ctx = PathContext::new(&f.src);
        assert!(check_reexport(&dir, &[], "zod", 1, &ctx).is_none());
    }

    #[test]
    fn domain_index_must_not_reexport_utils() {
        let f = fixture();
        let domain = f.src.join("lib/domains/mapping");
        write(&domain.join("index.ts"), "export {};\n");
        let ctx = PathContext::new(&f.src);

        let v = check_reexport(&domain, &[], "./utils", 1, &ctx).unwrap();
        assert_eq!(v.reason, REASON_DOMAIN_INDEX_UTILS);
        let v = check_reexport(&domain, &[], "~/lib/domains/mapping/utils/geo", 2, &ctx).unwrap();
        assert_eq!(v.reason, REASON_DOMAIN_INDEX_UTILS);
    }

    #[test]
    fn domain_utils_may_reexport_same_domain_sibling() {
        let f = fixture();
        let utils = f.src.join("lib/domains/mapping/utils");
        std::fs::create_dir_all(&utils).unwrap();
        let ctx = PathContext::new(&f.src);

        assert!(check_reexport(&utils, &[], "~/lib/domains/mapping/types", 1, &ctx).is_none());
        assert!(check_reexport(&utils, &[], "../services", 2, &ctx).is_none());
    }
}
