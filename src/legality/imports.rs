// src/legality/imports.rs
//! Import-edge legality. Rules apply in a fixed precedence order; the
//! first rule with an opinion wins.
//!
//! 1. external-import  — bare specifiers are unconditionally legal
//! 2. self-import      — a subsystem may import itself and its own subtree
//! 3. domain-utils     — `~/lib/domains/<d>/utils...` is a blanket grant
//! 4. allow-set        — exact or hierarchical match against the effective
//!                       permission set, with the grandchild re-block: one
//!                       segment past an allowed entry is free, two-plus
//!                       segments crossing into a nested subsystem re-apply
//!                       that subsystem's boundary
//! 5. (no match)       — DENY, an undeclared outbound dependency

use std::collections::HashSet;
use std::path::Path;

use crate::config::MANIFEST_FILE;
use crate::paths::{self, ImportPath, PathContext};

/// Outcome of an import-edge decision. `Allow` names the rule that granted
/// the edge, which keeps precedence unit-testable rule by rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(&'static str),
    Deny,
}

impl Decision {
    #[must_use]
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// One import edge under examination.
pub struct ImportCheck<'a> {
    /// The literal specifier as written in the source.
    pub spec: &'a str,
    /// Alias form of the importing subsystem's root (`~/a/b`, or `~`).
    pub subsystem_alias: &'a str,
    /// Filesystem path of the importing subsystem.
    pub subsystem_path: &'a Path,
    /// Effective allowed set from the permission resolver.
    pub allowed: &'a HashSet<String>,
    pub ctx: &'a PathContext,
}

type Rule = fn(&ImportCheck<'_>) -> Option<Decision>;

const RULES: &[(&str, Rule)] = &[
    ("external-import", external_import),
    ("self-import", self_import),
    ("domain-utils", domain_utils),
    ("allow-set", allow_set),
];

/// Decides an import edge. Falls through to DENY when no rule matches.
#[must_use]
pub fn decide(check: &ImportCheck<'_>) -> Decision {
    for (_, rule) in RULES {
        if let Some(decision) = rule(check) {
            return decision;
        }
    }
    Decision::Deny
}

fn external_import(check: &ImportCheck<'_>) -> Option<Decision> {
    ImportPath::parse(check.spec)
        .is_external()
        .then_some(Decision::Allow("external-import"))
}

fn self_import(check: &ImportCheck<'_>) -> Option<Decision> {
    let alias = check.subsystem_alias;
    (check.spec == alias || check.spec.starts_with(&format!("{alias}/")))
        .then_some(Decision::Allow("self-import"))
}

fn domain_utils(check: &ImportCheck<'_>) -> Option<Decision> {
    paths::is_domain_utils_spec(check.spec).then_some(Decision::Allow("domain-utils"))
}

fn allow_set(check: &ImportCheck<'_>) -> Option<Decision> {
    for entry in check.allowed {
        if entry.is_empty() {
            continue;
        }

        if check.spec == entry {
            return Some(Decision::Allow("allow-set"));
        }

        let normalized = entry.trim_end_matches('/');
        let prefix = format!("{normalized}/");
        if !check.spec.starts_with(&prefix) {
            continue;
        }
        let child_path = &check.spec[prefix.len()..];
        if child_path.is_empty() {
            return Some(Decision::Allow("allow-set"));
        }

        // A hierarchically-granted import that still crosses into some
        // declared subsystem must go through that subsystem's interface,
        // unless importer and target share the granted hierarchy or the
        // same domain.
        if crosses_into_subsystem(check.spec, check.ctx) {
            let within_self = check
                .spec
                .starts_with(&format!("{}/", check.subsystem_alias));
            let shared_hierarchy = check.spec.starts_with(&prefix)
                && check.subsystem_alias.starts_with(&prefix);
            if !within_self
                && !shared_hierarchy
                && !same_domain_hierarchical(check.spec, check.subsystem_path, check.ctx)
            {
                continue;
            }
        }

        // Grandchild re-block: a direct one-level child of an allowed entry
        // is never re-blocked; a deeper path whose target is itself a
        // declared subsystem needs its own explicit permission.
        if child_path.contains('/') {
            if let Some(base) = check.ctx.resolve_alias(normalized) {
                if base.join(child_path).join(MANIFEST_FILE).exists() {
                    continue;
                }
            }
        }

        return Some(Decision::Allow("allow-set"));
    }

    None
}

/// True if the specifier reaches *past* some declared subsystem's root into
/// its interior.
fn crosses_into_subsystem(spec: &str, ctx: &PathContext) -> bool {
    let Some(fs_path) = ctx.resolve_alias(spec) else {
        return false;
    };

    let mut current: Option<&Path> = Some(&fs_path);
    while let Some(cur) = current {
        if cur == ctx.target_root || !cur.starts_with(&ctx.target_root) {
            break;
        }
        if cur.join(MANIFEST_FILE).exists() {
            let alias = ctx.alias_of(cur);
            return spec.starts_with(&format!("{alias}/")) && spec != alias;
        }
        current = cur.parent();
    }

    false
}

/// Same-domain hierarchical imports are allowed to cross interior
/// boundaries: a domain is one bounded capability.
fn same_domain_hierarchical(spec: &str, subsystem_path: &Path, ctx: &PathContext) -> bool {
    let Some(import_domain) = paths::domain_of_spec(spec) else {
        return false;
    };
    ctx.domain_of_path(subsystem_path)
        .is_some_and(|d| d == import_domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::PathContext;
    use std::collections::HashSet;
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

    fn decide_spec(f: &Fixture, spec: &str, alias: &str, sub: &Path, allowed: &[&str]) -> Decision {
        let ctx = PathContext::new(&f.src);
        let allowed: HashSet<String> = allowed.iter().map(|s| (*s).to_string()).collect();
        decide(&ImportCheck {
            spec,
            subsystem_alias: alias,
            subsystem_path: sub,
            allowed: &allowed,
            ctx: &ctx,
        })
    }

    #[test]
    fn external_always_allowed() {
        let f = fixture();
        let sub = f.src.join("a");
        let d = decide_spec(&f, "react", "~/a", &sub, &[]);
        assert_eq!(d, Decision::Allow("external-import"));
    }

    #[test]
    fn self_import_ignores_allowed_set() {
        let f = fixture();
        let sub = f.src.join("widgets");
        assert_eq!(
            decide_spec(&f, "~/widgets/internal/deep", "~/widgets", &sub, &[]),
            Decision::Allow("self-import")
        );
        assert_eq!(
            decide_spec(&f, "~/widgets", "~/widgets", &sub, &[]),
            Decision::Allow("self-import")
        );
    }

    #[test]
    fn domain_utils_blanket_grant() {
        let f = fixture();
        let sub = f.src.join("app/dash");
        assert_eq!(
            decide_spec(&f, "~/lib/domains/mapping/utils", "~/app/dash", &sub, &[]),
            Decision::Allow("domain-utils")
        );
        assert_eq!(
            decide_spec(&f, "~/lib/domains/mapping/utils/geo", "~/app/dash", &sub, &[]),
            Decision::Allow("domain-utils")
        );
    }

    #[test]
    fn exact_and_hierarchical_allow() {
        let f = fixture();
        let sub = f.src.join("a");
        assert!(decide_spec(&f, "~/lib/flags", "~/a", &sub, &["~/lib/flags"]).is_allow());
        assert!(decide_spec(&f, "~/lib/flags/deep", "~/a", &sub, &["~/lib/flags"]).is_allow());
        assert_eq!(
            decide_spec(&f, "~/lib/other", "~/a", &sub, &["~/lib/flags"]),
            Decision::Deny
        );
    }

    #[test]
    fn grandchild_reblock() {
        let f = fixture();
        // ~/x is allowed; ~/x/y is itself a subsystem.
        write(&f.src.join("x/dependencies.json"), "{}");
        write(&f.src.join("x/y/dependencies.json"), "{}");
        let sub = f.src.join("a");

        // One level past the allowed entry: never re-blocked.
        assert!(decide_spec(&f, "~/x/y", "~/a", &sub, &["~/x"]).is_allow());
        // Two-plus levels, crossing into the nested subsystem: re-blocked.
        assert_eq!(
            decide_spec(&f, "~/x/y/z", "~/a", &sub, &["~/x"]),
            Decision::Deny
        );
    }

    #[test]
    fn deep_grant_below_plain_directory_is_allowed() {
        let f = fixture();
        // ~/x is an allowed plain directory (no manifest anywhere below),
        // so arbitrarily deep paths pass.
        std::fs::create_dir_all(f.src.join("x/plain/inner")).unwrap();
        let sub = f.src.join("a");
        assert!(decide_spec(&f, "~/x/plain/inner", "~/a", &sub, &["~/x"]).is_allow());
    }

    #[test]
    fn deep_path_into_allowed_subsystem_reapplies_boundary() {
        let f = fixture();
        // ~/x is allowed but is itself a subsystem: reaching past its root
        // still has to go through its interface.
        write(&f.src.join("x/dependencies.json"), "{}");
        std::fs::create_dir_all(f.src.join("x/plain/inner")).unwrap();
        let sub = f.src.join("a");
        assert_eq!(
            decide_spec(&f, "~/x/plain/inner", "~/a", &sub, &["~/x"]),
            Decision::Deny
        );
    }

    #[test]
    fn trailing_slash_entries_normalize() {
        let f = fixture();
        let sub = f.src.join("a");
        assert!(decide_spec(&f, "~/components/ui/button", "~/a", &sub, &["~/components/ui/"]).is_allow());
    }

    #[test]
    fn unmatched_denies() {
        let f = fixture();
        let sub = f.src.join("a");
        assert_eq!(decide_spec(&f, "~/lib/db", "~/a", &sub, &[]), Decision::Deny);
    }
}
