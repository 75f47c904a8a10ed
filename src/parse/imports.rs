// src/parse/imports.rs
//! Import statement extraction.
//!
//! Recognizes default, named (with aliases and inline `type` markers),
//! namespace, type-only, and dynamic imports, across single- and
//! multi-line forms. Operates on comment-stripped text.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::scanner::{line_of_offset, split_top_level_commas};
use crate::paths::ImportPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Default,
    Named,
    Namespace,
    Type,
    Dynamic,
}

#[derive(Debug, Clone)]
pub struct ImportFact {
    /// The literal specifier string as written in the source.
    pub specifier: String,
    /// Classified form, computed once here.
    pub path: ImportPath,
    /// Bound name (`*` for dynamic imports).
    pub name: String,
    /// Pre-alias name for `foo as bar` bindings.
    pub original_name: Option<String>,
    pub kind: ImportKind,
    pub line: usize,
}

impl ImportFact {
    fn new(name: &str, original: Option<&str>, spec: &str, kind: ImportKind, line: usize) -> Self {
        Self {
            specifier: spec.to_string(),
            path: ImportPath::parse(spec),
            name: name.to_string(),
            original_name: original.map(str::to_string),
            kind,
            line,
        }
    }
}

static NAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)import\s*\{\s*((?:[^{}]|\{[^}]*\})*?)\s*\}\s*from\s*["']([^"']+)["']"#)
        .expect("valid regex")
});

static TYPE_NAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)import\s+type\s*\{\s*((?:[^{}]|\{[^}]*\})*?)\s*\}\s*from\s*["']([^"']+)["']"#)
        .expect("valid regex")
});

static DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*import\s+(\w+)\s+from\s+["']([^"']+)["']"#).expect("valid regex")
});

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s*\*\s*as\s+(\w+)\s+from\s+["']([^"']+)["']"#).expect("valid regex")
});

static DYNAMIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s*\(\s*["']([^"']+)["']\s*\)"#).expect("valid regex")
});

/// Extracts all import facts from comment-stripped content.
#[must_use]
pub fn extract(stripped: &str) -> Vec<ImportFact> {
    let mut facts = Vec::new();

    // Named imports (single- or multi-line): import { a, b as c, type D } from 'x'
    for caps in NAMED_RE.captures_iter(stripped) {
        let spec = &caps[2];
        let line = line_of_offset(stripped, caps.get(0).map_or(0, |m| m.start()));
        for entry in split_top_level_commas(&caps[1]) {
            push_named(&mut facts, &entry, spec, line, false);
        }
    }

    // Type-only named imports: import type { A, B } from 'x'
    for caps in TYPE_NAMED_RE.captures_iter(stripped) {
        let spec = &caps[2];
        let line = line_of_offset(stripped, caps.get(0).map_or(0, |m| m.start()));
        for entry in split_top_level_commas(&caps[1]) {
            push_named(&mut facts, &entry, spec, line, true);
        }
    }

    // Line-shaped forms.
    for (idx, line) in stripped.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if !trimmed.contains('{') {
            if let Some(caps) = DEFAULT_RE.captures(line) {
                facts.push(ImportFact::new(
                    &caps[1],
                    None,
                    &caps[2],
                    ImportKind::Default,
                    line_no,
                ));
                continue;
            }
        }

        if let Some(caps) = NAMESPACE_RE.captures(line) {
            facts.push(ImportFact::new(
                &caps[1],
                None,
                &caps[2],
                ImportKind::Namespace,
                line_no,
            ));
        }
    }

    // Dynamic imports: import('x') / await import('x'). The whole target
    // module is bound, so the name is the wildcard marker.
    for caps in DYNAMIC_RE.captures_iter(stripped) {
        let line = line_of_offset(stripped, caps.get(0).map_or(0, |m| m.start()));
        facts.push(ImportFact::new(
            "*",
            None,
            &caps[1],
            ImportKind::Dynamic,
            line,
        ));
    }

    facts
}

fn push_named(facts: &mut Vec<ImportFact>, entry: &str, spec: &str, line: usize, type_only: bool) {
    let entry = entry.trim();
    if entry.is_empty() {
        return;
    }

    // Inline type marker: `type Foo` inside a value import list.
    let (entry, kind) = match entry.strip_prefix("type ") {
        Some(rest) => (rest.trim(), ImportKind::Type),
        None if type_only => (entry, ImportKind::Type),
        None => (entry, ImportKind::Named),
    };

    if let Some((original, alias)) = entry.split_once(" as ") {
        facts.push(ImportFact::new(
            alias.trim(),
            Some(original.trim()),
            spec,
            kind,
            line,
        ));
    } else {
        facts.push(ImportFact::new(entry, None, spec, kind, line));
    }
}
