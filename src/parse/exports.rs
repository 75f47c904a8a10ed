// src/parse/exports.rs
//! Export statement extraction.
//!
//! A named-export statement with a source path is a re-export (barrel
//! surface); without one it is a local export. Wildcard re-exports bind
//! the `*` marker.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::scanner::{line_of_offset, split_top_level_commas};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Named,
    Type,
    Wildcard,
    Default,
    /// `export const/function/class/interface/type X ...` declared in place.
    Decl,
}

#[derive(Debug, Clone)]
pub struct ExportFact {
    /// Exported name, or `*` for wildcard re-exports.
    pub name: String,
    pub kind: ExportKind,
    /// Source specifier when this is a re-export.
    pub from_path: Option<String>,
    pub original_name: Option<String>,
    pub line: usize,
}

impl ExportFact {
    #[must_use]
    pub fn is_reexport(&self) -> bool {
        self.from_path.is_some()
    }

    #[must_use]
    pub fn is_type_only(&self) -> bool {
        self.kind == ExportKind::Type
    }
}

static NAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)export\s*\{\s*((?:[^{}]|\{[^}]*\})*?)\s*\}(?:\s*from\s*["']([^"']+)["'])?"#,
    )
    .expect("valid regex")
});

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)export\s+type\s*\{\s*((?:[^{}]|\{[^}]*\})*?)\s*\}(?:\s*from\s*["']([^"']+)["'])?"#,
    )
    .expect("valid regex")
});

static WILDCARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"export\s*\*\s*from\s*["']([^"']+)["']"#).expect("valid regex")
});

static DEFAULT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+default\s+(?:async\s+)?(?:function\s+)?(\w+)").expect("valid regex")
});

static DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*export\s+(?:async\s+)?(const|function|class|interface|type|let|var)\s+(\w+)")
        .expect("valid regex")
});

/// Extracts all export facts from comment-stripped content.
#[must_use]
pub fn extract(stripped: &str) -> Vec<ExportFact> {
    let mut facts = Vec::new();

    for caps in NAMED_RE.captures_iter(stripped) {
        collect_braced(&mut facts, stripped, &caps, ExportKind::Named);
    }

    for caps in TYPE_RE.captures_iter(stripped) {
        collect_braced(&mut facts, stripped, &caps, ExportKind::Type);
    }

    for caps in WILDCARD_RE.captures_iter(stripped) {
        let line = line_of_offset(stripped, caps.get(0).map_or(0, |m| m.start()));
        facts.push(ExportFact {
            name: "*".to_string(),
            kind: ExportKind::Wildcard,
            from_path: Some(caps[1].to_string()),
            original_name: None,
            line,
        });
    }

    for (idx, line) in stripped.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("export default") {
            let name = DEFAULT_NAME_RE
                .captures(trimmed)
                .map_or_else(|| "default".to_string(), |c| c[1].to_string());
            facts.push(ExportFact {
                name,
                kind: ExportKind::Default,
                from_path: None,
                original_name: None,
                line: line_no,
            });
            continue;
        }

        if let Some(caps) = DECL_RE.captures(line) {
            facts.push(ExportFact {
                name: caps[2].to_string(),
                kind: ExportKind::Decl,
                from_path: None,
                original_name: None,
                line: line_no,
            });
        }
    }

    facts
}

fn collect_braced(
    facts: &mut Vec<ExportFact>,
    stripped: &str,
    caps: &regex::Captures<'_>,
    kind: ExportKind,
) {
    let from_path = caps.get(2).map(|m| m.as_str().to_string());
    let line = line_of_offset(stripped, caps.get(0).map_or(0, |m| m.start()));
    for entry in split_top_level_commas(&caps[1]) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (name, original) = match entry.split_once(" as ") {
            Some((original, alias)) => (alias.trim().to_string(), Some(original.trim().to_string())),
            None => (entry.to_string(), None),
        };
        facts.push(ExportFact {
            name,
            kind,
            from_path: from_path.clone(),
            original_name: original,
            line,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_named_export() {
        let facts = extract("export { foo, bar as baz };\n");
        assert_eq!(facts.len(), 2);
        assert!(!facts[0].is_reexport());
        assert_eq!(facts[1].name, "baz");
        assert_eq!(facts[1].original_name.as_deref(), Some("bar"));
    }

    #[test]
    fn reexport_with_source() {
        let facts = extract("export { login, logout } from './session';\n");
        assert_eq!(facts.len(), 2);
        assert!(facts.iter().all(ExportFact::is_reexport));
        assert_eq!(facts[0].from_path.as_deref(), Some("./session"));
    }

    #[test]
    fn wildcard_reexport() {
        let facts = extract("export * from '~/lib/domains/iam/utils';\n");
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].name, "*");
        assert_eq!(facts[0].kind, ExportKind::Wildcard);
    }

    #[test]
    fn type_only_reexport() {
        let facts = extract("export type { User } from './types';\n");
        assert_eq!(facts.len(), 1);
        assert!(facts[0].is_type_only());
        assert!(facts[0].is_reexport());
    }

    #[test]
    fn default_and_decl_exports() {
        let src = "export default function App() {}\nexport const helper = () => 1;\nexport interface Props {}\n";
        let facts = extract(src);
        let names: Vec<_> = facts.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"App"));
        assert!(names.contains(&"helper"));
        assert!(names.contains(&"Props"));
    }

    #[test]
    fn multi_line_reexport_line_number() {
        let src = "const x = 1;\nexport {\n  a,\n  b,\n} from './inner';\n";
        let facts = extract(src);
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].line, 2);
    }
}
