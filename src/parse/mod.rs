// src/parse/mod.rs
//! The source fact extractor: best-effort lexical parsing of TypeScript
//! sources into import/export/function facts. Never errors — unreadable or
//! malformed input degrades to an empty fact set.

pub mod exports;
pub mod functions;
pub mod imports;
pub mod scanner;

use std::path::{Path, PathBuf};

pub use self::exports::{ExportFact, ExportKind};
pub use self::functions::{FunctionFact, ObjectParamFact};
pub use self::imports::{ImportFact, ImportKind};

/// Parsed facts for one source file. Immutable after creation.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    /// Comment-stripped text, kept for rules that re-scan (object params,
    /// boundary searches).
    pub stripped: String,
    pub lines: usize,
    pub imports: Vec<ImportFact>,
    pub exports: Vec<ExportFact>,
    pub functions: Vec<FunctionFact>,
}

impl SourceFile {
    /// Parses file text into facts. `text` being empty (e.g. an unreadable
    /// file) yields an empty fact set.
    #[must_use]
    pub fn parse(path: &Path, text: String) -> Self {
        let stripped = scanner::strip_comments(&text);
        let lines = if text.is_empty() {
            0
        } else {
            text.split('\n').count()
        };
        let imports = imports::extract(&stripped);
        let exports = exports::extract(&stripped);
        let functions = functions::extract(&stripped);
        Self {
            path: path.to_path_buf(),
            text,
            stripped,
            lines,
            imports,
            exports,
            functions,
        }
    }

    /// All outbound specifiers: imports plus re-export sources. Mirrors the
    /// dependency scan, which treats `export ... from 'x'` as an import
    /// edge of the declaring file.
    pub fn outbound_specifiers(&self) -> impl Iterator<Item = (&str, usize)> {
        let imports = self.imports.iter().map(|i| (i.specifier.as_str(), i.line));
        let reexports = self
            .exports
            .iter()
            .filter_map(|e| e.from_path.as_deref().map(|p| (p, e.line)));
        imports.chain(reexports)
    }

    /// Re-export facts only (the barrel surface of an index file).
    pub fn reexports(&self) -> impl Iterator<Item = &ExportFact> {
        self.exports.iter().filter(|e| e.is_reexport())
    }

    #[must_use]
    pub fn is_index(&self) -> bool {
        matches!(
            self.path.file_name().and_then(|n| n.to_str()),
            Some("index.ts" | "index.tsx")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_empty_facts() {
        let sf = SourceFile::parse(Path::new("x.ts"), String::new());
        assert_eq!(sf.lines, 0);
        assert!(sf.imports.is_empty());
        assert!(sf.exports.is_empty());
        assert!(sf.functions.is_empty());
    }

    #[test]
    fn outbound_includes_reexport_sources() {
        let src = "import { a } from '~/lib/auth';\nexport * from './child';\n";
        let sf = SourceFile::parse(Path::new("index.ts"), src.to_string());
        let specs: Vec<_> = sf.outbound_specifiers().map(|(s, _)| s).collect();
        assert_eq!(specs, vec!["~/lib/auth", "./child"]);
        assert!(sf.is_index());
    }

    #[test]
    fn comments_do_not_produce_facts() {
        let src = "// import { ghost } from '~/nowhere';\n/* export * from './phantom'; */\n";
        let sf = SourceFile::parse(Path::new("a.ts"), src.to_string());
        assert!(sf.imports.is_empty());
        assert!(sf.exports.is_empty());
    }
}
