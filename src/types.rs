// src/types.rs
use std::collections::BTreeMap;

use serde::Serialize;

/// Violation severity. Warnings never affect the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Fixed violation taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Complexity,
    SubsystemStructure,
    ImportBoundary,
    ReexportBoundary,
    DependencyFormat,
    Redundancy,
    NonexistentDependency,
    FileConflict,
    DomainStructure,
    DomainImport,
    SubsystemCount,
    FileFunctions,
    FunctionLines,
    FunctionArgs,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Complexity => "complexity",
            Self::SubsystemStructure => "subsystem_structure",
            Self::ImportBoundary => "import_boundary",
            Self::ReexportBoundary => "reexport_boundary",
            Self::DependencyFormat => "dependency_format",
            Self::Redundancy => "redundancy",
            Self::NonexistentDependency => "nonexistent_dependency",
            Self::FileConflict => "file_conflict",
            Self::DomainStructure => "domain_structure",
            Self::DomainImport => "domain_import",
            Self::SubsystemCount => "subsystem_count",
            Self::FileFunctions => "file_functions",
            Self::FunctionLines => "function_lines",
            Self::FunctionArgs => "function_args",
        }
    }
}

/// Remediation buckets used for the by-remediation summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Remediation {
    #[serde(rename = "Create README documentation")]
    CreateReadme,
    #[serde(rename = "Create missing subsystem files")]
    CreateSubsystemFiles,
    #[serde(rename = "Add to allowed dependencies")]
    AddAllowedDependency,
    #[serde(rename = "Add to allowedChildren")]
    AddAllowedChildren,
    #[serde(rename = "Remove redundant dependency")]
    RemoveRedundantDependency,
    #[serde(rename = "Remove forbidden dependency")]
    RemoveForbiddenDependency,
    #[serde(rename = "Fix dependency path format")]
    FixDependencyPathFormat,
    #[serde(rename = "Create or remove subsystem declaration")]
    CreateOrRemoveSubsystem,
    #[serde(rename = "Remove invalid subsystem declaration")]
    RemoveInvalidSubsystem,
    #[serde(rename = "Create subsystem index")]
    CreateSubsystemIndex,
    #[serde(rename = "Create dependencies.json file")]
    CreateManifest,
    #[serde(rename = "Use subsystem interface")]
    UseSubsystemInterface,
    #[serde(rename = "Use utils interface")]
    UseUtilsInterface,
    #[serde(rename = "Use specific child subsystem (not router index)")]
    UseSpecificChild,
    #[serde(rename = "Remove cross-domain import")]
    RemoveCrossDomainImport,
    #[serde(rename = "Move service to API layer")]
    MoveServiceToApi,
    #[serde(rename = "Fix domain service import")]
    FixDomainServiceImport,
    #[serde(rename = "Resolve file/folder conflict")]
    ResolveFileFolderConflict,
    #[serde(rename = "Fix upward reexport")]
    FixUpwardReexport,
    #[serde(rename = "Fix reexport boundary")]
    FixReexportBoundary,
    #[serde(rename = "Reduce subsystem count")]
    ReduceSubsystems,
    #[serde(rename = "Reduce function count per file")]
    ReduceFunctions,
    #[serde(rename = "Reduce function line count")]
    ReduceFunctionLines,
    #[serde(rename = "Reduce function argument count")]
    ReduceFunctionArgs,
}

impl Remediation {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::CreateReadme => "Create README documentation",
            Self::CreateSubsystemFiles => "Create missing subsystem files",
            Self::AddAllowedDependency => "Add to allowed dependencies",
            Self::AddAllowedChildren => "Add to allowedChildren",
            Self::RemoveRedundantDependency => "Remove redundant dependency",
            Self::RemoveForbiddenDependency => "Remove forbidden dependency",
            Self::FixDependencyPathFormat => "Fix dependency path format",
            Self::CreateOrRemoveSubsystem => "Create or remove subsystem declaration",
            Self::RemoveInvalidSubsystem => "Remove invalid subsystem declaration",
            Self::CreateSubsystemIndex => "Create subsystem index",
            Self::CreateManifest => "Create dependencies.json file",
            Self::UseSubsystemInterface => "Use subsystem interface",
            Self::UseUtilsInterface => "Use utils interface",
            Self::UseSpecificChild => "Use specific child subsystem (not router index)",
            Self::RemoveCrossDomainImport => "Remove cross-domain import",
            Self::MoveServiceToApi => "Move service to API layer",
            Self::FixDomainServiceImport => "Fix domain service import",
            Self::ResolveFileFolderConflict => "Resolve file/folder conflict",
            Self::FixUpwardReexport => "Fix upward reexport",
            Self::FixReexportBoundary => "Fix reexport boundary",
            Self::ReduceSubsystems => "Reduce subsystem count",
            Self::ReduceFunctions => "Reduce function count per file",
            Self::ReduceFunctionLines => "Reduce function line count",
            Self::ReduceFunctionArgs => "Reduce function argument count",
        }
    }
}

/// A single architecture violation. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub subsystem: Option<String>,
    pub file: Option<String>,
    pub line: Option<usize>,
    pub recommendation: Option<String>,
    pub recommendation_type: Option<Remediation>,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Violation {
    #[must_use]
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Error, message)
    }

    #[must_use]
    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Warning, message)
    }

    fn new(category: Category, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            subsystem: None,
            file: None,
            line: None,
            recommendation: None,
            recommendation_type: None,
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = Some(subsystem.into());
        self
    }

    #[must_use]
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub fn line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn recommend(mut self, kind: Remediation, text: impl Into<String>) -> Self {
        self.recommendation = Some(text.into());
        self.recommendation_type = Some(kind);
        self
    }

    #[must_use]
    pub fn meta(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// Aggregated results of a full check run.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub errors: Vec<Violation>,
    pub warnings: Vec<Violation>,
    pub execution_time_ms: u128,
    pub target_path: String,
}

impl CheckResults {
    #[must_use]
    pub fn new(target_path: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            ..Self::default()
        }
    }

    /// Routes a violation to the error or warning list by severity.
    pub fn push(&mut self, violation: Violation) {
        match violation.severity {
            Severity::Error => self.errors.push(violation),
            Severity::Warning => self.warnings.push(violation),
        }
    }

    pub fn extend(&mut self, violations: Vec<Violation>) {
        for v in violations {
            self.push(v);
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn all_issues(&self) -> impl Iterator<Item = &Violation> {
        self.errors.iter().chain(self.warnings.iter())
    }

    #[must_use]
    pub fn summary_by_category(&self) -> BTreeMap<&'static str, usize> {
        let mut summary = BTreeMap::new();
        for issue in self.all_issues() {
            *summary.entry(issue.category.as_str()).or_insert(0) += 1;
        }
        summary
    }

    #[must_use]
    pub fn summary_by_subsystem(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for issue in self.all_issues() {
            if let Some(s) = &issue.subsystem {
                *summary.entry(s.clone()).or_insert(0) += 1;
            }
        }
        summary
    }

    #[must_use]
    pub fn summary_by_remediation(&self) -> BTreeMap<&'static str, usize> {
        let mut summary = BTreeMap::new();
        for issue in self.all_issues() {
            if let Some(kind) = issue.recommendation_type {
                *summary.entry(kind.label()).or_insert(0) += 1;
            }
        }
        summary
    }

    /// Most frequent exact remediation strings, descending by count.
    #[must_use]
    pub fn top_recommendations(&self, limit: usize) -> Vec<(String, usize)> {
        let mut exact: BTreeMap<&str, usize> = BTreeMap::new();
        for issue in self.all_issues() {
            if let Some(rec) = &issue.recommendation {
                *exact.entry(rec).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, usize)> =
            exact.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}
