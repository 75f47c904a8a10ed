// src/reporting.rs
//! Result reporting: the JSON artifact, the console summary, and the
//! machine-readable output mode.
//!
//! Console output groups by category then subsystem and lists the most
//! frequent remediations; the JSON artifact always carries the full
//! detail regardless of display mode.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::types::{CheckResults, Violation};

#[derive(Serialize)]
struct ReportDocument<'a> {
    timestamp: u64,
    target_path: &'a str,
    execution_time_ms: u128,
    summary: ReportSummary<'a>,
    errors: Vec<&'a Violation>,
}

#[derive(Serialize)]
struct ReportSummary<'a> {
    total_errors: usize,
    total_warnings: usize,
    by_type: BTreeMap<&'static str, usize>,
    by_subsystem: BTreeMap<String, usize>,
    by_recommendation: BTreeMap<&'a str, usize>,
}

pub struct Reporter<'a> {
    output_file: &'a Path,
}

impl<'a> Reporter<'a> {
    #[must_use]
    pub fn new(output_file: &'a Path) -> Self {
        Self { output_file }
    }

    /// Writes the JSON artifact and displays results. Returns true when no
    /// error-severity violations exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be written.
    pub fn report(
        &self,
        results: &CheckResults,
        json_output: bool,
        suppressed_warnings: usize,
    ) -> Result<bool> {
        let document = build_document(results);

        if let Some(parent) = self.output_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(self.output_file, serde_json::to_string_pretty(&document)?)?;

        if json_output {
            println!("{}", serde_json::to_string_pretty(&document)?);
        } else {
            self.print_console_summary(results, suppressed_warnings);
        }

        Ok(!results.has_errors())
    }

    fn print_console_summary(&self, results: &CheckResults, suppressed_warnings: usize) {
        let total_errors = results.errors.len();
        let total_warnings = results.warnings.len();

        println!();

        let custom_count = results
            .all_issues()
            .filter(|v| v.metadata.contains_key("custom_threshold"))
            .count();
        if custom_count > 0 {
            println!(
                "Using custom thresholds from .architecture-exceptions for {custom_count} issue(s)"
            );
            println!();
        }

        if total_errors == 0 && total_warnings == 0 {
            println!("{}", "Architecture check passed!".green().bold());
            if suppressed_warnings > 0 {
                println!(
                    "{suppressed_warnings} warning(s) suppressed - run with --include-warnings to see them"
                );
            }
            println!("Detailed report: {}", self.output_file.display());
            return;
        }

        println!("{}", "Summary:".bold());
        println!("{}", "=".repeat(72));
        println!(
            "- Total errors: {}",
            total_errors.to_string().red().bold()
        );
        println!(
            "- Total warnings: {}",
            total_warnings.to_string().yellow()
        );
        println!();

        let by_type = results.summary_by_category();
        if !by_type.is_empty() {
            println!("{}", "By error type:".bold());
            for (category, count) in &by_type {
                println!("  - {category}: {count}");
            }
            println!();
        }

        let by_subsystem = results.summary_by_subsystem();
        if !by_subsystem.is_empty() {
            println!("{}", "By subsystem:".bold());
            let mut ranked: Vec<_> = by_subsystem.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (subsystem, count) in ranked.into_iter().take(10) {
                println!("  - {subsystem}: {count}");
            }
            println!();
        }

        let top = results.top_recommendations(10);
        if !top.is_empty() {
            println!("{}", "Top actionable recommendations:".bold());
            for (recommendation, count) in top {
                println!("  - ({count}x) {recommendation}");
            }
            println!();
        }

        let by_remediation = results.summary_by_remediation();
        if !by_remediation.is_empty() {
            println!("{}", "By recommendation type:".bold());
            let mut ranked: Vec<_> = by_remediation.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (label, count) in ranked.into_iter().take(8) {
                println!("  - {label}: {count}");
            }
            println!();
        }

        println!("{}", "Detailed results:".bold());
        println!("{}", "-".repeat(72));
        println!("Full report: {}", self.output_file.display());
    }
}

fn build_document(results: &CheckResults) -> ReportDocument<'_> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());

    let mut by_recommendation = BTreeMap::new();
    for issue in results.all_issues() {
        if let Some(kind) = issue.recommendation_type {
            *by_recommendation.entry(kind.label()).or_insert(0) += 1;
        }
    }

    ReportDocument {
        timestamp,
        target_path: &results.target_path,
        execution_time_ms: results.execution_time_ms,
        summary: ReportSummary {
            total_errors: results.errors.len(),
            total_warnings: results.warnings.len(),
            by_type: results.summary_by_category(),
            by_subsystem: results.summary_by_subsystem(),
            by_recommendation,
        },
        errors: results.all_issues().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Remediation};

    #[test]
    fn writes_artifact_and_returns_status() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results/check.json");

        let mut results = CheckResults::new("src");
        results.push(
            Violation::error(Category::ImportBoundary, "bypass")
                .subsystem("src/widgets")
                .recommend(Remediation::UseSubsystemInterface, "Use the index"),
        );

        let reporter = Reporter::new(&out);
        let passed = reporter.report(&results, false, 0).unwrap();
        assert!(!passed);

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["summary"]["total_errors"], 1);
        assert_eq!(written["errors"][0]["type"], "import_boundary");
        assert_eq!(written["errors"][0]["severity"], "error");
    }

    #[test]
    fn clean_results_pass() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("check.json");
        let results = CheckResults::new("src");
        let reporter = Reporter::new(&out);
        assert!(reporter.report(&results, false, 3).unwrap());
    }
}
