// src/config.rs
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Directories never traversed, regardless of ignore-file contents.
pub const PRUNE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "build",
    "target",
    ".next",
    ".turbo",
    ".cache",
    "coverage",
    "vendor",
    "third_party",
];

/// Source extensions the checker scans.
pub const SOURCE_EXTS: &[&str] = &["ts", "tsx"];

/// File name of a subsystem manifest.
pub const MANIFEST_FILE: &str = "dependencies.json";

/// File name of the threshold-override file.
pub const EXCEPTIONS_FILE: &str = ".architecture-exceptions";

/// File name of the rule/traversal exemption file.
pub const IGNORE_FILE: &str = ".architecture-ignore";

/// Root-relative import alias prefix (`~/lib/...`).
pub const ROOT_ALIAS: &str = "~";

/// Rule thresholds, overridable via `archwarden.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Line count above which a directory needs full subsystem structure.
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: usize,
    /// Line count above which a directory needs a README.
    #[serde(default = "default_doc_threshold")]
    pub doc_threshold: usize,
    #[serde(default = "default_six")]
    pub max_subsystems: usize,
    #[serde(default = "default_six")]
    pub max_functions_per_file: usize,
    #[serde(default = "default_fn_lines_warning")]
    pub max_function_lines_warning: usize,
    #[serde(default = "default_fn_lines_error")]
    pub max_function_lines_error: usize,
    #[serde(default = "default_six")]
    pub max_function_args: usize,
    #[serde(default = "default_six")]
    pub max_object_keys: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: default_complexity_threshold(),
            doc_threshold: default_doc_threshold(),
            max_subsystems: default_six(),
            max_functions_per_file: default_six(),
            max_function_lines_warning: default_fn_lines_warning(),
            max_function_lines_error: default_fn_lines_error(),
            max_function_args: default_six(),
            max_object_keys: default_six(),
        }
    }
}

const fn default_complexity_threshold() -> usize {
    1000
}
const fn default_doc_threshold() -> usize {
    500
}
const fn default_six() -> usize {
    6
}
const fn default_fn_lines_warning() -> usize {
    50
}
const fn default_fn_lines_error() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rules: RuleConfig,
    /// Fixed worker-pool width for per-file and per-subsystem checks.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Path of the JSON report artifact.
    #[serde(default = "default_report_path")]
    pub report_path: String,
    #[serde(default)]
    pub verbose: bool,
}

const fn default_workers() -> usize {
    4
}

fn default_report_path() -> String {
    "test-results/architecture-check.json".to_string()
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config and applies local settings from `archwarden.toml`.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::new();
        config.load_local_config(Path::new("."));
        config
    }

    /// Reads `archwarden.toml` from `dir` if present. Malformed files are
    /// ignored: the checker must never fail because of its own config.
    pub fn load_local_config(&mut self, dir: &Path) {
        let path = dir.join("archwarden.toml");
        let Ok(content) = fs::read_to_string(path) else {
            return;
        };
        self.parse_toml(&content);
    }

    pub fn parse_toml(&mut self, content: &str) {
        if let Ok(parsed) = toml::from_str::<Config>(content) {
            *self = parsed;
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if threshold ordering is inconsistent.
    pub fn validate(&self) -> Result<()> {
        if self.rules.max_function_lines_error < self.rules.max_function_lines_warning {
            return Err(crate::error::WardenError::Other(
                "max_function_lines_error must be >= max_function_lines_warning".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: RuleConfig::default(),
            workers: default_workers(),
            report_path: default_report_path(),
            verbose: false,
        }
    }
}

/// Returns true for directory names that must never be traversed.
#[must_use]
pub fn should_prune(name: &str) -> bool {
    PRUNE_DIRS.contains(&name)
}

/// Returns true if the path has a scanned source extension.
#[must_use]
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTS.contains(&e))
}

/// Test sources are exempt from every rule.
#[must_use]
pub fn is_test_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.contains(".test.")
        || name.contains(".spec.")
        || path.components().any(|c| c.as_os_str() == "__tests__")
}
