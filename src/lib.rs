pub mod cache;
pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod legality;
pub mod overrides;
pub mod parse;
pub mod paths;
pub mod permissions;
pub mod reporting;
pub mod rules;
pub mod subsystem;
pub mod types;

pub use checker::ArchitectureChecker;
pub use config::Config;
pub use types::{CheckResults, Violation};
