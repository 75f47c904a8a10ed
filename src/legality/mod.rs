// src/legality/mod.rs
//! The legality engine: decides ALLOW/DENY for import edges and re-export
//! statements. Carve-outs that the permission resolver leaves implicit
//! (domain utils, self-imports) are explicit, named rules here so the
//! precedence order itself is the documentation.

pub mod imports;
pub mod reexports;

pub use self::imports::{decide, Decision, ImportCheck};
pub use self::reexports::{check_reexport, is_upward_reexport, ReexportViolation};
