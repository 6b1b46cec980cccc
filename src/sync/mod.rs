//! Export and import orchestration
//!
//! Everything here runs strictly sequentially against the capability traits in
//! [`crate::github`]. Per-record problems never abort a pass; they are
//! collected in a [`RunSummary`] that the caller turns into an exit status.

pub mod aggregate;
pub mod enumerate;
pub mod export;
pub mod import;
mod report;

pub use aggregate::environment_from_api;
pub use enumerate::{MissingRepoPolicy, repositories};
pub use export::{export_environments, export_secrets, export_variables};
pub use import::{import_environments, import_secrets, import_variables};
pub use report::{RecordFailure, RunSummary, Stage};
