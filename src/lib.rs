//! # gh-environments
//!
//! Export and import GitHub deployment environments, environment secrets and
//! environment variables as flat CSV files.
//!
//! ## Commands
//!
//! ```bash
//! # Every environment in the organization, one row each
//! gh-environments list my-org
//!
//! # Only some repositories, to a chosen file
//! gh-environments list my-org api web -o environments.csv
//!
//! # Recreate environments from an edited report
//! gh-environments create my-org -f environments.csv
//!
//! # Secrets and variables
//! gh-environments secrets create my-org -f secrets.csv
//! gh-environments variables list my-org
//! ```
//!
//! ## Layout
//!
//! - [`github`]: the REST/GraphQL client behind four capability traits
//! - [`codec`]: the flat CSV row format
//! - [`crypto`]: sealed-box encryption for secret values
//! - [`sync`]: export and import passes and their [`sync::RunSummary`]

pub mod auth;
pub mod cli;
pub mod codec;
pub mod config;
pub mod crypto;
mod error;
pub mod github;
pub mod models;
pub mod sync;

pub use cli::{Cli, Output};
pub use config::AppConfig;
pub use error::{Error, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
