use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository as seen by the enumerator.
///
/// `id` is the stable numeric identifier used by the secrets and variables
/// endpoints; `name` is used by the environment and branch-policy endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub visibility: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Repository {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visibility: None,
            updated_at: None,
        }
    }
}

/// One page of an organization's repository listing
#[derive(Debug, Clone, Default)]
pub struct RepositoryPage {
    pub repositories: Vec<Repository>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}
