//! Layered configuration
//!
//! Sources, lowest precedence first:
//!
//! 1. the embedded `default-config.toml`
//! 2. `~/.config/gh-environments/config.{toml,json,yaml,yml}`
//! 3. `gh-environments.{toml,json,yaml,yml}` in the working directory
//! 4. the file given with `--config`
//! 5. `GH_ENVIRONMENTS_*` environment variables, `__` separating levels
//! 6. command-line flags

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sync::MissingRepoPolicy;
use crate::{Error, Result};

const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

pub const ENV_PREFIX: &str = "GH_ENVIRONMENTS_";
const PROJECT_CONFIG_STEM: &str = "gh-environments";

/// Largest `first:` the GraphQL API accepts
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub github: GitHubConfig,
    #[serde(default)]
    pub repositories: RepositoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub page_size: u32,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            hostname: "github.com".to_string(),
            token: None,
            page_size: MAX_PAGE_SIZE,
            user_agent: concat!("gh-environments/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub on_missing: MissingRepoPolicy,
}

/// Values set on the command line; `None` leaves the lower layers alone
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hostname: Option<String>,
    pub on_missing: Option<MissingRepoPolicy>,
}

impl AppConfig {
    pub fn load(custom_config: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        if let Some(path) = custom_config {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
        }
        Self::from_figment(Self::figment(custom_config, overrides))
    }

    pub fn figment(custom_config: Option<&Path>, overrides: &Overrides) -> Figment {
        tracing::trace!("Loading configuration");

        let user = user_config_base_path();
        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::file(user.with_extension("toml")))
            .merge(Json::file(user.with_extension("json")))
            .merge(Yaml::file(user.with_extension("yaml")))
            .merge(Yaml::file(user.with_extension("yml")))
            .merge(Toml::file(format!("{PROJECT_CONFIG_STEM}.toml")))
            .merge(Json::file(format!("{PROJECT_CONFIG_STEM}.json")))
            .merge(Yaml::file(format!("{PROJECT_CONFIG_STEM}.yaml")))
            .merge(Yaml::file(format!("{PROJECT_CONFIG_STEM}.yml")));

        if let Some(path) = custom_config {
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(hostname) = &overrides.hostname {
            figment = figment.merge(Serialized::default("github.hostname", hostname));
        }
        if let Some(policy) = overrides.on_missing {
            figment = figment.merge(Serialized::default("repositories.on_missing", policy));
        }

        figment
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.github.hostname.trim().is_empty() {
            return Err(Error::Config("github.hostname cannot be empty".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.github.page_size) {
            return Err(Error::Config(format!(
                "github.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.github.page_size
            )));
        }
        if self.github.user_agent.trim().is_empty() {
            return Err(Error::Config("github.user_agent cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// `~/.config/gh-environments/config`, extension added per format
fn user_config_base_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".config/gh-environments/config"),
        None => PathBuf::from("~/.config/gh-environments/config"),
    }
}

#[cfg(test)]
mod tests;
