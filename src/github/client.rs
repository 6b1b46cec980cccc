//! HTTP implementation of the capability traits
//!
//! Environments and branch policies are addressed by repository name; secrets
//! and variables by the repository's numeric ID. Repository lookup and
//! listing go through GraphQL.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use super::types::{
    BranchPoliciesResponse, CountedPage, CreateProtectionRule, EnvironmentsResponse,
    GraphQlResponse, OrganizationData, ProtectionRulesResponse, RepositoryData, SecretsResponse,
    VariableBody, VariablesResponse,
};
use super::{
    ApiEnvironment, EnvironmentAccess, EnvironmentSettings, Listing, RepositoryAccess,
    SecretAccess, VariableAccess,
};
use crate::config::GitHubConfig;
use crate::models::{
    BranchPattern, CustomDeploymentRule, EncryptedSecret, EnvironmentPublicKey, Repository,
    RepositoryPage, SecretMetadata, Variable,
};
use crate::{Error, Result};

const API_VERSION: &str = "2022-11-28";
/// Largest page the REST list endpoints accept
const REST_PAGE_SIZE: u32 = 100;

const REPOSITORY_QUERY: &str = "query getRepo($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) { databaseId name visibility updatedAt }
}";

const REPOSITORIES_QUERY: &str = "query getRepos($owner: String!, $first: Int!, $endCursor: String) {
  organization(login: $owner) {
    repositories(first: $first, after: $endCursor) {
      nodes { databaseId name visibility updatedAt }
      pageInfo { endCursor hasNextPage }
    }
  }
}";

/// REST and GraphQL roots for a GitHub host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub rest: Url,
    pub graphql: Url,
}

impl Endpoints {
    /// `github.com` maps to the public API, any other host to a GitHub
    /// Enterprise Server. A value with an explicit scheme is used as the API
    /// root as-is.
    pub fn for_host(hostname: &str) -> Result<Self> {
        let host = hostname.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(Error::Config("hostname is empty".to_string()));
        }

        let (rest, graphql) = if host.starts_with("http://") || host.starts_with("https://") {
            (format!("{host}/"), format!("{host}/graphql"))
        } else if host == "github.com" || host == "api.github.com" {
            (
                "https://api.github.com/".to_string(),
                "https://api.github.com/graphql".to_string(),
            )
        } else {
            (
                format!("https://{host}/api/v3/"),
                format!("https://{host}/api/graphql"),
            )
        };

        let parse = |raw: &str| {
            Url::parse(raw).map_err(|e| Error::Config(format!("invalid API URL {raw}: {e}")))
        };

        Ok(Self {
            rest: parse(&rest)?,
            graphql: parse(&graphql)?,
        })
    }
}

pub struct GitHubClient {
    http: Client,
    endpoints: Endpoints,
    page_size: u32,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, token: &str) -> Result<Self> {
        let endpoints = Endpoints::for_host(&config.hostname)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::Config("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints,
            page_size: config.page_size,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Join percent-encoded path segments onto the REST root
    fn rest_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoints.rest.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be a base URL", self.endpoints.rest)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| transport(&url, source))?;
        let response = check_status(response, &url).await?;
        decode(response, &url).await
    }

    async fn send<B: Serialize + ?Sized>(&self, method: Method, url: Url, body: &B) -> Result<()> {
        tracing::debug!("{} {}", method, url);
        let response = self
            .http
            .request(method, url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| transport(&url, source))?;
        check_status(response, &url).await?;
        Ok(())
    }

    /// Read a count without transferring the whole collection
    async fn count<P: CountedPage>(&self, mut url: Url) -> Result<u64> {
        url.query_pairs_mut().append_pair("per_page", "1");
        let page: P = self.get(url).await?;
        Ok(page.total_count())
    }

    /// Follow `page` numbers until `total_count` items have been collected or
    /// a page comes back short
    async fn list_all<P: CountedPage>(&self, url: Url) -> Result<Listing<P::Item>> {
        let mut items = Vec::new();
        let mut page_number = 1u32;

        let total_count = loop {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .append_pair("per_page", &REST_PAGE_SIZE.to_string())
                .append_pair("page", &page_number.to_string());

            let page: P = self.get(page_url).await?;
            let total = page.total_count();
            let batch = page.into_items();
            let received = batch.len();
            items.extend(batch);

            if received < REST_PAGE_SIZE as usize || items.len() as u64 >= total {
                break total;
            }
            page_number += 1;
        };

        Ok(Listing { total_count, items })
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        name: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let url = self.endpoints.graphql.clone();
        tracing::debug!("POST {} ({})", url, name);

        let response = self
            .http
            .post(url.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|source| transport(&url, source))?;
        let response = check_status(response, &url).await?;
        let envelope: GraphQlResponse<T> = decode(response, &url).await?;

        if let Some(error) = envelope.errors.first() {
            if error.kind.as_deref() == Some("NOT_FOUND") {
                return Err(Error::NotFound {
                    url: format!("{url} ({name})"),
                });
            }
            return Err(Error::GraphQl {
                query: name.to_string(),
                message: error.message.clone(),
            });
        }

        envelope.data.ok_or_else(|| Error::GraphQl {
            query: name.to_string(),
            message: "response contained no data".to_string(),
        })
    }
}

fn transport(url: &Url, source: reqwest::Error) -> Error {
    Error::Transport {
        url: url.to_string(),
        source,
    }
}

async fn check_status(response: Response, url: &Url) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound {
            url: url.to_string(),
        });
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|source| transport(url, source))?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
        context: url.to_string(),
        source,
    })
}

#[async_trait]
impl RepositoryAccess for GitHubClient {
    async fn repository(&self, owner: &str, name: &str) -> Result<Repository> {
        let not_found = || Error::RepoNotFound {
            owner: owner.to_string(),
            name: name.to_string(),
        };

        let data: RepositoryData = self
            .graphql(
                "getRepo",
                REPOSITORY_QUERY,
                json!({ "owner": owner, "name": name }),
            )
            .await
            .map_err(|e| if e.is_not_found() { not_found() } else { e })?;

        data.repository.map(Repository::from).ok_or_else(not_found)
    }

    async fn repository_page(&self, owner: &str, after: Option<&str>) -> Result<RepositoryPage> {
        let data: OrganizationData = self
            .graphql(
                "getRepos",
                REPOSITORIES_QUERY,
                json!({ "owner": owner, "first": self.page_size, "endCursor": after }),
            )
            .await?;

        let connection = data
            .organization
            .ok_or_else(|| Error::GraphQl {
                query: "getRepos".to_string(),
                message: format!("organization {owner} not found"),
            })?
            .repositories;

        Ok(RepositoryPage {
            repositories: connection.nodes.into_iter().map(Repository::from).collect(),
            end_cursor: connection.page_info.end_cursor,
            has_next_page: connection.page_info.has_next_page,
        })
    }
}

#[async_trait]
impl EnvironmentAccess for GitHubClient {
    async fn environments(&self, owner: &str, repo: &str) -> Result<Vec<ApiEnvironment>> {
        // Single page only; repositories with more than 100 environments are truncated.
        let mut url = self.rest_url(&["repos", owner, repo, "environments"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &REST_PAGE_SIZE.to_string());

        let response: EnvironmentsResponse = self.get(url).await?;
        if response.total_count as usize > response.environments.len() {
            tracing::warn!(
                "{}/{} reports {} environments, only {} were returned",
                owner,
                repo,
                response.total_count,
                response.environments.len()
            );
        }
        Ok(response.environments)
    }

    async fn branch_policies(
        &self,
        owner: &str,
        repo: &str,
        env: &str,
    ) -> Result<Vec<BranchPattern>> {
        let mut url = self.rest_url(&[
            "repos",
            owner,
            repo,
            "environments",
            env,
            "deployment-branch-policies",
        ])?;
        url.query_pairs_mut()
            .append_pair("per_page", &REST_PAGE_SIZE.to_string());

        let response: BranchPoliciesResponse = self.get(url).await?;
        Ok(response.branch_policies)
    }

    async fn custom_protection_rules(
        &self,
        owner: &str,
        repo: &str,
        env: &str,
    ) -> Result<Vec<CustomDeploymentRule>> {
        let url = self.rest_url(&[
            "repos",
            owner,
            repo,
            "environments",
            env,
            "deployment_protection_rules",
        ])?;

        let response: ProtectionRulesResponse = self.get(url).await?;
        Ok(response
            .custom_deployment_protection_rules
            .into_iter()
            .map(CustomDeploymentRule::from)
            .collect())
    }

    async fn upsert_environment(
        &self,
        owner: &str,
        repo: &str,
        env: &str,
        settings: &EnvironmentSettings,
    ) -> Result<()> {
        let url = self.rest_url(&["repos", owner, repo, "environments", env])?;
        self.send(Method::PUT, url, settings).await
    }

    async fn create_branch_policy(
        &self,
        owner: &str,
        repo: &str,
        env: &str,
        pattern: &BranchPattern,
    ) -> Result<()> {
        let url = self.rest_url(&[
            "repos",
            owner,
            repo,
            "environments",
            env,
            "deployment-branch-policies",
        ])?;
        self.send(Method::POST, url, pattern).await
    }

    async fn create_protection_rule(
        &self,
        owner: &str,
        repo: &str,
        env: &str,
        integration_id: u64,
    ) -> Result<()> {
        let url = self.rest_url(&[
            "repos",
            owner,
            repo,
            "environments",
            env,
            "deployment_protection_rules",
        ])?;
        self.send(Method::POST, url, &CreateProtectionRule { integration_id })
            .await
    }
}

#[async_trait]
impl SecretAccess for GitHubClient {
    async fn secret_count(&self, repo_id: u64, env: &str) -> Result<u64> {
        let id = repo_id.to_string();
        let url = self.rest_url(&["repositories", &id, "environments", env, "secrets"])?;
        self.count::<SecretsResponse>(url).await
    }

    async fn secrets(&self, repo_id: u64, env: &str) -> Result<Listing<SecretMetadata>> {
        let id = repo_id.to_string();
        let url = self.rest_url(&["repositories", &id, "environments", env, "secrets"])?;
        self.list_all::<SecretsResponse>(url).await
    }

    async fn public_key(&self, repo_id: u64, env: &str) -> Result<EnvironmentPublicKey> {
        let id = repo_id.to_string();
        let url = self.rest_url(&[
            "repositories",
            &id,
            "environments",
            env,
            "secrets",
            "public-key",
        ])?;
        self.get(url).await
    }

    async fn put_secret(
        &self,
        repo_id: u64,
        env: &str,
        name: &str,
        secret: &EncryptedSecret,
    ) -> Result<()> {
        let id = repo_id.to_string();
        let url = self.rest_url(&["repositories", &id, "environments", env, "secrets", name])?;
        self.send(Method::PUT, url, secret).await
    }
}

#[async_trait]
impl VariableAccess for GitHubClient {
    async fn variable_count(&self, repo_id: u64, env: &str) -> Result<u64> {
        let id = repo_id.to_string();
        let url = self.rest_url(&["repositories", &id, "environments", env, "variables"])?;
        self.count::<VariablesResponse>(url).await
    }

    async fn variables(&self, repo_id: u64, env: &str) -> Result<Listing<Variable>> {
        let id = repo_id.to_string();
        let url = self.rest_url(&["repositories", &id, "environments", env, "variables"])?;
        self.list_all::<VariablesResponse>(url).await
    }

    async fn create_variable(
        &self,
        repo_id: u64,
        env: &str,
        name: &str,
        value: &str,
    ) -> Result<()> {
        let id = repo_id.to_string();
        let url = self.rest_url(&["repositories", &id, "environments", env, "variables"])?;
        self.send(Method::POST, url, &VariableBody { name, value })
            .await
    }

    async fn update_variable(
        &self,
        repo_id: u64,
        env: &str,
        name: &str,
        value: &str,
    ) -> Result<()> {
        let id = repo_id.to_string();
        let url = self.rest_url(&[
            "repositories",
            &id,
            "environments",
            env,
            "variables",
            name,
        ])?;
        self.send(Method::PATCH, url, &VariableBody { name, value })
            .await
    }
}
