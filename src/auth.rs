//! Token resolution
//!
//! Sources are tried in order: `--token`, the `github.token` config key, the
//! environment, and finally the GitHub CLI's stored credential.

use std::fmt;
use std::process::Command;

use crate::{Error, Result};

const PUBLIC_HOSTS: [&str; 2] = ["github.com", "api.github.com"];

/// Where a resolved token came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOrigin {
    Flag,
    Config,
    Env(&'static str),
    GhCli,
}

impl fmt::Display for TokenOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenOrigin::Flag => f.write_str("--token"),
            TokenOrigin::Config => f.write_str("config github.token"),
            TokenOrigin::Env(name) => write!(f, "${name}"),
            TokenOrigin::GhCli => f.write_str("gh auth token"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: String,
    pub origin: TokenOrigin,
}

// Keep the token out of debug logs
impl fmt::Debug for ResolvedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedToken")
            .field("token", &"<redacted>")
            .field("origin", &self.origin)
            .finish()
    }
}

/// Strip any scheme and path, leaving the bare host name
fn bare_host(hostname: &str) -> &str {
    let host = hostname
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    host.split('/').next().unwrap_or(host)
}

fn env_candidates(hostname: &str) -> &'static [&'static str] {
    if PUBLIC_HOSTS.contains(&bare_host(hostname)) {
        &["GH_TOKEN", "GITHUB_TOKEN"]
    } else {
        &["GH_ENTERPRISE_TOKEN", "GH_TOKEN", "GITHUB_TOKEN"]
    }
}

pub fn resolve_token(
    hostname: &str,
    flag: Option<&str>,
    configured: Option<&str>,
) -> Result<ResolvedToken> {
    resolve_with(
        hostname,
        flag,
        configured,
        |name| std::env::var(name).ok(),
        gh_auth_token,
    )
}

fn resolve_with<E, G>(
    hostname: &str,
    flag: Option<&str>,
    configured: Option<&str>,
    env: E,
    gh: G,
) -> Result<ResolvedToken>
where
    E: Fn(&str) -> Option<String>,
    G: Fn(&str) -> Option<String>,
{
    let usable = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(token) = usable(flag.map(str::to_string)) {
        return Ok(ResolvedToken {
            token,
            origin: TokenOrigin::Flag,
        });
    }

    if let Some(token) = usable(configured.map(str::to_string)) {
        return Ok(ResolvedToken {
            token,
            origin: TokenOrigin::Config,
        });
    }

    for &name in env_candidates(hostname) {
        if let Some(token) = usable(env(name)) {
            return Ok(ResolvedToken {
                token,
                origin: TokenOrigin::Env(name),
            });
        }
    }

    if let Some(token) = usable(gh(bare_host(hostname))) {
        return Ok(ResolvedToken {
            token,
            origin: TokenOrigin::GhCli,
        });
    }

    Err(Error::AuthResolution {
        host: hostname.to_string(),
        reason: format!(
            "pass --token, set {} or log in with `gh auth login`",
            env_candidates(hostname).join("/")
        ),
    })
}

/// Ask an installed `gh` for its stored token
fn gh_auth_token(host: &str) -> Option<String> {
    let gh = which::which("gh").ok()?;
    tracing::debug!("Asking {} for a token for {}", gh.display(), host);

    let output = Command::new(gh)
        .args(["auth", "token", "--hostname", host])
        .output()
        .ok()?;

    if !output.status.success() {
        tracing::debug!(
            "gh auth token failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    String::from_utf8(output.stdout).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn no_gh(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_flag_wins_over_everything() {
        let resolved = resolve_with(
            "github.com",
            Some("flag-token"),
            Some("config-token"),
            env_of(&[("GH_TOKEN", "env-token")]),
            |_| Some("gh-token".to_string()),
        )
        .unwrap();

        assert_eq!(resolved.token, "flag-token");
        assert_eq!(resolved.origin, TokenOrigin::Flag);
    }

    #[test]
    fn test_config_before_environment() {
        let resolved = resolve_with(
            "github.com",
            None,
            Some("config-token"),
            env_of(&[("GH_TOKEN", "env-token")]),
            no_gh,
        )
        .unwrap();

        assert_eq!(resolved.origin, TokenOrigin::Config);
    }

    #[test]
    fn test_gh_token_before_github_token() {
        let resolved = resolve_with(
            "github.com",
            None,
            None,
            env_of(&[("GITHUB_TOKEN", "second"), ("GH_TOKEN", "first")]),
            no_gh,
        )
        .unwrap();

        assert_eq!(resolved.token, "first");
        assert_eq!(resolved.origin, TokenOrigin::Env("GH_TOKEN"));
    }

    #[test]
    fn test_enterprise_token_only_for_enterprise_hosts() {
        let env = env_of(&[("GH_ENTERPRISE_TOKEN", "ghe"), ("GITHUB_TOKEN", "dotcom")]);

        let public = resolve_with("github.com", None, None, &env, no_gh).unwrap();
        assert_eq!(public.token, "dotcom");

        let enterprise = resolve_with("ghe.example.com", None, None, &env, no_gh).unwrap();
        assert_eq!(enterprise.token, "ghe");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let resolved = resolve_with(
            "github.com",
            Some("  "),
            Some(""),
            env_of(&[("GH_TOKEN", "\n"), ("GITHUB_TOKEN", "real")]),
            no_gh,
        )
        .unwrap();

        assert_eq!(resolved.token, "real");
    }

    #[test]
    fn test_gh_cli_is_last_resort_and_gets_bare_host() {
        let resolved = resolve_with(
            "https://ghe.example.com/api/v3",
            None,
            None,
            env_of(&[]),
            |host| (host == "ghe.example.com").then(|| "from-gh\n".to_string()),
        )
        .unwrap();

        assert_eq!(resolved.token, "from-gh");
        assert_eq!(resolved.origin, TokenOrigin::GhCli);
    }

    #[test]
    fn test_no_source_is_an_auth_error() {
        let err = resolve_with("github.com", None, None, env_of(&[]), no_gh).unwrap_err();

        match err {
            Error::AuthResolution { host, reason } => {
                assert_eq!(host, "github.com");
                assert!(reason.contains("GH_TOKEN/GITHUB_TOKEN"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let resolved = ResolvedToken {
            token: "ghp_secret".to_string(),
            origin: TokenOrigin::Flag,
        };
        assert!(!format!("{resolved:?}").contains("ghp_secret"));
    }
}
