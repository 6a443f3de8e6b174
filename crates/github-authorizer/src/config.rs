use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PERMISSION_TOKEN_ENV: &str = "GITHUB_PERMISSION_TOKEN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("either GITHUB_ORG or GITHUB_REPOSITORY must be set")]
    MissingScope,
    #[error("GITHUB_REPOSITORY must look like owner/repo, got {0:?}")]
    InvalidRepository(String),
    #[error("GITHUB_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
}

/// What a validated GitHub user must belong to in order to be allowed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionScope {
    Organization(String),
    Repository { owner: String, repo: String },
}

impl std::fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionScope::Organization(org) => write!(f, "org {org}"),
            PermissionScope::Repository { owner, repo } => write!(f, "repo {owner}/{repo}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizerConfig {
    pub api_url: String,
    pub scope: PermissionScope,
    /// Credential for the permission lookup. `None` means the caller's own
    /// token is reused.
    pub permission_token: Option<String>,
    pub request_timeout: Duration,
}

impl AuthorizerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let scope = match (non_empty("GITHUB_REPOSITORY"), non_empty("GITHUB_ORG")) {
            (Some(full_name), _) => parse_repository(&full_name)?,
            (None, Some(org)) => PermissionScope::Organization(org.trim().to_string()),
            (None, None) => return Err(ConfigError::MissingScope),
        };

        let token_env = non_empty("GITHUB_PERMISSION_TOKEN_ENV")
            .unwrap_or_else(|| DEFAULT_PERMISSION_TOKEN_ENV.to_string());
        let permission_token = non_empty(token_env.as_str());

        let request_timeout = match non_empty("GITHUB_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidTimeout(raw))?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url,
            scope,
            permission_token,
            request_timeout,
        })
    }
}

fn parse_repository(full_name: &str) -> Result<PermissionScope, ConfigError> {
    let trimmed = full_name.trim();
    match trimmed.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok(PermissionScope::Repository {
                owner: owner.to_string(),
                repo: repo.trim_end_matches(".git").to_string(),
            })
        }
        _ => Err(ConfigError::InvalidRepository(full_name.to_string())),
    }
}
