//! Bearer token validation against the GitHub user API.
//!
//! The handler only depends on the [`IdentityProvider`] trait, so tests can
//! swap in a stub instead of talking to GitHub.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider rejected the token with status {status}")]
    Rejected { status: u16, login: Option<String> },
    #[error("identity provider response could not be decoded: {0}")]
    Decode(String),
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl IdentityError {
    /// Login the provider reported alongside a failure, if any.
    pub fn reported_login(&self) -> Option<&str> {
        match self {
            IdentityError::Rejected { login, .. } => login.as_deref(),
            _ => None,
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn validate(&self, token: &str) -> Result<Identity, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct UserBody {
    login: Option<String>,
}

fn login_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<UserBody>(body)
        .ok()
        .and_then(|user| user.login)
        .filter(|login| !login.is_empty())
}

pub struct GitHubIdentityProvider {
    http_client: reqwest::Client,
    api_url: String,
}

impl GitHubIdentityProvider {
    pub fn new(http_client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for GitHubIdentityProvider {
    async fn validate(&self, token: &str) -> Result<Identity, IdentityError> {
        let url = format!("{}/user", self.api_url);

        let resp = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status != StatusCode::OK {
            log::warn!("GitHub user lookup returned {status}");
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                login: login_from_body(&body),
            });
        }

        match login_from_body(&body) {
            Some(login) => Ok(Identity { login }),
            None => Err(IdentityError::Decode(
                "user response has no login field".to_string(),
            )),
        }
    }
}
