//! Permission lookup for a validated GitHub login.
//!
//! Every lookup resolves to a [`PermissionOutcome`]. Faults are carried as
//! [`PermissionOutcome::Error`] and count as "not permitted", so nothing here
//! can abort the policy decision.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::PermissionScope;
use crate::identity::GITHUB_ACCEPT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionOutcome {
    Allowed,
    Denied,
    Error(String),
}

impl PermissionOutcome {
    pub fn is_permitted(&self) -> bool {
        matches!(self, PermissionOutcome::Allowed)
    }
}

/// Everything the permission source may need about the request being decided.
#[derive(Debug, Clone, Copy)]
pub struct PermissionRequest<'a> {
    pub login: &'a str,
    pub method_arn: &'a str,
    /// The caller's bearer token, used when no dedicated credential is configured.
    pub caller_token: &'a str,
}

#[async_trait]
pub trait PermissionSource: Send + Sync {
    async fn check(&self, request: PermissionRequest<'_>) -> PermissionOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RepoPermission {
    None,
    Read,
    Triage,
    Write,
    Maintain,
    Admin,
}

impl RepoPermission {
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => RepoPermission::Admin,
            "maintain" => RepoPermission::Maintain,
            "write" | "push" => RepoPermission::Write,
            "triage" => RepoPermission::Triage,
            "read" | "pull" => RepoPermission::Read,
            _ => RepoPermission::None,
        }
    }

    pub fn has_read(&self) -> bool {
        *self >= RepoPermission::Read
    }
}

#[derive(Debug, Deserialize)]
struct CollaboratorPermissionBody {
    permission: Option<String>,
    role_name: Option<String>,
}

impl CollaboratorPermissionBody {
    fn level(&self) -> RepoPermission {
        let from_permission = self.permission.as_deref().map(RepoPermission::parse);
        let from_role = self.role_name.as_deref().map(RepoPermission::parse);
        from_permission
            .into_iter()
            .chain(from_role)
            .max()
            .unwrap_or(RepoPermission::None)
    }
}

pub struct GitHubPermissionSource {
    http_client: reqwest::Client,
    api_url: String,
    scope: PermissionScope,
    token: Option<String>,
}

impl GitHubPermissionSource {
    pub fn new(
        http_client: reqwest::Client,
        api_url: impl Into<String>,
        scope: PermissionScope,
        token: Option<String>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
            scope,
            token,
        }
    }

    async fn org_membership(
        &self,
        org: &str,
        login: &str,
        token: &str,
    ) -> Result<PermissionOutcome, reqwest::Error> {
        let url = format!("{}/orgs/{org}/members/{login}", self.api_url);

        let resp = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        // 302: the requester is not an org member and only public members are visible.
        Ok(match resp.status() {
            StatusCode::NO_CONTENT => PermissionOutcome::Allowed,
            StatusCode::NOT_FOUND | StatusCode::FOUND => PermissionOutcome::Denied,
            status => PermissionOutcome::Error(format!("org membership check returned {status}")),
        })
    }

    async fn repo_collaborator(
        &self,
        owner: &str,
        repo: &str,
        login: &str,
        token: &str,
    ) -> Result<PermissionOutcome, reqwest::Error> {
        let url = format!(
            "{}/repos/{owner}/{repo}/collaborators/{login}/permission",
            self.api_url
        );

        let resp = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(PermissionOutcome::Denied);
        }
        if !status.is_success() {
            return Ok(PermissionOutcome::Error(format!(
                "collaborator permission check returned {status}"
            )));
        }

        let body = resp.text().await?;
        Ok(match serde_json::from_str::<CollaboratorPermissionBody>(&body) {
            Ok(parsed) if parsed.level().has_read() => PermissionOutcome::Allowed,
            Ok(_) => PermissionOutcome::Denied,
            Err(e) => PermissionOutcome::Error(format!("invalid permission response: {e}")),
        })
    }
}

#[async_trait]
impl PermissionSource for GitHubPermissionSource {
    async fn check(&self, request: PermissionRequest<'_>) -> PermissionOutcome {
        let token = self.token.as_deref().unwrap_or(request.caller_token);

        let result = match &self.scope {
            PermissionScope::Organization(org) => {
                self.org_membership(org, request.login, token).await
            }
            PermissionScope::Repository { owner, repo } => {
                self.repo_collaborator(owner, repo, request.login, token)
                    .await
            }
        };

        let outcome = result.unwrap_or_else(|e| PermissionOutcome::Error(e.to_string()));
        if let PermissionOutcome::Error(reason) = &outcome {
            log::warn!(
                "permission check for {} on {} failed: {reason}",
                request.login,
                self.scope
            );
        } else {
            log::debug!(
                "permission check for {} on {} ({}): {:?}",
                request.login,
                self.scope,
                request.method_arn,
                outcome
            );
        }
        outcome
    }
}
