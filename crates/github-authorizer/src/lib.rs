pub mod config;
pub mod handler;
pub mod identity;
pub mod permission;
pub mod policy;

pub use config::{AuthorizerConfig, ConfigError, PermissionScope};
pub use handler::{AuthorizationRequest, Authorizer, FALLBACK_PRINCIPAL};
pub use identity::{GitHubIdentityProvider, Identity, IdentityError, IdentityProvider};
pub use permission::{
    GitHubPermissionSource, PermissionOutcome, PermissionRequest, PermissionSource,
};
pub use policy::{generate_policy, Effect, PolicyDecision, PolicyDocument, Statement};

pub const USER_AGENT: &str = concat!("github-authorizer/", env!("CARGO_PKG_VERSION"));

pub type GitHubAuthorizer = Authorizer<GitHubIdentityProvider, GitHubPermissionSource>;

/// Wire the GitHub-backed authorizer from `config`, sharing one HTTP client
/// between the identity and permission calls.
pub fn build_authorizer(config: &AuthorizerConfig) -> Result<GitHubAuthorizer, reqwest::Error> {
    let http_client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .timeout(config.request_timeout)
        .build()?;

    let identity = GitHubIdentityProvider::new(http_client.clone(), config.api_url.clone());
    let permissions = GitHubPermissionSource::new(
        http_client,
        config.api_url.clone(),
        config.scope.clone(),
        config.permission_token.clone(),
    );

    Ok(Authorizer::new(identity, permissions))
}
