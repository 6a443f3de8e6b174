use serde::Deserialize;

use crate::identity::IdentityProvider;
use crate::permission::{PermissionRequest, PermissionSource};
use crate::policy::{generate_policy, Effect, PolicyDecision};

/// Principal reported when no identity could be established.
pub const FALLBACK_PRINCIPAL: &str = "user";

const BEARER_PREFIX: &str = "Bearer ";

/// TOKEN authorizer event sent by API Gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationRequest {
    #[serde(rename = "authorizationToken")]
    pub authorization_token: Option<String>,
    #[serde(rename = "methodArn")]
    pub method_arn: String,
}

impl AuthorizationRequest {
    /// The raw credential with any `Bearer ` prefix removed. Blank tokens count
    /// as absent.
    pub fn bearer_token(&self) -> Option<&str> {
        let raw = self.authorization_token.as_deref()?.trim_start();
        let token = match raw.get(..BEARER_PREFIX.len()) {
            Some(scheme) if scheme.eq_ignore_ascii_case(BEARER_PREFIX) => {
                &raw[BEARER_PREFIX.len()..]
            }
            _ => raw,
        }
        .trim();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}

pub struct Authorizer<I, P> {
    identity: I,
    permissions: P,
}

impl<I, P> Authorizer<I, P>
where
    I: IdentityProvider,
    P: PermissionSource,
{
    pub fn new(identity: I, permissions: P) -> Self {
        Self {
            identity,
            permissions,
        }
    }

    /// Decide Allow or Deny for `request`. Never fails: every fault along the
    /// way ends in a Deny for the requested method ARN.
    pub async fn authorize(&self, request: &AuthorizationRequest) -> PolicyDecision {
        let (effect, principal_id) = self.decide(request).await;
        log::info!("{effect} {principal_id} for {}", request.method_arn);
        generate_policy(&request.method_arn, effect, &principal_id)
    }

    async fn decide(&self, request: &AuthorizationRequest) -> (Effect, String) {
        let Some(token) = request.bearer_token() else {
            log::info!("No authorization token supplied");
            return (Effect::Deny, FALLBACK_PRINCIPAL.to_string());
        };

        let identity = match self.identity.validate(token).await {
            Ok(identity) => identity,
            Err(e) => {
                log::info!("Token validation failed: {e}");
                let principal = e.reported_login().unwrap_or(FALLBACK_PRINCIPAL);
                return (Effect::Deny, principal.to_string());
            }
        };

        let outcome = self
            .permissions
            .check(PermissionRequest {
                login: &identity.login,
                method_arn: &request.method_arn,
                caller_token: token,
            })
            .await;

        (Effect::from_permitted(outcome.is_permitted()), identity.login)
    }
}
