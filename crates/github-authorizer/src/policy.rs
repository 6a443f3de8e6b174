use serde::{Deserialize, Serialize};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn from_permitted(permitted: bool) -> Self {
        if permitted {
            Effect::Allow
        } else {
            Effect::Deny
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response returned to API Gateway for a custom (TOKEN) authorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

impl PolicyDecision {
    pub fn effect(&self) -> Effect {
        self.policy_document
            .statement
            .first()
            .map(|s| s.effect)
            .unwrap_or(Effect::Deny)
    }
}

/// Build the single-statement policy for `resource`.
///
/// The resource is the method ARN exactly as API Gateway sent it. Nothing here
/// widens it to a wildcard, so a cached policy only ever covers that method.
pub fn generate_policy(resource: &str, effect: Effect, principal_id: &str) -> PolicyDecision {
    PolicyDecision {
        principal_id: principal_id.to_string(),
        policy_document: PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                action: INVOKE_ACTION.to_string(),
                effect,
                resource: resource.to_string(),
            }],
        },
    }
}
