use std::time::Duration;

use github_authorizer::{
    build_authorizer, AuthorizationRequest, AuthorizerConfig, GitHubAuthorizer, PermissionScope,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const METHOD_ARN: &str =
    "arn:aws:execute-api:us-east-1:123456789012:api-id/stage/method/resource-path";

pub fn org_scope() -> PermissionScope {
    PermissionScope::Organization("acme".to_string())
}

pub fn repo_scope() -> PermissionScope {
    PermissionScope::Repository {
        owner: "acme".to_string(),
        repo: "benchmarks".to_string(),
    }
}

pub fn spawn_authorizer(
    mock_server: &MockServer,
    scope: PermissionScope,
    permission_token: Option<&str>,
) -> GitHubAuthorizer {
    let config = AuthorizerConfig {
        api_url: mock_server.uri(),
        scope,
        permission_token: permission_token.map(str::to_string),
        request_timeout: Duration::from_secs(2),
    };
    build_authorizer(&config).expect("Failed to build authorizer")
}

pub fn event(token: Option<&str>) -> AuthorizationRequest {
    serde_json::from_value(match token {
        Some(token) => serde_json::json!({
            "type": "TOKEN",
            "authorizationToken": token,
            "methodArn": METHOD_ARN,
        }),
        None => serde_json::json!({
            "type": "TOKEN",
            "methodArn": METHOD_ARN,
        }),
    })
    .expect("Failed to build event")
}

/// Mount `GET /user` answering `status` with `body` for `token`.
pub async fn mount_user(
    mock_server: &MockServer,
    token: &str,
    status: u16,
    body: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(mock_server)
        .await;
}
