use env_logger::Env;
use github_authorizer::{build_authorizer, AuthorizationRequest, AuthorizerConfig, PolicyDecision};
use lambda_runtime::{service_fn, Error, LambdaEvent};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AuthorizerConfig::from_env()?;
    log::info!("Authorizing against {} ({})", config.api_url, config.scope);

    let authorizer = build_authorizer(&config)?;
    let authorizer = &authorizer;

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<AuthorizationRequest>| async move {
            let (request, _) = event.into_parts();
            Ok::<PolicyDecision, Error>(authorizer.authorize(&request).await)
        },
    ))
    .await?;
    Ok(())
}
