use jiff::Timestamp;
use lambda_http::lambda_runtime::{self, service_fn, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stride_lambda::{event, setup};
use stride_scheduler::{run_daily, Collaborators, SchedulerConfig};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = SchedulerConfig::from_env()?;
    let aws = setup::load_aws_config().await;
    let ctx = setup::build_collaborators(&config, &aws)?;

    let config = &config;
    let ctx = &ctx;
    lambda_runtime::run(service_fn(move |invocation| handle(ctx, config, invocation)))
        .await
        .map_err(|e| eyre::eyre!(e))
}

async fn handle(
    ctx: &Collaborators,
    config: &SchedulerConfig,
    invocation: LambdaEvent<Value>,
) -> Result<Value, lambda_runtime::Error> {
    let options = event::run_options(&invocation.payload);
    info!(
        request_id = %invocation.context.request_id,
        force = options.force,
        "daily run triggered"
    );

    let summary = run_daily(ctx, config, Timestamp::now(), options)
        .await
        .inspect_err(|e| error!(error = %e, "daily run aborted"))?;

    Ok(serde_json::to_value(summary)?)
}
