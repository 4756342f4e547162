use std::sync::Arc;

use aws_config::{BehaviorVersion, SdkConfig};
use tracing::info;

use stride_mail::resend::ResendClient;
use stride_scheduler::config::StoreBackend;
use stride_scheduler::delivery::TokioSleeper;
use stride_scheduler::providers::{BedrockContent, ResendMailer};
use stride_scheduler::store::{GoalStore, MemoryGoalStore, S3GoalStore};
use stride_scheduler::{Collaborators, SchedulerConfig};

/// Load the ambient AWS configuration (Lambda role, environment or profile).
pub async fn load_aws_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}

/// Build production collaborators for `config`.
pub fn build_collaborators(
    config: &SchedulerConfig,
    aws: &SdkConfig,
) -> eyre::Result<Collaborators> {
    let store: Arc<dyn GoalStore> = match config.store {
        StoreBackend::S3 => {
            let s3 = stride_storage::client::build_client(aws);
            Arc::new(S3GoalStore::new(s3, config.bucket.clone()))
        }
        StoreBackend::Memory => Arc::new(MemoryGoalStore::new()),
    };

    let resend = ResendClient::new(
        &config.resend_base_url,
        config.require_resend_api_key()?,
        &config.email_from,
    )?;

    info!(
        store = ?config.store,
        bucket = %config.bucket,
        models = ?config.model_ids,
        window = %config.delivery_window,
        "collaborators ready"
    );

    Ok(Collaborators {
        store,
        content: Arc::new(BedrockContent::new(stride_bedrock::client::build_client(aws))),
        email: Arc::new(ResendMailer::new(resend)),
        sleeper: Arc::new(TokioSleeper),
    })
}
