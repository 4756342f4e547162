use aws_sdk_s3::Client;
use jiff::civil::Date;
use tracing::{debug, warn};
use uuid::Uuid;

use stride_core::models::content::DailyContent;
use stride_core::models::delivery::DeliveryOutcome;
use stride_core::models::goal::Goal;
use stride_core::models::profile::{Profile, SubscriptionStatus};
use stride_core::models::run::RunSummary;
use stride_core::models::skip::SkipRecord;
use stride_core::s3_keys;
use stride_storage::error::StorageError;
use stride_storage::objects;
use stride_storage::state::{self, Versioned};

use crate::claim::{self, ClaimOutcome, ClaimRequest, ClaimToken};
use crate::error::StoreError;
use crate::store::cas::{self, VersionedGoals};
use crate::store::GoalStore;
use crate::BoxFuture;

/// Goal store over one S3 bucket.
///
/// Goal mutations are compare-and-set through [`cas::update_goal`]: read the
/// object and its ETag, apply the predicate, write back with `If-Match`.
#[derive(Clone)]
pub struct S3GoalStore {
    client: Client,
    bucket: String,
}

impl S3GoalStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    async fn put<T>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: serde::Serialize + Sync,
    {
        state::save(&self.client, &self.bucket, key, value).await?;
        Ok(())
    }
}

impl VersionedGoals for S3GoalStore {
    fn load(&self, goal_id: Uuid) -> BoxFuture<'_, Result<Versioned<Goal>, StorageError>> {
        Box::pin(async move {
            let key = s3_keys::goal(goal_id);
            state::load_versioned(&self.client, &self.bucket, &key).await
        })
    }

    fn save_if_match<'a>(
        &'a self,
        goal: &'a Goal,
        etag: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            let key = s3_keys::goal(goal.id);
            state::save_if_match(&self.client, &self.bucket, &key, goal, etag).await
        })
    }
}

impl GoalStore for S3GoalStore {
    fn list_goals(&self) -> BoxFuture<'_, Result<Vec<Goal>, StoreError>> {
        Box::pin(async move {
            let keys = objects::list_keys(&self.client, &self.bucket, s3_keys::GOALS_PREFIX).await?;

            let mut goals = Vec::with_capacity(keys.len());
            for key in &keys {
                match state::load_optional::<Goal>(&self.client, &self.bucket, key).await {
                    Ok(Some(goal)) => goals.push(goal),
                    // Deleted between list and get.
                    Ok(None) => {}
                    Err(StorageError::Serialization(e)) => {
                        warn!(key = %key, error = %e, "skipping unreadable goal record");
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            debug!(count = goals.len(), "goals loaded");
            Ok(goals)
        })
    }

    fn get_profile(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<Profile>, StoreError>> {
        Box::pin(async move {
            let key = s3_keys::profile(user_id);
            Ok(state::load_optional(&self.client, &self.bucket, &key).await?)
        })
    }

    fn get_subscription(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<SubscriptionStatus>, StoreError>> {
        Box::pin(async move {
            let key = s3_keys::subscription(user_id);
            Ok(state::load_optional(&self.client, &self.bucket, &key).await?)
        })
    }

    fn try_claim(&self, request: ClaimRequest) -> BoxFuture<'_, Result<ClaimOutcome, StoreError>> {
        Box::pin(async move {
            let claimed = cas::update_goal(self, request.goal_id, |goal| {
                claim::apply_claim(goal, &request)
            })
            .await?;
            Ok(if claimed {
                ClaimOutcome::Claimed(ClaimToken {
                    goal_id: request.goal_id,
                    date: request.date,
                    run_id: request.run_id,
                })
            } else {
                ClaimOutcome::NotClaimed
            })
        })
    }

    fn release_claim(&self, token: ClaimToken) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            cas::update_goal(self, token.goal_id, |goal| claim::apply_release(goal, &token))
                .await
        })
    }

    fn commit_claim(&self, token: ClaimToken) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            cas::update_goal(self, token.goal_id, |goal| claim::apply_commit(goal, &token))
                .await
        })
    }

    fn mark_processed(&self, goal_id: Uuid, date: Date) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            cas::update_goal(self, goal_id, |goal| claim::apply_mark_processed(goal, date))
                .await
        })
    }

    fn get_content(
        &self,
        goal_id: Uuid,
        date: Date,
    ) -> BoxFuture<'_, Result<Option<DailyContent>, StoreError>> {
        Box::pin(async move {
            let key = s3_keys::daily_content(goal_id, date);
            Ok(state::load_optional(&self.client, &self.bucket, &key).await?)
        })
    }

    fn put_content(&self, content: DailyContent) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let key = s3_keys::daily_content(content.goal_id, content.date);
            self.put(&key, &content).await
        })
    }

    fn put_outcome(&self, outcome: DeliveryOutcome) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let key = s3_keys::delivery_outcome(outcome.date, outcome.goal_id, outcome.id);
            self.put(&key, &outcome).await
        })
    }

    fn put_skip(&self, skip: SkipRecord) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let key = s3_keys::skip(skip.date, skip.goal_id);
            self.put(&key, &skip).await
        })
    }

    fn put_run_summary(&self, summary: RunSummary) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let key = s3_keys::run_summary(summary.date, summary.run_id);
            self.put(&key, &summary).await
        })
    }
}
