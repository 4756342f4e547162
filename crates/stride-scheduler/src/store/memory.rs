use std::collections::HashMap;
use std::sync::Arc;

use jiff::civil::Date;
use tokio::sync::Mutex;
use uuid::Uuid;

use stride_core::models::content::DailyContent;
use stride_core::models::delivery::DeliveryOutcome;
use stride_core::models::goal::Goal;
use stride_core::models::profile::{Profile, SubscriptionStatus};
use stride_core::models::run::RunSummary;
use stride_core::models::skip::SkipRecord;

use crate::claim::{self, ClaimOutcome, ClaimRequest, ClaimToken};
use crate::error::StoreError;
use crate::store::GoalStore;
use crate::BoxFuture;

#[derive(Default)]
struct Tables {
    goals: HashMap<Uuid, Goal>,
    profiles: HashMap<Uuid, Profile>,
    subscriptions: HashMap<Uuid, SubscriptionStatus>,
    content: HashMap<(Uuid, Date), DailyContent>,
    outcomes: HashMap<Uuid, DeliveryOutcome>,
    skips: HashMap<(Uuid, Date), SkipRecord>,
    runs: Vec<RunSummary>,
}

/// Process-local store. Every claim predicate and its write run under one
/// lock, which gives the same all-or-nothing semantics as a conditional
/// `UPDATE`. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryGoalStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_goal(&self, goal: Goal) {
        self.tables.lock().await.goals.insert(goal.id, goal);
    }

    pub async fn insert_profile(&self, profile: Profile) {
        self.tables
            .lock()
            .await
            .profiles
            .insert(profile.user_id, profile);
    }

    pub async fn insert_subscription(&self, subscription: SubscriptionStatus) {
        self.tables
            .lock()
            .await
            .subscriptions
            .insert(subscription.user_id, subscription);
    }

    pub async fn goal(&self, id: Uuid) -> Option<Goal> {
        self.tables.lock().await.goals.get(&id).cloned()
    }

    /// Delivery log entries for a goal, oldest first.
    pub async fn outcomes_for(&self, goal_id: Uuid) -> Vec<DeliveryOutcome> {
        let tables = self.tables.lock().await;
        let mut outcomes: Vec<_> = tables
            .outcomes
            .values()
            .filter(|o| o.goal_id == goal_id)
            .cloned()
            .collect();
        outcomes.sort_by_key(|o| o.created_at);
        outcomes
    }

    pub async fn skip_for(&self, goal_id: Uuid, date: Date) -> Option<SkipRecord> {
        self.tables.lock().await.skips.get(&(goal_id, date)).cloned()
    }

    pub async fn content_for(&self, goal_id: Uuid, date: Date) -> Option<DailyContent> {
        self.tables.lock().await.content.get(&(goal_id, date)).cloned()
    }

    pub async fn run_summaries(&self) -> Vec<RunSummary> {
        self.tables.lock().await.runs.clone()
    }

    async fn update_goal<F>(&self, goal_id: Uuid, mutate: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut Goal) -> bool,
    {
        let mut tables = self.tables.lock().await;
        let goal = tables
            .goals
            .get_mut(&goal_id)
            .ok_or(StoreError::GoalNotFound(goal_id))?;
        let changed = mutate(goal);
        if changed {
            goal.updated_at = jiff::Timestamp::now();
        }
        Ok(changed)
    }
}

impl GoalStore for MemoryGoalStore {
    fn list_goals(&self) -> BoxFuture<'_, Result<Vec<Goal>, StoreError>> {
        Box::pin(async move {
            let tables = self.tables.lock().await;
            let mut goals: Vec<Goal> = tables.goals.values().cloned().collect();
            goals.sort_by_key(|g| g.created_at);
            Ok(goals)
        })
    }

    fn get_profile(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<Profile>, StoreError>> {
        Box::pin(async move { Ok(self.tables.lock().await.profiles.get(&user_id).cloned()) })
    }

    fn get_subscription(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<SubscriptionStatus>, StoreError>> {
        Box::pin(async move {
            Ok(self
                .tables
                .lock()
                .await
                .subscriptions
                .get(&user_id)
                .cloned())
        })
    }

    fn try_claim(&self, request: ClaimRequest) -> BoxFuture<'_, Result<ClaimOutcome, StoreError>> {
        Box::pin(async move {
            let claimed = self
                .update_goal(request.goal_id, |goal| claim::apply_claim(goal, &request))
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
            self.update_goal(token.goal_id, |goal| claim::apply_release(goal, &token))
                .await
        })
    }

    fn commit_claim(&self, token: ClaimToken) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            self.update_goal(token.goal_id, |goal| claim::apply_commit(goal, &token))
                .await
        })
    }

    fn mark_processed(&self, goal_id: Uuid, date: Date) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            self.update_goal(goal_id, |goal| claim::apply_mark_processed(goal, date))
                .await
        })
    }

    fn get_content(
        &self,
        goal_id: Uuid,
        date: Date,
    ) -> BoxFuture<'_, Result<Option<DailyContent>, StoreError>> {
        Box::pin(async move { Ok(self.content_for(goal_id, date).await) })
    }

    fn put_content(&self, content: DailyContent) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.tables
                .lock()
                .await
                .content
                .insert((content.goal_id, content.date), content);
            Ok(())
        })
    }

    fn put_outcome(&self, outcome: DeliveryOutcome) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.tables.lock().await.outcomes.insert(outcome.id, outcome);
            Ok(())
        })
    }

    fn put_skip(&self, skip: SkipRecord) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.tables
                .lock()
                .await
                .skips
                .insert((skip.goal_id, skip.date), skip);
            Ok(())
        })
    }

    fn put_run_summary(&self, summary: RunSummary) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.tables.lock().await.runs.push(summary);
            Ok(())
        })
    }
}
