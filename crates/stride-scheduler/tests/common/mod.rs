#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jiff::civil::{date, Date};
use jiff::Timestamp;
use uuid::Uuid;

use stride_core::models::content::{ContentRequest, DailyContent, GeneratedContent};
use stride_core::models::delivery::DeliveryOutcome;
use stride_core::models::goal::{CoachingTone, Goal};
use stride_core::models::profile::{Profile, SubscriptionStatus};
use stride_core::models::run::RunSummary;
use stride_core::models::skip::SkipRecord;
use stride_scheduler::claim::{ClaimOutcome, ClaimRequest, ClaimToken};
use stride_scheduler::content::ContentProvider;
use stride_scheduler::delivery::{EmailProvider, OutgoingEmail, Sleeper};
use stride_scheduler::error::{ContentError, SendError};
use stride_scheduler::store::{GoalStore, MemoryGoalStore};
use stride_scheduler::{BoxFuture, Collaborators, SchedulerConfig, StoreError};

pub const MESSAGE_ID: &str = "abc123";

pub fn today() -> Date {
    date(2026, 5, 10)
}

pub fn now() -> Timestamp {
    "2026-05-10T14:00:00Z".parse().unwrap()
}

pub fn config() -> SchedulerConfig {
    SchedulerConfig {
        model_ids: vec!["model-a".to_string(), "model-b".to_string()],
        ..SchedulerConfig::default()
    }
}

pub fn goal(user_id: Uuid) -> Goal {
    let created = "2026-04-01T09:00:00Z".parse().unwrap();
    Goal {
        id: Uuid::new_v4(),
        user_id,
        title: "Learn Spanish".to_string(),
        description: Some("Hold a 10 minute conversation".to_string()),
        active: true,
        target_date: Some(date(2026, 12, 31)),
        streak_count: 4,
        last_check_in: Some(date(2026, 5, 9)),
        last_processed_date: Some(date(2026, 5, 9)),
        claim: None,
        tone: CoachingTone::Balanced,
        created_at: created,
        updated_at: created,
    }
}

pub fn profile(user_id: Uuid) -> Profile {
    Profile {
        user_id,
        email: "ana@example.com".to_string(),
        display_name: Some("Ana".to_string()),
        trial_ends_at: Some("2026-06-01T00:00:00Z".parse().unwrap()),
    }
}

pub fn paying(user_id: Uuid) -> SubscriptionStatus {
    SubscriptionStatus {
        user_id,
        is_paying: true,
        tier: "pro".to_string(),
    }
}

pub fn generated(message: &str) -> GeneratedContent {
    GeneratedContent {
        message: message.to_string(),
        micro_plan: vec!["Review 20 flashcards".to_string()],
        challenge: "Order your coffee in Spanish".to_string(),
    }
}

/// A store holding one eligible goal with its profile.
pub async fn seeded_store() -> (MemoryGoalStore, Goal) {
    let store = MemoryGoalStore::new();
    let user_id = Uuid::new_v4();
    let g = goal(user_id);
    store.insert_goal(g.clone()).await;
    store.insert_profile(profile(user_id)).await;
    (store, g)
}

/// Content provider that fails for the listed models and records every call.
#[derive(Default)]
pub struct ScriptedContent {
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(models: &[&str]) -> Self {
        Self {
            failing: models.iter().map(|m| m.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ContentProvider for ScriptedContent {
    fn generate<'a>(
        &'a self,
        model_id: &'a str,
        _request: &'a ContentRequest,
    ) -> BoxFuture<'a, Result<GeneratedContent, ContentError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(model_id.to_string());
            if self.failing.iter().any(|m| m == model_id) {
                return Err(ContentError::Provider(format!("{model_id} unavailable")));
            }
            Ok(generated(&format!("from {model_id}")))
        })
    }
}

/// Mailer that plays back scripted results, then succeeds with [`MESSAGE_ID`].
#[derive(Default)]
pub struct ScriptedMailer {
    script: Mutex<VecDeque<Result<String, SendError>>>,
    sent: Mutex<Vec<OutgoingEmail>>,
    keys: Mutex<Vec<String>>,
}

impl ScriptedMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripted(results: Vec<Result<String, SendError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    pub fn always_failing(attempts: usize) -> Self {
        Self::scripted(
            (0..attempts)
                .map(|_| Err(SendError::retryable("503 service unavailable")))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Idempotency key of every attempt, in order.
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

impl EmailProvider for ScriptedMailer {
    fn send<'a>(
        &'a self,
        email: &'a OutgoingEmail,
        idempotency_key: &'a str,
    ) -> BoxFuture<'a, Result<String, SendError>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(email.clone());
            self.keys.lock().unwrap().push(idempotency_key.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(MESSAGE_ID.to_string()))
        })
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        self.slept.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}

/// Wraps a memory store and fails selected operations on demand.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryGoalStore,
    pub fail_list: Arc<AtomicBool>,
    pub fail_claim: Arc<AtomicBool>,
    pub fail_commit: Arc<AtomicBool>,
    pub fail_release: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: MemoryGoalStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("{op} is down")))
        } else {
            Ok(())
        }
    }
}

impl GoalStore for FlakyStore {
    fn list_goals(&self) -> BoxFuture<'_, Result<Vec<Goal>, StoreError>> {
        Box::pin(async move {
            Self::check(&self.fail_list, "list_goals")?;
            self.inner.list_goals().await
        })
    }

    fn get_profile(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<Profile>, StoreError>> {
        self.inner.get_profile(user_id)
    }

    fn get_subscription(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<SubscriptionStatus>, StoreError>> {
        self.inner.get_subscription(user_id)
    }

    fn try_claim(&self, request: ClaimRequest) -> BoxFuture<'_, Result<ClaimOutcome, StoreError>> {
        Box::pin(async move {
            Self::check(&self.fail_claim, "try_claim")?;
            self.inner.try_claim(request).await
        })
    }

    fn release_claim(&self, token: ClaimToken) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            Self::check(&self.fail_release, "release_claim")?;
            self.inner.release_claim(token).await
        })
    }

    fn commit_claim(&self, token: ClaimToken) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            Self::check(&self.fail_commit, "commit_claim")?;
            self.inner.commit_claim(token).await
        })
    }

    fn mark_processed(&self, goal_id: Uuid, date: Date) -> BoxFuture<'_, Result<bool, StoreError>> {
        self.inner.mark_processed(goal_id, date)
    }

    fn get_content(
        &self,
        goal_id: Uuid,
        date: Date,
    ) -> BoxFuture<'_, Result<Option<DailyContent>, StoreError>> {
        self.inner.get_content(goal_id, date)
    }

    fn put_content(&self, content: DailyContent) -> BoxFuture<'_, Result<(), StoreError>> {
        self.inner.put_content(content)
    }

    fn put_outcome(&self, outcome: DeliveryOutcome) -> BoxFuture<'_, Result<(), StoreError>> {
        self.inner.put_outcome(outcome)
    }

    fn put_skip(&self, skip: SkipRecord) -> BoxFuture<'_, Result<(), StoreError>> {
        self.inner.put_skip(skip)
    }

    fn put_run_summary(&self, summary: RunSummary) -> BoxFuture<'_, Result<(), StoreError>> {
        self.inner.put_run_summary(summary)
    }
}

/// Test doubles wired into a [`Collaborators`].
pub struct Harness {
    pub content: Arc<ScriptedContent>,
    pub mailer: Arc<ScriptedMailer>,
    pub sleeper: Arc<RecordingSleeper>,
    pub ctx: Collaborators,
}

impl Harness {
    pub fn new(
        store: Arc<dyn GoalStore>,
        content: ScriptedContent,
        mailer: ScriptedMailer,
    ) -> Self {
        let content = Arc::new(content);
        let mailer = Arc::new(mailer);
        let sleeper = Arc::new(RecordingSleeper::default());
        let ctx = Collaborators {
            store,
            content: content.clone(),
            email: mailer.clone(),
            sleeper: sleeper.clone(),
        };
        Self {
            content,
            mailer,
            sleeper,
            ctx,
        }
    }
}
