//! Email delivery with bounded retry and exponential backoff.
//!
//! Only a provider-assigned message id counts as delivered. Every attempt is
//! appended to the send's `DeliveryOutcome`, which is written `pending`
//! before the first attempt and rewritten after each one.

use std::time::Duration;

use jiff::civil::Date;
use tracing::{info, warn};

use stride_core::models::content::{ContentKind, DailyContent};
use stride_core::models::delivery::{DeliveryAttempt, DeliveryOutcome, DeliveryStatus};
use stride_core::models::goal::Goal;
use stride_core::models::profile::Profile;
use stride_mail::error::MailError;
use stride_mail::render::{self, DailyEmail};

use crate::error::SendError;
use crate::store::GoalStore;
use crate::BoxFuture;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// One send attempt against an email provider. No retry inside.
pub trait EmailProvider: Send + Sync {
    /// Every attempt of one send carries the same `idempotency_key`, so a
    /// provider that already accepted the email does not deliver it twice.
    fn send<'a>(
        &'a self,
        email: &'a OutgoingEmail,
        idempotency_key: &'a str,
    ) -> BoxFuture<'a, Result<String, SendError>>;
}

/// Provider idempotency key for one send, stable across its attempts.
pub fn idempotency_key(outcome: &DeliveryOutcome) -> String {
    format!("stride-delivery/{}", outcome.id)
}

/// Injected so backoff can be observed without waiting.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay before 1-based `attempt`: zero for the first, then
    /// `base * 2^(attempt - 2)` capped at `max_delay`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// Render the email for a goal's content.
pub fn compose_email(
    goal: &Goal,
    profile: &Profile,
    content: &DailyContent,
    app_url: Option<&str>,
) -> Result<OutgoingEmail, MailError> {
    let greeting_name = profile
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("there");

    let html = render::render_daily_html(&DailyEmail {
        greeting_name,
        goal_title: goal.title.trim(),
        streak_count: goal.streak_count,
        message: &content.message,
        micro_plan: &content.micro_plan,
        challenge: &content.challenge,
        urgent: content.kind == ContentKind::UrgentNudge,
        app_url,
    })?;

    Ok(OutgoingEmail {
        to: profile.email.clone(),
        subject: render::subject_line(content.kind, &goal.title, goal.streak_count),
        html,
    })
}

/// Final state of one send.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    pub fn is_sent(&self) -> bool {
        self.outcome.status == DeliveryStatus::Sent
    }

    pub fn provider_message_id(&self) -> Option<&str> {
        self.outcome.provider_message_id.as_deref()
    }

    pub fn attempts(&self) -> usize {
        self.outcome.attempts.len()
    }
}

pub struct Deliverer<'a> {
    store: &'a dyn GoalStore,
    provider: &'a dyn EmailProvider,
    sleeper: &'a dyn Sleeper,
    policy: RetryPolicy,
}

impl<'a> Deliverer<'a> {
    pub fn new(
        store: &'a dyn GoalStore,
        provider: &'a dyn EmailProvider,
        sleeper: &'a dyn Sleeper,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            provider,
            sleeper,
            policy,
        }
    }

    /// Send `email` for `goal`, retrying transient failures.
    pub async fn send(&self, goal: &Goal, date: Date, email: &OutgoingEmail) -> DeliveryReport {
        let mut outcome = DeliveryOutcome::pending(goal.id, goal.user_id, date, &email.to);
        let key = idempotency_key(&outcome);
        self.log(&outcome).await;

        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=max_attempts {
            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                self.sleeper.sleep(delay).await;
            }

            let result = match self.provider.send(email, &key).await {
                Ok(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
                Ok(_) => Err(SendError::retryable("provider returned an empty message id")),
                Err(e) => Err(e),
            };

            match result {
                Ok(id) => {
                    outcome.record_attempt(DeliveryAttempt {
                        attempt,
                        at: jiff::Timestamp::now(),
                        delay_before_ms: delay.as_millis() as u64,
                        error: None,
                        provider_message_id: Some(id.clone()),
                    });
                    outcome.mark_sent(id.clone());
                    self.log(&outcome).await;
                    info!(goal_id = %goal.id, attempt, provider_message_id = %id, "email sent");
                    return DeliveryReport { outcome };
                }
                Err(e) => {
                    warn!(
                        goal_id = %goal.id,
                        attempt,
                        max_attempts,
                        retryable = e.retryable,
                        error = %e,
                        "email attempt failed"
                    );
                    outcome.record_attempt(DeliveryAttempt {
                        attempt,
                        at: jiff::Timestamp::now(),
                        delay_before_ms: delay.as_millis() as u64,
                        error: Some(e.message.clone()),
                        provider_message_id: None,
                    });
                    last_error = e.message;
                    if !e.retryable {
                        break;
                    }
                    if attempt < max_attempts {
                        self.log(&outcome).await;
                    }
                }
            }
        }

        outcome.mark_failed(last_error);
        self.log(&outcome).await;
        warn!(goal_id = %goal.id, attempts = outcome.attempts.len(), "email delivery failed");
        DeliveryReport { outcome }
    }

    async fn log(&self, outcome: &DeliveryOutcome) {
        if let Err(e) = self.store.put_outcome(outcome.clone()).await {
            warn!(outcome_id = %outcome.id, error = %e, "failed to write delivery outcome");
        }
    }
}
