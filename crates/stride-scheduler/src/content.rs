//! Daily content: reuse, generate with fallback models, or degrade to a
//! static template. Never fails; a generic email beats no email.

use jiff::civil::Date;
use jiff::Timestamp;
use tracing::{info, warn};

use stride_core::models::content::{
    ContentKind, ContentRequest, DailyContent, GeneratedContent,
};
use stride_core::models::goal::{CoachingTone, Goal};

use crate::error::ContentError;
use crate::store::GoalStore;
use crate::BoxFuture;

/// An AI text provider.
pub trait ContentProvider: Send + Sync {
    fn generate<'a>(
        &'a self,
        model_id: &'a str,
        request: &'a ContentRequest,
    ) -> BoxFuture<'a, Result<GeneratedContent, ContentError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Reused,
    Generated { model_id: String },
    Fallback,
}

#[derive(Debug, Clone)]
pub struct PreparedContent {
    pub content: DailyContent,
    pub source: ContentSource,
}

/// The request kind for a goal on `today`.
pub fn content_kind(goal: &Goal, today: Date) -> ContentKind {
    if goal.streak_at_risk(today) {
        ContentKind::UrgentNudge
    } else {
        ContentKind::Daily
    }
}

pub fn build_request(goal: &Goal, kind: ContentKind) -> ContentRequest {
    ContentRequest {
        title: goal.title.clone(),
        description: goal.description.clone(),
        tone: goal.tone,
        streak_count: goal.streak_count,
        target_date: goal.target_date,
        kind,
    }
}

pub struct ContentGenerator<'a> {
    store: &'a dyn GoalStore,
    provider: &'a dyn ContentProvider,
    model_ids: &'a [String],
}

impl<'a> ContentGenerator<'a> {
    pub fn new(
        store: &'a dyn GoalStore,
        provider: &'a dyn ContentProvider,
        model_ids: &'a [String],
    ) -> Self {
        Self {
            store,
            provider,
            model_ids,
        }
    }

    /// Content for `goal` on `today`.
    ///
    /// A stored record for the same date and streak is reused without a
    /// provider call. Otherwise each configured model is tried in order;
    /// the first valid answer is stored (overwriting any stale same-day
    /// record). If every model fails, static content is returned and not
    /// stored.
    pub async fn prepare(&self, goal: &Goal, today: Date, now: Timestamp) -> PreparedContent {
        match self.store.get_content(goal.id, today).await {
            Ok(Some(existing)) if existing.is_reusable_for(today, goal.streak_count) => {
                info!(goal_id = %goal.id, "reusing stored daily content");
                return PreparedContent {
                    content: existing,
                    source: ContentSource::Reused,
                };
            }
            Ok(Some(stale)) => {
                info!(
                    goal_id = %goal.id,
                    stored_streak = stale.streak_snapshot,
                    streak = goal.streak_count,
                    "streak changed since content was generated, regenerating"
                );
            }
            Ok(None) => {}
            Err(e) => {
                warn!(goal_id = %goal.id, error = %e, "content lookup failed, generating fresh");
            }
        }

        let kind = content_kind(goal, today);
        let request = build_request(goal, kind);

        for model_id in self.model_ids {
            match self.provider.generate(model_id, &request).await {
                Ok(generated) => {
                    let content = DailyContent {
                        goal_id: goal.id,
                        date: today,
                        message: generated.message,
                        micro_plan: generated.micro_plan,
                        challenge: generated.challenge,
                        streak_snapshot: goal.streak_count,
                        kind,
                        model_id: Some(model_id.clone()),
                        created_at: now,
                    };
                    if let Err(e) = self.store.put_content(content.clone()).await {
                        warn!(goal_id = %goal.id, error = %e, "failed to store daily content");
                    }
                    return PreparedContent {
                        content,
                        source: ContentSource::Generated {
                            model_id: model_id.clone(),
                        },
                    };
                }
                Err(e) => {
                    warn!(
                        goal_id = %goal.id,
                        model_id = %model_id,
                        error = %e,
                        "content model failed"
                    );
                }
            }
        }

        warn!(goal_id = %goal.id, "all content models failed, using static content");
        PreparedContent {
            content: static_content(goal, today, kind, now),
            source: ContentSource::Fallback,
        }
    }
}

/// Non-personalized content used when no model produced a valid answer.
pub fn static_content(goal: &Goal, today: Date, kind: ContentKind, now: Timestamp) -> DailyContent {
    let title = goal.title.trim();

    let message = match (kind, goal.tone) {
        (ContentKind::UrgentNudge, _) => format!(
            "Your {}-day streak on \"{title}\" needs you today. One small step keeps it alive.",
            goal.streak_count
        ),
        (ContentKind::Daily, CoachingTone::Gentle) => format!(
            "Every small step toward \"{title}\" counts. \
             Be kind to yourself and make a little progress today."
        ),
        (ContentKind::Daily, CoachingTone::Balanced) => format!(
            "Today is another chance to move \"{title}\" forward. Pick one thing and get it done."
        ),
        (ContentKind::Daily, CoachingTone::Drill) => format!(
            "No excuses today. \"{title}\" won't happen by itself. Get moving."
        ),
    };

    DailyContent {
        goal_id: goal.id,
        date: today,
        message,
        micro_plan: vec![
            format!("Spend 10 focused minutes on \"{title}\""),
            "Write down the one obstacle most likely to stop you today".to_string(),
            "Check in when you're done".to_string(),
        ],
        challenge: "What is the smallest action that would make today a win?".to_string(),
        streak_snapshot: goal.streak_count,
        kind,
        model_id: None,
        created_at: now,
    }
}
