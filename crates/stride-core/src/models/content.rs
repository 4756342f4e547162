use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::goal::CoachingTone;

/// Why a piece of content is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Daily,
    UrgentNudge,
}

/// Everything the content model needs to write a goal's daily message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tone: CoachingTone,
    pub streak_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<Date>,
    pub kind: ContentKind,
}

/// Structured output expected back from the content model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub message: String,
    pub micro_plan: Vec<String>,
    pub challenge: String,
}

/// The day's motivational content for a goal. At most one per (goal, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyContent {
    pub goal_id: Uuid,
    pub date: Date,
    pub message: String,
    pub micro_plan: Vec<String>,
    pub challenge: String,
    /// Streak count at generation time. A mismatch forces regeneration.
    pub streak_snapshot: u32,
    pub kind: ContentKind,
    /// `None` for static fallback content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    pub created_at: jiff::Timestamp,
}

impl DailyContent {
    pub fn is_reusable_for(&self, date: Date, streak_count: u32) -> bool {
        self.date == date && self.streak_snapshot == streak_count
    }
}
