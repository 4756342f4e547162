use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's tracked objective, with streak and scheduling metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<Date>,
    #[serde(default)]
    pub streak_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check_in: Option<Date>,
    /// Date of the most recent confirmed daily touch.
    #[serde(default)]
    pub last_processed_date: Option<Date>,
    /// Lease held by a pipeline run between claim and commit/release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<GoalClaim>,
    #[serde(default)]
    pub tone: CoachingTone,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Goal {
    /// Whether the goal already received its daily touch on `date` (or later).
    pub fn processed_on_or_after(&self, date: Date) -> bool {
        self.last_processed_date.is_some_and(|d| d >= date)
    }

    /// A streak is at risk when it is non-zero and the user skipped
    /// checking in yesterday.
    pub fn streak_at_risk(&self, today: Date) -> bool {
        if self.streak_count == 0 {
            return false;
        }
        let Ok(yesterday) = today.yesterday() else {
            return false;
        };
        match self.last_check_in {
            Some(last) => last < yesterday,
            None => true,
        }
    }
}

/// Exclusive lease on a goal for one scheduling date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalClaim {
    pub date: Date,
    pub run_id: Uuid,
    pub expires_at: jiff::Timestamp,
}

impl GoalClaim {
    pub fn is_live(&self, now: jiff::Timestamp) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingTone {
    Gentle,
    #[default]
    Balanced,
    Drill,
}

impl CoachingTone {
    /// Style instruction handed to the content model.
    pub fn style_instruction(self) -> &'static str {
        match self {
            CoachingTone::Gentle => {
                "Be warm, patient and encouraging. Celebrate small wins and never scold."
            }
            CoachingTone::Balanced => {
                "Be friendly but direct. Pair encouragement with a clear push to act today."
            }
            CoachingTone::Drill => {
                "Be blunt and demanding like a drill sergeant. No excuses, short sentences."
            }
        }
    }
}
