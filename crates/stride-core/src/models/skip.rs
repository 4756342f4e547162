use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a goal was not sent today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    Inactive,
    AlreadyProcessed,
    NoProfile,
    GoalExpired,
    TrialExpired,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Inactive => "inactive",
            SkipReason::AlreadyProcessed => "already-processed",
            SkipReason::NoProfile => "no-profile",
            SkipReason::GoalExpired => "goal-expired",
            SkipReason::TrialExpired => "trial-expired",
        }
    }

    /// Reasons that close the goal out for the day. The others describe
    /// goals that are either already processed or not scheduled at all.
    pub fn marks_processed(self) -> bool {
        matches!(
            self,
            SkipReason::NoProfile | SkipReason::GoalExpired | SkipReason::TrialExpired
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted skip, kept apart from the delivery log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub goal_id: Uuid,
    pub date: Date,
    pub reason: SkipReason,
    pub recorded_at: jiff::Timestamp,
}
