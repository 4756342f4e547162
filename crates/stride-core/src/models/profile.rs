use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One per user. Read-only to the delivery pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<jiff::Timestamp>,
}

impl Profile {
    pub fn trial_expired(&self, now: jiff::Timestamp) -> bool {
        self.trial_ends_at.is_some_and(|ends| ends < now)
    }
}

/// Billing snapshot derived from the payment processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub user_id: Uuid,
    pub is_paying: bool,
    pub tier: String,
}
