use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

/// Log entry for one send, updated after every attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub recipient: String,
    pub status: DeliveryStatus,
    pub attempts: Vec<DeliveryAttempt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl DeliveryOutcome {
    pub fn pending(goal_id: Uuid, user_id: Uuid, date: Date, recipient: impl Into<String>) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            goal_id,
            user_id,
            date,
            recipient: recipient.into(),
            status: DeliveryStatus::Pending,
            attempts: Vec::new(),
            provider_message_id: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_attempt(&mut self, attempt: DeliveryAttempt) {
        self.updated_at = attempt.at;
        self.attempts.push(attempt);
    }

    pub fn mark_sent(&mut self, provider_message_id: impl Into<String>) {
        self.status = DeliveryStatus::Sent;
        self.provider_message_id = Some(provider_message_id.into());
        self.error = None;
        self.updated_at = jiff::Timestamp::now();
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = DeliveryStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = jiff::Timestamp::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    /// 1-based.
    pub attempt: u32,
    pub at: jiff::Timestamp,
    pub delay_before_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
}
