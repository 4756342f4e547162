use thiserror::Error;
use uuid::Uuid;

use stride_storage::error::StorageError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("goal not found: {0}")]
    GoalNotFound(Uuid),

    #[error("gave up on goal {goal_id} after {rounds} conflicting writes")]
    Contention { goal_id: Uuid, rounds: u32 },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content provider failed: {0}")]
    Provider(String),

    #[error("content provider returned malformed content: {0}")]
    Malformed(String),
}

impl From<stride_bedrock::error::BedrockError> for ContentError {
    fn from(e: stride_bedrock::error::BedrockError) -> Self {
        use stride_bedrock::error::BedrockError;
        match e {
            BedrockError::SchemaViolation(msg) | BedrockError::ResponseParse(msg) => {
                ContentError::Malformed(msg)
            }
            other => ContentError::Provider(other.to_string()),
        }
    }
}

/// One failed send attempt, as seen by the retry loop.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SendError {
    pub message: String,
    pub retryable: bool,
}

impl SendError {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

impl From<stride_mail::error::MailError> for SendError {
    fn from(e: stride_mail::error::MailError) -> Self {
        Self {
            retryable: e.is_retryable(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Errors that abort a whole run. Per-goal failures never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot enumerate goals: {0}")]
    ListGoals(#[source] StoreError),

    #[error("cannot load account data for user {user_id}: {source}")]
    LoadAccount {
        user_id: Uuid,
        #[source]
        source: StoreError,
    },
}
