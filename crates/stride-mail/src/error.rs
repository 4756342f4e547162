use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("email provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("email provider unreachable: {0}")]
    Network(String),

    #[error("email provider request timed out: {0}")]
    Timeout(String),

    #[error("unexpected email provider response: {0}")]
    ResponseParse(String),

    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MailError {
    /// Whether the same request may succeed if sent again.
    ///
    /// Rate limits, timeouts and 5xx are transient. Other 4xx (bad
    /// recipient, invalid key, validation) will fail identically. A timeout
    /// or unreadable response may follow an accepted send, so retries only
    /// stay single-delivery when the message carries an idempotency key.
    pub fn is_retryable(&self) -> bool {
        match self {
            MailError::Http { status, .. } => matches!(status, 408 | 429 | 500..=599),
            MailError::Network(_) | MailError::Timeout(_) | MailError::ResponseParse(_) => true,
            MailError::TemplateRender(_) | MailError::Client(_) | MailError::Serialization(_) => {
                false
            }
        }
    }
}

impl From<tera::Error> for MailError {
    fn from(e: tera::Error) -> Self {
        MailError::TemplateRender(e.to_string())
    }
}

impl From<reqwest::Error> for MailError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MailError::Timeout(e.to_string())
        } else {
            MailError::Network(e.to_string())
        }
    }
}
