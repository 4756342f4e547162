use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MailError;

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// A rendered email ready to hand to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    /// Sent as `Idempotency-Key`. Resend drops a repeat of an accepted key
    /// instead of delivering twice.
    pub idempotency_key: Option<String>,
}

/// Request body for `POST /emails`.
#[derive(Debug, Serialize)]
pub struct SendEmailBody<'a> {
    pub from: &'a str,
    pub to: [&'a str; 1],
    pub subject: &'a str,
    pub html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

/// Resend API client. Cheap to clone.
#[derive(Clone)]
pub struct ResendClient {
    http: Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl ResendClient {
    pub fn new(base_url: &str, api_key: &str, from: &str) -> Result<Self, MailError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| MailError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
        })
    }

    /// Send one email. Returns the provider-assigned message id.
    pub async fn send(&self, message: &EmailMessage) -> Result<String, MailError> {
        let body = request_body(&self.from, message);
        let url = format!("{}/emails", self.base_url);
        debug!(url = %url, to = %message.to, "sending email");

        let mut request = self.http.post(&url).bearer_auth(&self.api_key).json(&body);
        if let Some(key) = &message.idempotency_key {
            request = request.header("Idempotency-Key", key);
        }
        let resp = request.send().await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        if !(200..300).contains(&status) {
            warn!(status, "email provider rejected request");
        }
        parse_response(status, &text)
    }
}

pub fn request_body<'a>(from: &'a str, message: &'a EmailMessage) -> SendEmailBody<'a> {
    SendEmailBody {
        from,
        to: [message.to.as_str()],
        subject: &message.subject,
        html: &message.html,
    }
}

/// Map a raw provider response to a message id.
///
/// A 2xx without a non-empty `id` is not a confirmed delivery.
pub fn parse_response(status: u16, body: &str) -> Result<String, MailError> {
    if !(200..300).contains(&status) {
        return Err(MailError::Http {
            status,
            body: truncate(body, 500),
        });
    }

    let parsed: SendEmailResponse = serde_json::from_str(body)
        .map_err(|e| MailError::ResponseParse(format!("{e}: {}", truncate(body, 200))))?;

    match parsed.id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(MailError::ResponseParse(
            "response carried no message id".to_string(),
        )),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
