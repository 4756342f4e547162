use std::env;
use std::time::Duration;

use jiff::tz::TimeZone;
use jiff::SignedDuration;

use stride_core::schedule::DeliveryWindow;

use crate::delivery::RetryPolicy;
use crate::error::ConfigError;

pub const DEFAULT_MODEL_IDS: &[&str] = &[
    "us.anthropic.claude-haiku-4-5-20251001-v1:0",
    "us.anthropic.claude-3-5-haiku-20241022-v1:0",
];

/// Longest accepted claim lease, the Lambda execution ceiling.
pub const MAX_CLAIM_LEASE_SECS: u64 = 900;

/// Which `GoalStore` implementation a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    S3,
    Memory,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub bucket: String,
    pub store: StoreBackend,
    /// Reference zone for every scheduling date.
    pub timezone: TimeZone,
    pub delivery_window: DeliveryWindow,
    /// Tried in order; the first valid answer wins.
    pub model_ids: Vec<String>,
    pub email_from: String,
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
    pub retry: RetryPolicy,
    pub claim_lease: SignedDuration,
    pub app_url: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            bucket: "stride".to_string(),
            store: StoreBackend::S3,
            timezone: TimeZone::UTC,
            delivery_window: DeliveryWindow::ALWAYS,
            model_ids: DEFAULT_MODEL_IDS.iter().map(|s| s.to_string()).collect(),
            email_from: "Stride <coach@stride.app>".to_string(),
            resend_api_key: None,
            resend_base_url: stride_mail::resend::DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            claim_lease: SignedDuration::from_secs(MAX_CLAIM_LEASE_SECS as i64),
            app_url: None,
        }
    }
}

impl SchedulerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset or blank variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(bucket) = get("STRIDE_BUCKET") {
            config.bucket = bucket;
        }

        if let Some(store) = get("STRIDE_STORE") {
            config.store = match store.to_ascii_lowercase().as_str() {
                "s3" => StoreBackend::S3,
                "memory" => StoreBackend::Memory,
                other => {
                    return Err(ConfigError::Invalid {
                        name: "STRIDE_STORE",
                        reason: format!("expected `s3` or `memory`, got `{other}`"),
                    });
                }
            };
        }

        if let Some(tz) = get("STRIDE_TIMEZONE") {
            config.timezone = parse_timezone(&tz)?;
        }

        if let Some(window) = get("STRIDE_DELIVERY_WINDOW") {
            config.delivery_window = window.parse().map_err(|e| ConfigError::Invalid {
                name: "STRIDE_DELIVERY_WINDOW",
                reason: format!("{e}"),
            })?;
        }

        if let Some(models) = get("STRIDE_MODEL_IDS") {
            let ids: Vec<String> = models
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if ids.is_empty() {
                return Err(ConfigError::Invalid {
                    name: "STRIDE_MODEL_IDS",
                    reason: "no model ids listed".to_string(),
                });
            }
            config.model_ids = ids;
        }

        if let Some(from) = get("STRIDE_EMAIL_FROM") {
            config.email_from = from;
        }
        config.resend_api_key = get("RESEND_API_KEY");
        if let Some(url) = get("RESEND_BASE_URL") {
            config.resend_base_url = url;
        }
        config.app_url = get("STRIDE_APP_URL");

        if let Some(v) = get("STRIDE_MAX_ATTEMPTS") {
            let attempts = parse_u64("STRIDE_MAX_ATTEMPTS", &v)?;
            if attempts == 0 || attempts > 10 {
                return Err(ConfigError::Invalid {
                    name: "STRIDE_MAX_ATTEMPTS",
                    reason: format!("must be between 1 and 10, got {attempts}"),
                });
            }
            config.retry.max_attempts = attempts as u32;
        }
        if let Some(v) = get("STRIDE_BACKOFF_BASE_MS") {
            let millis = parse_u64("STRIDE_BACKOFF_BASE_MS", &v)?;
            config.retry.base_delay = Duration::from_millis(millis);
        }
        if let Some(v) = get("STRIDE_BACKOFF_CAP_MS") {
            let millis = parse_u64("STRIDE_BACKOFF_CAP_MS", &v)?;
            config.retry.max_delay = Duration::from_millis(millis);
        }
        if config.retry.max_delay < config.retry.base_delay {
            return Err(ConfigError::Invalid {
                name: "STRIDE_BACKOFF_CAP_MS",
                reason: "cap is smaller than the base delay".to_string(),
            });
        }

        if let Some(v) = get("STRIDE_CLAIM_LEASE_SECS") {
            let secs = parse_u64("STRIDE_CLAIM_LEASE_SECS", &v)?;
            if secs == 0 || secs > MAX_CLAIM_LEASE_SECS {
                return Err(ConfigError::Invalid {
                    name: "STRIDE_CLAIM_LEASE_SECS",
                    reason: format!("must be between 1 and {MAX_CLAIM_LEASE_SECS}, got {secs}"),
                });
            }
            let secs = i64::try_from(secs).map_err(|_| ConfigError::Invalid {
                name: "STRIDE_CLAIM_LEASE_SECS",
                reason: format!("{secs} does not fit a signed duration"),
            })?;
            config.claim_lease = SignedDuration::from_secs(secs);
        }

        Ok(config)
    }

    /// The Resend key, required once a real mailer is built.
    pub fn require_resend_api_key(&self) -> Result<&str, ConfigError> {
        self.resend_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("RESEND_API_KEY"))
    }
}

fn parse_timezone(name: &str) -> Result<TimeZone, ConfigError> {
    if name.eq_ignore_ascii_case("utc") {
        return Ok(TimeZone::UTC);
    }
    TimeZone::get(name).map_err(|e| ConfigError::Invalid {
        name: "STRIDE_TIMEZONE",
        reason: e.to_string(),
    })
}

fn parse_u64(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("`{value}`: {e}"),
    })
}
