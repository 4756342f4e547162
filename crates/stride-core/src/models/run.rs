use std::collections::BTreeMap;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::skip::SkipReason;

/// Counters for one invocation of the daily pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub date: Date,
    pub started_at: jiff::Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<jiff::Timestamp>,
    pub forced: bool,
    pub outside_window: bool,
    pub candidates: u32,
    pub eligible: u32,
    pub sent: u32,
    pub failed: u32,
    pub claim_lost: u32,
    pub claim_errors: u32,
    pub commit_errors: u32,
    pub skipped: BTreeMap<SkipReason, u32>,
    pub content_reused: u32,
    pub content_generated: u32,
    pub content_fallback: u32,
}

impl RunSummary {
    pub fn new(run_id: Uuid, date: Date, started_at: jiff::Timestamp, forced: bool) -> Self {
        Self {
            run_id,
            date,
            started_at,
            finished_at: None,
            forced,
            outside_window: false,
            candidates: 0,
            eligible: 0,
            sent: 0,
            failed: 0,
            claim_lost: 0,
            claim_errors: 0,
            commit_errors: 0,
            skipped: BTreeMap::new(),
            content_reused: 0,
            content_generated: 0,
            content_fallback: 0,
        }
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn skipped_for(&self, reason: SkipReason) -> u32 {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}
