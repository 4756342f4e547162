//! Where "processed" becomes durable.
//!
//! Confirmed send: commit the claim. Failed send: release it so the goal
//! stays eligible. Skipped goal: close it out for the day and write the
//! reason apart from the delivery log.

use jiff::civil::Date;
use tracing::{error, info, warn};

use stride_core::models::run::RunSummary;
use stride_core::models::skip::SkipRecord;

use crate::claim::{ClaimCoordinator, ClaimToken};
use crate::delivery::DeliveryReport;
use crate::eligibility::Exclusion;
use crate::store::GoalStore;

pub struct OutcomeRecorder<'a> {
    store: &'a dyn GoalStore,
    claims: &'a ClaimCoordinator<'a>,
}

impl<'a> OutcomeRecorder<'a> {
    pub fn new(store: &'a dyn GoalStore, claims: &'a ClaimCoordinator<'a>) -> Self {
        Self { store, claims }
    }

    /// Finalize a claimed goal after delivery returned.
    pub async fn record_delivery(
        &self,
        token: ClaimToken,
        report: &DeliveryReport,
        summary: &mut RunSummary,
    ) {
        let goal_id = token.goal_id;

        if report.is_sent() {
            summary.sent += 1;
            match self.claims.commit(token).await {
                Ok(_) => info!(goal_id = %goal_id, "goal processed for today"),
                Err(e) => {
                    // The email went out; a later run may send a duplicate.
                    summary.commit_errors += 1;
                    error!(
                        goal_id = %goal_id,
                        provider_message_id = report.provider_message_id().unwrap_or_default(),
                        error = %e,
                        "sent but failed to record processed date"
                    );
                }
            }
        } else {
            summary.failed += 1;
            self.release(token).await;
        }
    }

    /// Give a claimed goal back without sending (e.g. the email could not
    /// be composed).
    pub async fn abandon(&self, token: ClaimToken, summary: &mut RunSummary) {
        summary.failed += 1;
        self.release(token).await;
    }

    /// Record an ineligible goal.
    pub async fn record_skip(&self, exclusion: &Exclusion, date: Date, summary: &mut RunSummary) {
        summary.record_skip(exclusion.reason);

        if !exclusion.reason.marks_processed() {
            return;
        }

        if let Err(e) = self.store.mark_processed(exclusion.goal_id, date).await {
            warn!(
                goal_id = %exclusion.goal_id,
                error = %e,
                "failed to mark skipped goal processed"
            );
        }

        let record = SkipRecord {
            goal_id: exclusion.goal_id,
            date,
            reason: exclusion.reason,
            recorded_at: jiff::Timestamp::now(),
        };
        if let Err(e) = self.store.put_skip(record).await {
            warn!(goal_id = %exclusion.goal_id, error = %e, "failed to write skip record");
        }

        info!(goal_id = %exclusion.goal_id, reason = %exclusion.reason, "goal skipped");
    }

    async fn release(&self, token: ClaimToken) {
        let goal_id = token.goal_id;
        match self.claims.release(token).await {
            Ok(_) => info!(goal_id = %goal_id, "claim released, goal stays eligible"),
            // The lease expires on its own.
            Err(e) => warn!(goal_id = %goal_id, error = %e, "failed to release claim"),
        }
    }
}
