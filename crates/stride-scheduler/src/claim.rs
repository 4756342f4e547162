//! Claim coordination.
//!
//! A claim is a lease written onto the goal record by one conditional
//! update. The predicate below is the whole mutual-exclusion contract;
//! every `GoalStore` evaluates it atomically against the stored goal
//! (compare-and-set on S3, under a lock in memory). `last_processed_date`
//! is only ever advanced by [`apply_commit`] after a confirmed send, or by
//! [`apply_mark_processed`] for goals skipped for the day.

use jiff::civil::Date;
use jiff::{SignedDuration, Timestamp};
use tracing::{debug, warn};
use uuid::Uuid;

use stride_core::models::goal::{Goal, GoalClaim};

use crate::error::StoreError;
use crate::store::GoalStore;

/// Input to [`GoalStore::try_claim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub goal_id: Uuid,
    pub date: Date,
    pub run_id: Uuid,
    pub now: Timestamp,
    pub expires_at: Timestamp,
}

/// Proof that this run owns a goal for a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimToken {
    pub goal_id: Uuid,
    pub date: Date,
    pub run_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// One row affected: the lease is ours.
    Claimed(ClaimToken),
    /// Zero rows affected: processed already, or leased by another run.
    NotClaimed,
}

/// Claim predicate and write:
/// `last_processed_date IS NULL OR < date`, and no live lease.
pub fn apply_claim(goal: &mut Goal, request: &ClaimRequest) -> bool {
    if goal.processed_on_or_after(request.date) {
        return false;
    }
    if goal.claim.as_ref().is_some_and(|c| c.is_live(request.now)) {
        return false;
    }
    goal.claim = Some(GoalClaim {
        date: request.date,
        run_id: request.run_id,
        expires_at: request.expires_at,
    });
    true
}

/// Drop the lease if `token` still holds it. Never touches the processed date.
pub fn apply_release(goal: &mut Goal, token: &ClaimToken) -> bool {
    if goal.claim.as_ref().is_some_and(|c| c.run_id == token.run_id) {
        goal.claim = None;
        return true;
    }
    false
}

/// Record a confirmed send: advance the processed date and drop our lease.
pub fn apply_commit(goal: &mut Goal, token: &ClaimToken) -> bool {
    let mut changed = apply_release(goal, token);
    if !goal.processed_on_or_after(token.date) {
        goal.last_processed_date = Some(token.date);
        changed = true;
    }
    changed
}

/// Close a skipped goal out for `date` without a lease.
pub fn apply_mark_processed(goal: &mut Goal, date: Date) -> bool {
    if goal.processed_on_or_after(date) {
        return false;
    }
    goal.last_processed_date = Some(date);
    true
}

/// Result of a claim attempt from the pipeline's point of view.
#[derive(Debug)]
pub enum ClaimAttempt {
    Claimed(ClaimToken),
    Lost,
    Failed(StoreError),
}

/// Issues claims for one run.
pub struct ClaimCoordinator<'a> {
    store: &'a dyn GoalStore,
    run_id: Uuid,
    lease: SignedDuration,
}

impl<'a> ClaimCoordinator<'a> {
    pub fn new(store: &'a dyn GoalStore, run_id: Uuid, lease: SignedDuration) -> Self {
        Self {
            store,
            run_id,
            lease,
        }
    }

    /// Try to take exclusive ownership of `goal_id` for `date`.
    ///
    /// A store error is a failed claim: the goal is left for a later run.
    pub async fn try_claim(&self, goal_id: Uuid, date: Date, now: Timestamp) -> ClaimAttempt {
        let request = ClaimRequest {
            goal_id,
            date,
            run_id: self.run_id,
            now,
            expires_at: now.checked_add(self.lease).unwrap_or(Timestamp::MAX),
        };

        match self.store.try_claim(request).await {
            Ok(ClaimOutcome::Claimed(token)) => {
                debug!(goal_id = %goal_id, %date, "goal claimed");
                ClaimAttempt::Claimed(token)
            }
            Ok(ClaimOutcome::NotClaimed) => {
                debug!(goal_id = %goal_id, %date, "goal already claimed or processed");
                ClaimAttempt::Lost
            }
            Err(e) => {
                warn!(goal_id = %goal_id, error = %e, "claim failed, leaving goal for a later run");
                ClaimAttempt::Failed(e)
            }
        }
    }

    /// Give the goal back so a later run can retry it.
    pub async fn release(&self, token: ClaimToken) -> Result<bool, StoreError> {
        self.store.release_claim(token).await
    }

    /// Make the day's touch durable.
    pub async fn commit(&self, token: ClaimToken) -> Result<bool, StoreError> {
        self.store.commit_claim(token).await
    }
}
