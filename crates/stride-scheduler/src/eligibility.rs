//! Which goals are due for a daily touch.
//!
//! Pure: the pipeline loads goals and account snapshots, this module only
//! judges them against a scheduling date and an instant.

use jiff::civil::Date;
use jiff::Timestamp;
use uuid::Uuid;

use stride_core::models::goal::Goal;
use stride_core::models::profile::{Profile, SubscriptionStatus};
use stride_core::models::skip::SkipReason;

/// A goal together with the account records gating it.
#[derive(Debug, Clone)]
pub struct GoalSnapshot {
    pub goal: Goal,
    pub profile: Option<Profile>,
    pub subscription: Option<SubscriptionStatus>,
}

/// A goal that passed every check, with its resolved profile.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub goal: Goal,
    pub profile: Profile,
    pub is_paying: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct EligibilityReport {
    pub eligible: Vec<Candidate>,
    pub excluded: Vec<Exclusion>,
}

impl EligibilityReport {
    pub fn reason_for(&self, goal_id: Uuid) -> Option<SkipReason> {
        self.excluded
            .iter()
            .find(|e| e.goal_id == goal_id)
            .map(|e| e.reason)
    }
}

/// Judge one goal. Checks run in a fixed order so every goal gets exactly
/// one reason: inactive, already processed, no profile, goal expired,
/// trial expired.
pub fn evaluate(snapshot: &GoalSnapshot, today: Date, now: Timestamp) -> Result<(), SkipReason> {
    let goal = &snapshot.goal;

    if !goal.active {
        return Err(SkipReason::Inactive);
    }
    if goal.processed_on_or_after(today) {
        return Err(SkipReason::AlreadyProcessed);
    }
    let Some(profile) = &snapshot.profile else {
        return Err(SkipReason::NoProfile);
    };
    if goal.target_date.is_some_and(|target| target < today) {
        return Err(SkipReason::GoalExpired);
    }
    let is_paying = snapshot.subscription.as_ref().is_some_and(|s| s.is_paying);
    if !is_paying && profile.trial_expired(now) {
        return Err(SkipReason::TrialExpired);
    }
    Ok(())
}

/// Split goals into today's candidates and reasoned exclusions.
pub fn filter(snapshots: Vec<GoalSnapshot>, today: Date, now: Timestamp) -> EligibilityReport {
    let mut report = EligibilityReport::default();

    for snapshot in snapshots {
        match evaluate(&snapshot, today, now) {
            Ok(()) => {
                let is_paying = snapshot.subscription.as_ref().is_some_and(|s| s.is_paying);
                // evaluate() rejects missing profiles.
                if let Some(profile) = snapshot.profile {
                    report.eligible.push(Candidate {
                        goal: snapshot.goal,
                        profile,
                        is_paying,
                    });
                }
            }
            Err(reason) => report.excluded.push(Exclusion {
                goal_id: snapshot.goal.id,
                user_id: snapshot.goal.user_id,
                reason,
            }),
        }
    }

    report
}
