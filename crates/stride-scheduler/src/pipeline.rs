use std::collections::HashMap;
use std::sync::Arc;

use jiff::civil::Date;
use jiff::Timestamp;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use stride_core::models::profile::{Profile, SubscriptionStatus};
use stride_core::models::run::RunSummary;
use stride_core::schedule;

use crate::claim::{ClaimAttempt, ClaimCoordinator};
use crate::config::SchedulerConfig;
use crate::content::{ContentGenerator, ContentProvider, ContentSource};
use crate::delivery::{self, Deliverer, EmailProvider, Sleeper};
use crate::eligibility::{self, Candidate, GoalSnapshot};
use crate::error::PipelineError;
use crate::outcome::OutcomeRecorder;
use crate::store::GoalStore;

/// Collaborator handles for one invocation.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn GoalStore>,
    pub content: Arc<dyn ContentProvider>,
    pub email: Arc<dyn EmailProvider>,
    pub sleeper: Arc<dyn Sleeper>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Bypass the delivery window check (manual and test runs).
    pub force: bool,
}

/// One time-triggered run over every goal.
///
/// Goals are handled one at a time; a goal's failure is recorded and the
/// run moves on. Only failing to load the goal set or account records
/// aborts the run.
pub async fn run_daily(
    ctx: &Collaborators,
    config: &SchedulerConfig,
    now: Timestamp,
    options: RunOptions,
) -> Result<RunSummary, PipelineError> {
    let run_id = Uuid::new_v4();
    let today = schedule::schedule_date(now, &config.timezone);
    let span = info_span!("daily_run", run_id = %run_id, date = %today);

    run_inner(ctx, config, now, today, run_id, options)
        .instrument(span)
        .await
}

async fn run_inner(
    ctx: &Collaborators,
    config: &SchedulerConfig,
    now: Timestamp,
    today: Date,
    run_id: Uuid,
    options: RunOptions,
) -> Result<RunSummary, PipelineError> {
    let mut summary = RunSummary::new(run_id, today, now, options.force);

    if !options.force && !config.delivery_window.is_open(now, &config.timezone) {
        summary.outside_window = true;
        summary.finished_at = Some(Timestamp::now());
        info!(window = %config.delivery_window, "outside delivery window, nothing to do");
        return Ok(summary);
    }

    let store = ctx.store.as_ref();
    let snapshots = load_snapshots(store).await?;
    summary.candidates = snapshots.len() as u32;

    let report = eligibility::filter(snapshots, today, now);
    summary.eligible = report.eligible.len() as u32;
    info!(
        candidates = summary.candidates,
        eligible = summary.eligible,
        excluded = report.excluded.len(),
        "eligibility evaluated"
    );

    let claims = ClaimCoordinator::new(store, run_id, config.claim_lease);
    let recorder = OutcomeRecorder::new(store, &claims);
    let generator = ContentGenerator::new(store, ctx.content.as_ref(), &config.model_ids);
    let deliverer = Deliverer::new(
        store,
        ctx.email.as_ref(),
        ctx.sleeper.as_ref(),
        config.retry,
    );

    for exclusion in &report.excluded {
        recorder.record_skip(exclusion, today, &mut summary).await;
    }

    let stages = Stages {
        claims: &claims,
        recorder: &recorder,
        generator: &generator,
        deliverer: &deliverer,
        app_url: config.app_url.as_deref(),
    };
    for candidate in &report.eligible {
        let span = info_span!("goal", goal_id = %candidate.goal.id);
        process_goal(&stages, candidate, today, now, &mut summary)
            .instrument(span)
            .await;
    }

    summary.finished_at = Some(Timestamp::now());
    if let Err(e) = store.put_run_summary(summary.clone()).await {
        warn!(error = %e, "failed to persist run summary");
    }

    info!(
        sent = summary.sent,
        failed = summary.failed,
        claim_lost = summary.claim_lost,
        claim_errors = summary.claim_errors,
        commit_errors = summary.commit_errors,
        content_reused = summary.content_reused,
        content_generated = summary.content_generated,
        content_fallback = summary.content_fallback,
        "daily run complete"
    );

    Ok(summary)
}

struct Stages<'a> {
    claims: &'a ClaimCoordinator<'a>,
    recorder: &'a OutcomeRecorder<'a>,
    generator: &'a ContentGenerator<'a>,
    deliverer: &'a Deliverer<'a>,
    app_url: Option<&'a str>,
}

async fn process_goal(
    stages: &Stages<'_>,
    candidate: &Candidate,
    today: Date,
    now: Timestamp,
    summary: &mut RunSummary,
) {
    let goal = &candidate.goal;

    let token = match stages.claims.try_claim(goal.id, today, now).await {
        ClaimAttempt::Claimed(token) => token,
        ClaimAttempt::Lost => {
            summary.claim_lost += 1;
            return;
        }
        ClaimAttempt::Failed(_) => {
            summary.claim_errors += 1;
            return;
        }
    };

    let prepared = stages.generator.prepare(goal, today, now).await;
    match prepared.source {
        ContentSource::Reused => summary.content_reused += 1,
        ContentSource::Generated { .. } => summary.content_generated += 1,
        ContentSource::Fallback => summary.content_fallback += 1,
    }

    let composed = delivery::compose_email(
        goal,
        &candidate.profile,
        &prepared.content,
        stages.app_url,
    );
    let email = match composed {
        Ok(email) => email,
        Err(e) => {
            warn!(error = %e, "could not compose email");
            stages.recorder.abandon(token, summary).await;
            return;
        }
    };

    let report = stages.deliverer.send(goal, today, &email).await;
    stages.recorder.record_delivery(token, &report, summary).await;
}

/// Load every goal with its account records, one lookup per user.
async fn load_snapshots(store: &dyn GoalStore) -> Result<Vec<GoalSnapshot>, PipelineError> {
    let goals = store.list_goals().await.map_err(PipelineError::ListGoals)?;

    let mut accounts: HashMap<Uuid, (Option<Profile>, Option<SubscriptionStatus>)> =
        HashMap::new();
    for goal in &goals {
        if accounts.contains_key(&goal.user_id) {
            continue;
        }
        let profile = store
            .get_profile(goal.user_id)
            .await
            .map_err(|source| PipelineError::LoadAccount {
                user_id: goal.user_id,
                source,
            })?;
        let subscription = store
            .get_subscription(goal.user_id)
            .await
            .map_err(|source| PipelineError::LoadAccount {
                user_id: goal.user_id,
                source,
            })?;
        accounts.insert(goal.user_id, (profile, subscription));
    }

    Ok(goals
        .into_iter()
        .map(|goal| {
            let (profile, subscription) = accounts.get(&goal.user_id).cloned().unwrap_or_default();
            GoalSnapshot {
                goal,
                profile,
                subscription,
            }
        })
        .collect())
}
