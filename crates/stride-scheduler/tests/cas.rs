mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use jiff::SignedDuration;
use uuid::Uuid;

use stride_core::models::goal::{Goal, GoalClaim};
use stride_scheduler::claim::{apply_claim, ClaimRequest};
use stride_scheduler::store::cas::{update_goal, VersionedGoals, CAS_MAX_ROUNDS};
use stride_scheduler::{BoxFuture, StoreError};
use stride_storage::error::StorageError;
use stride_storage::state::Versioned;

use common::{goal, now, today};

type Competitor = fn(&mut Goal);

/// One goal record that loses a scripted number of conditional writes.
///
/// Each forced conflict first applies `competitor` to the stored record, as
/// if another run had written between our read and our write.
struct ConflictingGoals {
    stored: Mutex<Option<Versioned<Goal>>>,
    conflicts_left: AtomicU32,
    competitor: Option<Competitor>,
    version: AtomicU32,
    loads: AtomicU32,
    saves: AtomicU32,
}

impl ConflictingGoals {
    fn new(goal: Goal, conflicts: u32) -> Self {
        Self {
            stored: Mutex::new(Some(Versioned {
                value: goal,
                etag: "v0".to_string(),
            })),
            conflicts_left: AtomicU32::new(conflicts),
            competitor: None,
            version: AtomicU32::new(0),
            loads: AtomicU32::new(0),
            saves: AtomicU32::new(0),
        }
    }

    fn empty() -> Self {
        let store = Self::new(goal(Uuid::new_v4()), 0);
        *store.stored.lock().unwrap() = None;
        store
    }

    fn with_competitor(mut self, competitor: Competitor) -> Self {
        self.competitor = Some(competitor);
        self
    }

    fn next_etag(&self) -> String {
        format!("v{}", self.version.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn current(&self) -> Goal {
        let stored = self.stored.lock().unwrap();
        stored.as_ref().map(|v| v.value.clone()).unwrap()
    }

    fn loads(&self) -> u32 {
        self.loads.load(Ordering::SeqCst)
    }

    fn saves(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }
}

impl VersionedGoals for ConflictingGoals {
    fn load(&self, goal_id: Uuid) -> BoxFuture<'_, Result<Versioned<Goal>, StorageError>> {
        Box::pin(async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.stored
                .lock()
                .unwrap()
                .clone()
                .ok_or(StorageError::NotFound {
                    key: format!("goals/{goal_id}.json"),
                })
        })
    }

    fn save_if_match<'a>(
        &'a self,
        goal: &'a Goal,
        etag: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            self.saves.fetch_add(1, Ordering::SeqCst);
            let precondition_failed = StorageError::PreconditionFailed {
                key: format!("goals/{}.json", goal.id),
            };
            let forced = self
                .conflicts_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();

            let mut stored = self.stored.lock().unwrap();
            let Some(current) = stored.as_mut() else {
                return Err(precondition_failed);
            };
            if forced {
                if let Some(competitor) = self.competitor {
                    competitor(&mut current.value);
                }
                current.etag = self.next_etag();
                return Err(precondition_failed);
            }
            if current.etag != etag {
                return Err(precondition_failed);
            }
            current.value = goal.clone();
            current.etag = self.next_etag();
            Ok(current.etag.clone())
        })
    }
}

fn claim_request(goal_id: Uuid) -> ClaimRequest {
    ClaimRequest {
        goal_id,
        date: today(),
        run_id: Uuid::new_v4(),
        now: now(),
        expires_at: now() + SignedDuration::from_mins(15),
    }
}

fn competing_claim(goal: &mut Goal) {
    goal.claim = Some(GoalClaim {
        date: today(),
        run_id: Uuid::new_v4(),
        expires_at: now() + SignedDuration::from_mins(15),
    });
}

fn competing_commit(goal: &mut Goal) {
    goal.claim = None;
    goal.last_processed_date = Some(today());
}

#[tokio::test]
async fn writes_on_first_round_without_conflict() {
    let g = goal(Uuid::new_v4());
    let store = ConflictingGoals::new(g.clone(), 0);
    let request = claim_request(g.id);

    let written = update_goal(&store, g.id, |goal| apply_claim(goal, &request))
        .await
        .unwrap();

    assert!(written);
    assert_eq!((store.loads(), store.saves()), (1, 1));
    let claim = store.current().claim.unwrap();
    assert_eq!(claim.run_id, request.run_id);
}

#[tokio::test]
async fn precondition_failure_rereads_and_retries() {
    let g = goal(Uuid::new_v4());
    let store = ConflictingGoals::new(g.clone(), 2);
    let request = claim_request(g.id);

    let written = update_goal(&store, g.id, |goal| apply_claim(goal, &request))
        .await
        .unwrap();

    assert!(written);
    // Two lost races, then the third read wins.
    assert_eq!((store.loads(), store.saves()), (3, 3));
    assert_eq!(store.current().claim.map(|c| c.run_id), Some(request.run_id));
}

#[tokio::test]
async fn competing_claim_makes_the_reread_refuse() {
    let g = goal(Uuid::new_v4());
    let store = ConflictingGoals::new(g.clone(), 1).with_competitor(competing_claim);
    let request = claim_request(g.id);

    let written = update_goal(&store, g.id, |goal| apply_claim(goal, &request))
        .await
        .unwrap();

    assert!(!written);
    assert_eq!((store.loads(), store.saves()), (2, 1));
    let winner = store.current().claim.unwrap();
    assert_ne!(winner.run_id, request.run_id);
}

#[tokio::test]
async fn competing_commit_makes_the_reread_refuse() {
    let g = goal(Uuid::new_v4());
    let store = ConflictingGoals::new(g.clone(), 1).with_competitor(competing_commit);
    let request = claim_request(g.id);

    let written = update_goal(&store, g.id, |goal| apply_claim(goal, &request))
        .await
        .unwrap();

    assert!(!written);
    let current = store.current();
    assert_eq!(current.last_processed_date, Some(today()));
    assert!(current.claim.is_none());
}

#[tokio::test]
async fn endless_conflicts_end_in_contention() {
    let g = goal(Uuid::new_v4());
    let store = ConflictingGoals::new(g.clone(), u32::MAX);
    let request = claim_request(g.id);

    let result = update_goal(&store, g.id, |goal| apply_claim(goal, &request)).await;

    match result {
        Err(StoreError::Contention { goal_id, rounds }) => {
            assert_eq!(goal_id, g.id);
            assert_eq!(rounds, CAS_MAX_ROUNDS);
        }
        other => panic!("expected contention, got {other:?}"),
    }
    assert_eq!((store.loads(), store.saves()), (CAS_MAX_ROUNDS, CAS_MAX_ROUNDS));
    assert!(store.current().claim.is_none());
}

#[tokio::test]
async fn missing_goal_is_reported_by_id() {
    let store = ConflictingGoals::empty();
    let goal_id = Uuid::new_v4();

    let result = update_goal(&store, goal_id, |_| true).await;

    assert!(matches!(result, Err(StoreError::GoalNotFound(id)) if id == goal_id));
    assert_eq!(store.saves(), 0);
}

#[tokio::test]
async fn refused_predicate_writes_nothing() {
    let mut g = goal(Uuid::new_v4());
    g.last_processed_date = Some(today());
    let store = ConflictingGoals::new(g.clone(), 0);
    let request = claim_request(g.id);

    let written = update_goal(&store, g.id, |goal| apply_claim(goal, &request))
        .await
        .unwrap();

    assert!(!written);
    assert_eq!(store.saves(), 0);
    assert_eq!(store.current(), g);
}
