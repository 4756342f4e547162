//! Optimistic read/evaluate/write over versioned goal records.
//!
//! [`update_goal`] is the loop every S3 goal mutation goes through. It only
//! needs a versioned load and a conditional save, so the loop can be
//! exercised against any [`VersionedGoals`] implementation.

use jiff::Timestamp;
use tracing::debug;
use uuid::Uuid;

use stride_core::models::goal::Goal;
use stride_storage::error::StorageError;
use stride_storage::state::Versioned;

use crate::error::StoreError;
use crate::BoxFuture;

/// Read/evaluate/write rounds before a goal update gives up.
pub const CAS_MAX_ROUNDS: u32 = 5;

/// Goal records that carry a version tag.
pub trait VersionedGoals: Send + Sync {
    /// A missing goal is `StorageError::NotFound`.
    fn load(&self, goal_id: Uuid) -> BoxFuture<'_, Result<Versioned<Goal>, StorageError>>;

    /// Write `goal` only if the stored record is still at `etag`. A lost race
    /// is `StorageError::PreconditionFailed`.
    fn save_if_match<'a>(
        &'a self,
        goal: &'a Goal,
        etag: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>>;
}

/// Apply `mutate` to the current version of a goal and write it back.
///
/// `Ok(false)` means the predicate rejected the version it saw and nothing
/// was written. A conflicting write re-reads and re-evaluates, so the
/// predicate is always judged against the version it replaces.
pub async fn update_goal<V, F>(store: &V, goal_id: Uuid, mut mutate: F) -> Result<bool, StoreError>
where
    V: VersionedGoals + ?Sized,
    F: FnMut(&mut Goal) -> bool + Send,
{
    for round in 1..=CAS_MAX_ROUNDS {
        let Versioned {
            value: mut goal,
            etag,
        } = match store.load(goal_id).await {
            Ok(loaded) => loaded,
            Err(StorageError::NotFound { .. }) => return Err(StoreError::GoalNotFound(goal_id)),
            Err(e) => return Err(e.into()),
        };

        if !mutate(&mut goal) {
            return Ok(false);
        }
        goal.updated_at = Timestamp::now();

        match store.save_if_match(&goal, &etag).await {
            Ok(_) => return Ok(true),
            Err(StorageError::PreconditionFailed { .. }) => {
                debug!(goal_id = %goal_id, round, "goal changed underneath us, re-evaluating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(StoreError::Contention {
        goal_id,
        rounds: CAS_MAX_ROUNDS,
    })
}
