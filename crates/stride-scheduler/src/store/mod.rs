//! The durable side of the pipeline.
//!
//! `GoalStore` is the seam between the coordination logic and whatever
//! database backs it. Claim operations must evaluate the predicates in
//! [`crate::claim`] atomically; everything else is keyed read/upsert.

pub mod cas;
pub mod memory;
pub mod s3;

use jiff::civil::Date;
use uuid::Uuid;

use stride_core::models::content::DailyContent;
use stride_core::models::delivery::DeliveryOutcome;
use stride_core::models::goal::Goal;
use stride_core::models::profile::{Profile, SubscriptionStatus};
use stride_core::models::run::RunSummary;
use stride_core::models::skip::SkipRecord;

use crate::claim::{ClaimOutcome, ClaimRequest, ClaimToken};
use crate::error::StoreError;
use crate::BoxFuture;

pub use memory::MemoryGoalStore;
pub use s3::S3GoalStore;

pub trait GoalStore: Send + Sync {
    fn list_goals(&self) -> BoxFuture<'_, Result<Vec<Goal>, StoreError>>;

    fn get_profile(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<Profile>, StoreError>>;

    fn get_subscription(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<SubscriptionStatus>, StoreError>>;

    /// Atomic conditional claim. See [`crate::claim::apply_claim`].
    fn try_claim(&self, request: ClaimRequest) -> BoxFuture<'_, Result<ClaimOutcome, StoreError>>;

    /// Returns whether the stored goal changed.
    fn release_claim(&self, token: ClaimToken) -> BoxFuture<'_, Result<bool, StoreError>>;

    /// Returns whether the stored goal changed.
    fn commit_claim(&self, token: ClaimToken) -> BoxFuture<'_, Result<bool, StoreError>>;

    /// Returns whether the stored goal changed.
    fn mark_processed(&self, goal_id: Uuid, date: Date) -> BoxFuture<'_, Result<bool, StoreError>>;

    fn get_content(
        &self,
        goal_id: Uuid,
        date: Date,
    ) -> BoxFuture<'_, Result<Option<DailyContent>, StoreError>>;

    /// Upsert keyed by (goal, date).
    fn put_content(&self, content: DailyContent) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Upsert keyed by outcome id.
    fn put_outcome(&self, outcome: DeliveryOutcome) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Upsert keyed by (goal, date).
    fn put_skip(&self, skip: SkipRecord) -> BoxFuture<'_, Result<(), StoreError>>;

    fn put_run_summary(&self, summary: RunSummary) -> BoxFuture<'_, Result<(), StoreError>>;
}
