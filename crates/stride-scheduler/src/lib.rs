//! stride-scheduler
//!
//! The daily delivery pipeline: eligibility, atomic claims, content
//! generation with fallback, retried delivery and outcome recording.
//!
//! Public API:
//! - `pipeline::run_daily()`: one time-triggered run over every goal
//! - `store::GoalStore`, `content::ContentProvider`, `delivery::EmailProvider`:
//!   the collaborator seams, with S3/Bedrock/Resend and in-memory adapters
//! - `config::SchedulerConfig`: environment-driven configuration

pub mod claim;
pub mod config;
pub mod content;
pub mod delivery;
pub mod eligibility;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod providers;
pub mod store;

pub use crate::config::SchedulerConfig;
pub use crate::error::{PipelineError, StoreError};
pub use crate::pipeline::{run_daily, Collaborators, RunOptions};

use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
