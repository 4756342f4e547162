//! stride-core
//!
//! Pure domain types, S3 key conventions and the scheduling calendar.
//! No AWS SDK dependency. This is the shared vocabulary of the Stride system.

pub mod error;
pub mod models;
pub mod s3_keys;
pub mod schedule;
