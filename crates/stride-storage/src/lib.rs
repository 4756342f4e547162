//! stride-storage
//!
//! S3 operations. Thin wrapper around the AWS S3 SDK, including the
//! `If-Match` conditional writes the claim protocol is built on.

pub mod client;
pub mod error;
pub mod objects;
pub mod state;
