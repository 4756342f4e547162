//! stride-lambda
//!
//! Lambda entry point for the daily delivery pipeline. The library half
//! holds event parsing and collaborator wiring so both can be exercised
//! without the Lambda runtime.

pub mod event;
pub mod setup;
