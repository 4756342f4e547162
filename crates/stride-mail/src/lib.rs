//! stride-mail
//!
//! Email rendering (Tera) and delivery through the Resend HTTP API.
//! One call here is one attempt; retry policy lives with the caller.

pub mod error;
pub mod render;
pub mod resend;
