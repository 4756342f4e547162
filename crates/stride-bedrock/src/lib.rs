//! stride-bedrock
//!
//! Daily content generation through the Bedrock Converse API, with
//! structured output parsing and validation.

pub mod client;
pub mod error;
pub mod generate;
pub mod prompt;
pub mod tokens;
