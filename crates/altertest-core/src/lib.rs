//! altertest-core — Trial sampling, session state machine, and scoring.
//!
//! This crate defines the data model, the corpus and inference traits, and
//! the session logic that the rest of altertest builds on.

pub mod corpus;
pub mod engine;
pub mod error;
pub mod inference;
pub mod model;
pub mod parser;
pub mod registry;
pub mod report;
pub mod sampler;
pub mod scoring;
pub mod session;
pub mod traits;
