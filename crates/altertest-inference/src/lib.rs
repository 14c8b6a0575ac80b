//! altertest-inference — Inference service backends.
//!
//! Implements the `InferenceService` trait for the HTTP classification
//! endpoint and a scripted mock, plus configuration loading.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;

pub use config::{create_client, create_service, load_config, AltertestConfig, InferenceConfig};
pub use error::InferenceError;
pub use http::HttpInferenceService;
