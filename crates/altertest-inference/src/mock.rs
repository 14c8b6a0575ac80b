//! Mock inference service for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use altertest_core::traits::InferenceService;

use crate::error::InferenceError;

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text as the service output.
    Output(String),
    /// Fail with a network error carrying this message.
    Fail(String),
}

/// A mock inference service that replays scripted replies without network calls.
///
/// Replies are consumed in order; once the script runs out, the fallback reply
/// is returned for every call.
pub struct MockService {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    call_count: AtomicU32,
    last_input: Mutex<Option<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockService {
    /// Create a mock that replays `script`, then falls back to `fallback`.
    pub fn new(script: Vec<MockReply>, fallback: MockReply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            call_count: AtomicU32::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same output.
    pub fn with_fixed_output(output: &str) -> Self {
        Self::new(Vec::new(), MockReply::Output(output.to_string()))
    }

    /// Create a mock whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self::new(Vec::new(), MockReply::Fail(message.to_string()))
    }

    /// Get the number of calls made to this service.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last input sent to this service.
    pub fn last_input(&self) -> Option<String> {
        lock(&self.last_input).clone()
    }
}

#[async_trait]
impl InferenceService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn infer(&self, input: &str) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *lock(&self.last_input) = Some(input.to_string());

        let reply = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            MockReply::Output(text) => Ok(text),
            MockReply::Fail(message) => Err(InferenceError::Network(message).into()),
        }
    }
}
