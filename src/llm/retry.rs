// src/llm/retry.rs

use crate::llm::{ChatModel, ChatRequest, LlmError};
use rand::Rng;
use std::time::Duration;

/// Blocks the caller between attempts. Swappable so tests can record delays.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// `2^attempt` seconds plus up to one second of jitter. `attempt` is zero-based.
    pub fn delay(&self, attempt: u32) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
        Duration::from_secs(1u64 << attempt.min(32)) + Duration::from_secs_f64(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_LLM_ATTEMPTS)
    }
}

/// Wraps a [`ChatModel`] with bounded retries on transient provider errors.
pub struct RetryingModel<M, S = ThreadSleeper> {
    inner: M,
    policy: RetryPolicy,
    sleeper: S,
}

impl<M: ChatModel> RetryingModel<M> {
    pub fn new(inner: M, policy: RetryPolicy) -> Self {
        Self::with_sleeper(inner, policy, ThreadSleeper)
    }
}

impl<M: ChatModel, S: Sleeper> RetryingModel<M, S> {
    pub fn with_sleeper(inner: M, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }
}

impl<M: ChatModel, S: Sleeper> ChatModel for RetryingModel<M, S> {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let max = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            match self.inner.complete(request) {
                Ok(content) => {
                    if attempt > 0 {
                        log::info!("LLM call succeeded on attempt {}/{}", attempt + 1, max);
                    }
                    return Ok(content);
                }
                Err(err) if err.is_retryable() && attempt + 1 < max => {
                    let delay = self.policy.delay(attempt);
                    log::warn!(
                        "LLM API error (attempt {}/{}): {}. Retrying in {:.2}s...",
                        attempt + 1,
                        max,
                        err,
                        delay.as_secs_f64()
                    );
                    self.sleeper.sleep(delay);
                    attempt += 1;
                }
                Err(err) => {
                    log::error!("LLM API failed after {} attempts: {}", attempt + 1, err);
                    return Err(err);
                }
            }
        }
    }
}
