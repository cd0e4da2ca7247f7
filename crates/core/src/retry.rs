//! Rate-limited request execution.
//!
//! One logical request = one call to [`RateLimitedExecutor::execute`]. The
//! caller supplies a closure that performs exactly one HTTP attempt; the
//! executor decides after each attempt whether to stop or back off:
//!
//! - 200: success, done
//! - 429: wait (`Retry-After` seconds, else `min(2^attempt, max_backoff)`)
//!   and try again, unless the attempt cap is reached
//! - anything else: permanent failure, done, no retry
//! - no response at all: transport failure, done, no retry
//!
//! The decision is the pure function [`next_step`]; waiting goes through
//! [`Sleeper`] so the loop runs without wall-clock time under test.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);

const HTTP_OK: u16 = 200;
const HTTP_TOO_MANY_REQUESTS: u16 = 429;

// ── Policy ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries 429s indefinitely.
    pub max_attempts: Option<u32>,
    /// Ceiling for the computed exponential wait. Server `Retry-After`
    /// values are used as-is.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::capped(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy {
    pub fn capped(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }

    pub fn uncapped() -> Self {
        Self {
            max_attempts: None,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// True once `attempts` attempts have been made and no more are allowed.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|cap| attempts >= cap)
    }
}

/// Wait before retrying after the `attempt`-th consecutive 429 (1-based).
///
/// `2^attempt` seconds, saturating, clamped to `policy.max_backoff`:
/// 2, 4, 8, 16, 32, 60, 60, … with the default ceiling.
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(policy.max_backoff)
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

// ── Attempt result ──────────────────────────────────────────────────

/// What one HTTP attempt produced. Only `Retry-After` is kept from the headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, retry_after: None, body: body.into() }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// HTTP 200. Body parsed as JSON, or kept as a string if it is not JSON.
    Success(serde_json::Value),
    /// Still 429 when the attempt cap was reached.
    RateLimited {
        attempts: u32,
        retry_after: Option<Duration>,
    },
    /// Any status other than 200/429. Never retried.
    PermanentFailure { status: u16, body: String },
    /// No HTTP status (connect error, socket timeout). Never retried.
    TransportFailure(String),
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Final HTTP status, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success(_) => Some(HTTP_OK),
            Self::RateLimited { .. } => Some(HTTP_TOO_MANY_REQUESTS),
            Self::PermanentFailure { status, .. } => Some(*status),
            Self::TransportFailure(_) => None,
        }
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(_) => write!(f, "ok"),
            Self::RateLimited { attempts, retry_after } => {
                write!(f, "rate limited after {} attempt(s)", attempts)?;
                if let Some(wait) = retry_after {
                    write!(f, ", retry after {}s", wait.as_secs())?;
                }
                Ok(())
            }
            Self::PermanentFailure { status, body } => {
                write!(f, "HTTP {}: {}", status, truncate(body, 200))
            }
            Self::TransportFailure(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ── State machine ───────────────────────────────────────────────────

/// Decision after one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Done(RequestOutcome),
    Retry(Duration),
}

/// Decide what follows the `attempts`-th attempt (1-based).
pub fn next_step(policy: &RetryPolicy, attempts: u32, response: RawResponse) -> Step {
    match response.status {
        HTTP_OK => {
            let payload = serde_json::from_str(&response.body)
                .unwrap_or(serde_json::Value::String(response.body));
            Step::Done(RequestOutcome::Success(payload))
        }
        HTTP_TOO_MANY_REQUESTS => {
            let retry_after = response.retry_after.as_deref().and_then(parse_retry_after);
            if policy.exhausted(attempts) {
                return Step::Done(RequestOutcome::RateLimited { attempts, retry_after });
            }
            Step::Retry(retry_after.unwrap_or_else(|| backoff_delay(policy, attempts)))
        }
        status => Step::Done(RequestOutcome::PermanentFailure {
            status,
            body: response.body,
        }),
    }
}

// ── Sleeping ────────────────────────────────────────────────────────

pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &mut S {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}

// ── Executor ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RateLimitedExecutor<S = ThreadSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl RateLimitedExecutor<ThreadSleeper> {
    pub fn blocking(policy: RetryPolicy) -> Self {
        Self::new(policy, ThreadSleeper)
    }
}

impl<S: Sleeper> RateLimitedExecutor<S> {
    pub fn new(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Pacing delay outside the retry loop (e.g. between clear requests).
    pub fn pause(&mut self, duration: Duration) {
        self.sleeper.sleep(duration);
    }

    /// Run one logical request to a terminal outcome.
    ///
    /// `attempt_once` is invoked once per attempt and must perform exactly
    /// one HTTP exchange. `label` only feeds log lines.
    pub fn execute<F, E>(&mut self, label: &str, mut attempt_once: F) -> RequestOutcome
    where
        F: FnMut() -> Result<RawResponse, E>,
        E: fmt::Display,
    {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let response = match attempt_once() {
                Ok(response) => response,
                Err(e) => {
                    warn!(request = label, attempt = attempts, error = %e, "request failed without a response");
                    return RequestOutcome::TransportFailure(e.to_string());
                }
            };
            debug!(request = label, attempt = attempts, status = response.status, "response");

            match next_step(&self.policy, attempts, response) {
                Step::Done(outcome) => {
                    // Callers decide whether a terminal status is a failure
                    // (a clearer accepts 404), so only trace it here.
                    match &outcome {
                        RequestOutcome::RateLimited { attempts, .. } => {
                            debug!(request = label, attempts, "still rate limited, giving up");
                        }
                        RequestOutcome::PermanentFailure { status, body } => {
                            debug!(request = label, status, body = %truncate(body, 200), "request rejected");
                        }
                        _ => {}
                    }
                    return outcome;
                }
                Step::Retry(wait) => {
                    warn!(
                        request = label,
                        attempt = attempts,
                        wait_secs = wait.as_secs(),
                        "rate limited, backing off"
                    );
                    self.sleeper.sleep(wait);
                }
            }
        }
    }
}
