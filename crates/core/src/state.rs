//! Per-intent lifecycle.
//!
//! ```text
//! Pending --CacheHit--> Skipped
//! Pending --Dispatch--> Dispatched --Confirmed--> Succeeded
//!                                  --Rejected---> Failed
//! ```
//!
//! Skipped, Succeeded and Failed are terminal for the rest of the run.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentState {
    Pending,
    Dispatched,
    Skipped,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentEvent {
    /// Dedup cache already holds the intent's key.
    CacheHit,
    /// Handed to the rate-limited executor.
    Dispatch,
    /// Executor returned Success.
    Confirmed,
    /// Executor returned any terminal failure.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: IntentState,
    pub event: IntentEvent,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal intent transition: {:?} on {:?}", self.event, self.from)
    }
}

impl std::error::Error for TransitionError {}

impl IntentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Skipped | Self::Succeeded | Self::Failed)
    }

    pub fn apply(self, event: IntentEvent) -> Result<Self, TransitionError> {
        match (self, event) {
            (Self::Pending, IntentEvent::CacheHit) => Ok(Self::Skipped),
            (Self::Pending, IntentEvent::Dispatch) => Ok(Self::Dispatched),
            (Self::Dispatched, IntentEvent::Confirmed) => Ok(Self::Succeeded),
            (Self::Dispatched, IntentEvent::Rejected) => Ok(Self::Failed),
            (from, event) => Err(TransitionError { from, event }),
        }
    }
}

impl fmt::Display for IntentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Dispatched => write!(f, "dispatched"),
            Self::Skipped => write!(f, "skipped"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
