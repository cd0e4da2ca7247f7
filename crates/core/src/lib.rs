//! `megaverse-core` - domain types for megaverse reconciliation.
//!
//! Pure crate: decodes goal cells into intents, keys them for dedup, and
//! drives a single logical request through the rate-limit retry loop.
//! No HTTP or filesystem dependencies; transports plug in via closures.

pub mod cell;
pub mod dedup;
pub mod grid;
pub mod intent;
pub mod retry;
pub mod state;

pub use cell::{parse_cell, CellCode, ComethDirection, SoloonColor};
pub use dedup::{DedupCache, DedupGranularity, DedupKey};
pub use grid::{clear_region, GoalGrid};
pub use intent::{AstralObject, ClearIntent, ObjectIntent, ObjectKind};
pub use retry::{
    backoff_delay, next_step, parse_retry_after, RateLimitedExecutor, RawResponse,
    RequestOutcome, RetryPolicy, Sleeper, Step, ThreadSleeper,
};
pub use state::{IntentEvent, IntentState, TransitionError};
