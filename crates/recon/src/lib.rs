//! `megaverse-recon` - megaverse reconciliation engine.
//!
//! Fetches the goal grid, sweeps the square region clean, then replays one
//! creation intent per non-empty cell through the rate-limited executor.
//! Strictly sequential. Per-object failures are recorded, never fatal;
//! only a failed goal fetch aborts a run.

pub mod clear;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;

#[cfg(test)]
mod fake;

pub use engine::{ReconOptions, Reconciler};
pub use error::ReconError;
pub use model::{ClearReport, IntentRecord, ReconMeta, ReconReport, ReconSummary};
