//! Grid clearer.
//!
//! Deletes by position are only supported for Polyanets, so the sweep
//! issues `DELETE /polyanets` for every cell of the square region.

use std::time::Duration;

use megaverse_client::{ApiRequest, MegaverseApi};
use megaverse_core::{clear_region, RateLimitedExecutor, RequestOutcome, Sleeper};
use tracing::{info, warn};

use crate::model::ClearReport;

/// Final statuses meaning "cell is empty now".
pub const CLEARED_STATUSES: [u16; 3] = [200, 404, 400];

pub fn is_cleared(outcome: &RequestOutcome) -> bool {
    match outcome {
        RequestOutcome::Success(_) => true,
        RequestOutcome::PermanentFailure { status, .. } => CLEARED_STATUSES.contains(status),
        RequestOutcome::RateLimited { .. } | RequestOutcome::TransportFailure(_) => false,
    }
}

/// Sweep `[0, grid_size)²` row-major, pausing `delay` after every delete.
pub fn clear_grid<A, S>(
    api: &A,
    executor: &mut RateLimitedExecutor<S>,
    grid_size: usize,
    delay: Duration,
) -> ClearReport
where
    A: MegaverseApi + ?Sized,
    S: Sleeper,
{
    info!(grid_size, "clearing grid");
    let mut report = ClearReport {
        grid_size,
        ..ClearReport::default()
    };

    for cell in clear_region(grid_size) {
        let request = ApiRequest::clear(&cell, api.candidate_id());
        let outcome = executor.execute(&request.label(), || api.send(&request));

        if is_cleared(&outcome) {
            report.cleared += 1;
        } else {
            warn!(row = cell.row, column = cell.column, outcome = %outcome, "cell not cleared");
            report.warnings += 1;
        }

        executor.pause(delay);
    }

    info!(cleared = report.cleared, warnings = report.warnings, "clear finished");
    report
}
