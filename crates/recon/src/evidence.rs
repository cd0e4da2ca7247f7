use megaverse_core::IntentState;

use crate::model::{IntentRecord, ReconSummary};

/// Compute summary counts from per-intent records.
pub fn compute_summary(records: &[IntentRecord]) -> ReconSummary {
    let mut summary = ReconSummary {
        total_intents: records.len(),
        ..ReconSummary::default()
    };

    for r in records {
        match r.state {
            IntentState::Succeeded => summary.created += 1,
            IntentState::Skipped => summary.skipped += 1,
            IntentState::Failed => summary.failed += 1,
            // Never left behind by the dispatcher.
            IntentState::Pending | IntentState::Dispatched => {}
        }
    }

    summary
}
