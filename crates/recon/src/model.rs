use megaverse_core::{DedupGranularity, IntentState, ObjectIntent};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Clear
// ---------------------------------------------------------------------------

/// Result of sweeping a `grid_size` × `grid_size` region.
///
/// `cleared + warnings == grid_size²`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub grid_size: usize,
    /// 200, 404 or 400: cell is empty now.
    pub cleared: usize,
    /// Any other terminal outcome. Logged, not fatal.
    pub warnings: usize,
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Terminal state of one creation intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentRecord {
    pub intent: ObjectIntent,
    pub state: IntentState,
    /// Final HTTP status, when one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Failure detail for `Failed` records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntentRecord {
    pub fn is_failed(&self) -> bool {
        self.state == IntentState::Failed
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_intents: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub candidate_id: String,
    pub engine_version: String,
    pub run_at: String,
    pub grid_size: usize,
    /// `None` = uncapped.
    pub max_attempts: Option<u32>,
    pub dedup: DedupGranularity,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    /// `None` when the clear phase was skipped.
    pub clear: Option<ClearReport>,
    pub summary: ReconSummary,
    /// Failed intents only, in dispatch order.
    pub failures: Vec<IntentRecord>,
}

impl ReconReport {
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}
