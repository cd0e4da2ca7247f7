use std::time::Duration;

use megaverse_client::{fetch_goal, goal_from_json, ApiRequest, ClientError, MegaverseApi};
use megaverse_core::{
    DedupCache, DedupGranularity, GoalGrid, ObjectIntent, RateLimitedExecutor, RequestOutcome,
    RetryPolicy, Sleeper, ThreadSleeper,
};
use tracing::{info, warn};

use crate::clear::clear_grid;
use crate::dispatch::create_object;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::model::{ClearReport, IntentRecord, ReconMeta, ReconReport};

pub const DEFAULT_CLEAR_DELAY: Duration = Duration::from_millis(500);

/// Knobs for one reconciliation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconOptions {
    /// Pause after every clear request.
    pub clear_delay: Duration,
    /// Go straight to creation.
    pub skip_clear: bool,
    /// Route the goal fetch through the executor instead of a single attempt.
    pub retry_goal: bool,
    pub granularity: DedupGranularity,
}

impl Default for ReconOptions {
    fn default() -> Self {
        Self {
            clear_delay: DEFAULT_CLEAR_DELAY,
            skip_clear: false,
            retry_goal: false,
            granularity: DedupGranularity::default(),
        }
    }
}

/// Drives goal fetch, clear and create against one candidate's megaverse.
///
/// The dedup cache lives as long as the reconciler, so calling `create`
/// twice with the same intent sends at most one request.
pub struct Reconciler<A, S = ThreadSleeper> {
    api: A,
    executor: RateLimitedExecutor<S>,
    cache: DedupCache,
    options: ReconOptions,
}

impl<A: MegaverseApi> Reconciler<A, ThreadSleeper> {
    /// Reconciler that really sleeps between retries.
    pub fn blocking(api: A, policy: RetryPolicy, options: ReconOptions) -> Self {
        Self::new(api, policy, ThreadSleeper, options)
    }
}

impl<A: MegaverseApi, S: Sleeper> Reconciler<A, S> {
    pub fn new(api: A, policy: RetryPolicy, sleeper: S, options: ReconOptions) -> Self {
        let cache = DedupCache::new(options.granularity);
        Self {
            api,
            executor: RateLimitedExecutor::new(policy, sleeper),
            cache,
            options,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    pub fn executor(&self) -> &RateLimitedExecutor<S> {
        &self.executor
    }

    pub fn options(&self) -> &ReconOptions {
        &self.options
    }

    /// Fetch the goal grid. Any failure here ends the run.
    pub fn fetch_goal(&mut self) -> Result<GoalGrid, ReconError> {
        if !self.options.retry_goal {
            return fetch_goal(&self.api).map_err(|e| match e {
                ClientError::Network(msg) => ReconError::GoalUnreachable(msg),
                other => ReconError::GoalFetch(other),
            });
        }

        let api = &self.api;
        let request = ApiRequest::goal(api.candidate_id());
        match self.executor.execute(&request.label(), || api.send(&request)) {
            RequestOutcome::Success(body) => goal_from_json(body).map_err(ReconError::GoalFetch),
            RequestOutcome::RateLimited { attempts, .. } => {
                Err(ReconError::GoalFetch(ClientError::RateLimited { attempts }))
            }
            RequestOutcome::PermanentFailure { status, body } => {
                Err(ReconError::GoalFetch(ClientError::Http(status, body)))
            }
            RequestOutcome::TransportFailure(msg) => Err(ReconError::GoalUnreachable(msg)),
        }
    }

    /// Sweep `[0, grid_size)²` with position deletes.
    pub fn clear(&mut self, grid_size: usize) -> ClearReport {
        clear_grid(&self.api, &mut self.executor, grid_size, self.options.clear_delay)
    }

    /// Create one object unless the cache says it already exists.
    pub fn create(&mut self, intent: &ObjectIntent) -> Result<IntentRecord, ReconError> {
        Ok(create_object(&self.api, &mut self.executor, &mut self.cache, intent)?)
    }

    /// Clear, then create every object the goal grid asks for.
    pub fn reconcile(&mut self, goal: &GoalGrid) -> Result<ReconReport, ReconError> {
        let grid_size = goal.grid_size();
        let clear = if self.options.skip_clear {
            info!("skipping clear phase");
            None
        } else {
            Some(self.clear(grid_size))
        };

        let intents = goal.intents();
        info!(intents = intents.len(), "creating objects");

        let mut records = Vec::with_capacity(intents.len());
        for intent in &intents {
            records.push(self.create(intent)?);
        }

        let summary = compute_summary(&records);
        if summary.failed > 0 {
            warn!(failed = summary.failed, "some objects were not created");
        }
        info!(
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.failed,
            "reconciliation finished"
        );

        Ok(ReconReport {
            meta: ReconMeta {
                candidate_id: self.api.candidate_id().to_string(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                grid_size,
                max_attempts: self.executor.policy().max_attempts,
                dedup: self.cache.granularity(),
            },
            clear,
            summary,
            failures: records.into_iter().filter(IntentRecord::is_failed).collect(),
        })
    }

    /// Fetch the goal, then reconcile against it.
    pub fn run(&mut self) -> Result<ReconReport, ReconError> {
        info!(candidate = self.api.candidate_id(), "fetching goal");
        let goal = self.fetch_goal()?;
        info!(rows = goal.row_count(), columns = goal.column_count(), "goal fetched");
        self.reconcile(&goal)
    }
}
