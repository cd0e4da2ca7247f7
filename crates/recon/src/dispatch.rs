//! Object creator.
//!
//! Walks one intent through its lifecycle: dedup lookup, dispatch through
//! the executor, then Succeeded or Failed. The cache is only written after
//! a confirmed 200, so a failed create can be retried by a later run.

use megaverse_client::{ApiRequest, MegaverseApi};
use megaverse_core::{
    DedupCache, IntentEvent, IntentState, ObjectIntent, RateLimitedExecutor, Sleeper,
    TransitionError,
};
use tracing::{debug, info, warn};

use crate::model::IntentRecord;

pub fn create_object<A, S>(
    api: &A,
    executor: &mut RateLimitedExecutor<S>,
    cache: &mut DedupCache,
    intent: &ObjectIntent,
) -> Result<IntentRecord, TransitionError>
where
    A: MegaverseApi + ?Sized,
    S: Sleeper,
{
    let state = IntentState::Pending;

    if cache.contains(intent) {
        let state = state.apply(IntentEvent::CacheHit)?;
        info!(intent = %intent.label(), "already created this run, skipping");
        return Ok(IntentRecord {
            intent: *intent,
            state,
            status: None,
            error: None,
        });
    }

    let state = state.apply(IntentEvent::Dispatch)?;
    let request = ApiRequest::create(intent, api.candidate_id());
    let outcome = executor.execute(&request.label(), || api.send(&request));
    let status = outcome.status();

    if outcome.is_success() {
        cache.mark(intent);
        let state = state.apply(IntentEvent::Confirmed)?;
        debug!(intent = %intent.label(), "created");
        return Ok(IntentRecord {
            intent: *intent,
            state,
            status,
            error: None,
        });
    }

    let state = state.apply(IntentEvent::Rejected)?;
    warn!(intent = %intent.label(), outcome = %outcome, "create failed");
    Ok(IntentRecord {
        intent: *intent,
        state,
        status,
        error: Some(outcome.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeApi, RecordingSleeper};
    use megaverse_client::Method;
    use megaverse_core::{
        AstralObject, ComethDirection, DedupGranularity, RawResponse, RetryPolicy, SoloonColor,
    };
    use serde_json::json;

    fn exec() -> RateLimitedExecutor<RecordingSleeper> {
        RateLimitedExecutor::new(RetryPolicy::default(), RecordingSleeper::default())
    }

    #[test]
    fn test_polyanet_scenario() {
        let api = FakeApi::new("cand");
        let mut cache = DedupCache::default();
        let intent = ObjectIntent::new(2, 3, AstralObject::Polyanet);

        let record = create_object(&api, &mut exec(), &mut cache, &intent).unwrap();

        assert_eq!(record.state, IntentState::Succeeded);
        assert_eq!(record.status, Some(200));
        let calls = api.calls_to(Method::Post, "polyanets");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, Some(json!({ "candidateId": "cand", "row": 2, "column": 3 })));
    }

    #[test]
    fn test_soloon_and_cometh_endpoints() {
        let api = FakeApi::new("cand");
        let mut cache = DedupCache::default();
        let mut ex = exec();

        let soloon = ObjectIntent::new(1, 1, AstralObject::Soloon { color: SoloonColor::Blue });
        let cometh = ObjectIntent::new(0, 4, AstralObject::Cometh { direction: ComethDirection::Up });
        create_object(&api, &mut ex, &mut cache, &soloon).unwrap();
        create_object(&api, &mut ex, &mut cache, &cometh).unwrap();

        let soloons = api.calls_to(Method::Post, "soloons");
        assert_eq!(soloons.len(), 1);
        assert_eq!(
            soloons[0].body,
            Some(json!({ "candidateId": "cand", "row": 1, "column": 1, "color": "blue" }))
        );
        let comeths = api.calls_to(Method::Post, "comeths");
        assert_eq!(comeths.len(), 1);
        assert_eq!(
            comeths[0].body,
            Some(json!({ "candidateId": "cand", "row": 0, "column": 4, "direction": "up" }))
        );
    }

    #[test]
    fn test_second_create_is_cache_hit() {
        let api = FakeApi::new("cand");
        let mut cache = DedupCache::default();
        let mut ex = exec();
        let intent = ObjectIntent::new(5, 5, AstralObject::Polyanet);

        let first = create_object(&api, &mut ex, &mut cache, &intent).unwrap();
        let second = create_object(&api, &mut ex, &mut cache, &intent).unwrap();

        assert_eq!(first.state, IntentState::Succeeded);
        assert_eq!(second.state, IntentState::Skipped);
        assert_eq!(second.status, None);
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn test_failure_does_not_mark_cache() {
        let api = FakeApi::new("cand");
        api.script(
            Method::Post,
            "polyanets",
            vec![RawResponse::new(500, "boom"), RawResponse::new(200, "{}")],
        );
        let mut cache = DedupCache::default();
        let mut ex = exec();
        let intent = ObjectIntent::new(0, 0, AstralObject::Polyanet);

        let failed = create_object(&api, &mut ex, &mut cache, &intent).unwrap();
        assert_eq!(failed.state, IntentState::Failed);
        assert_eq!(failed.status, Some(500));
        assert_eq!(failed.error.as_deref(), Some("HTTP 500: boom"));
        assert!(cache.is_empty());

        // Not cached, so a later attempt goes out again.
        let retried = create_object(&api, &mut ex, &mut cache, &intent).unwrap();
        assert_eq!(retried.state, IntentState::Succeeded);
        assert_eq!(api.calls().len(), 2);
    }

    #[test]
    fn test_rate_limit_exhaustion_is_failure() {
        let api = FakeApi::new("cand");
        api.script(Method::Post, "soloons", vec![RawResponse::new(429, "")]);
        let mut cache = DedupCache::default();
        let mut ex = exec();
        let intent = ObjectIntent::new(0, 0, AstralObject::Soloon { color: SoloonColor::Red });

        let record = create_object(&api, &mut ex, &mut cache, &intent).unwrap();
        assert_eq!(record.state, IntentState::Failed);
        assert_eq!(record.status, Some(429));
        assert_eq!(api.calls().len(), 5);
        assert!(!cache.contains(&intent));
    }

    #[test]
    fn test_coordinate_granularity_skips_other_colors() {
        let api = FakeApi::new("cand");
        let mut cache = DedupCache::new(DedupGranularity::Coordinates);
        let mut ex = exec();
        let red = ObjectIntent::new(1, 1, AstralObject::Soloon { color: SoloonColor::Red });
        let blue = ObjectIntent::new(1, 1, AstralObject::Soloon { color: SoloonColor::Blue });

        create_object(&api, &mut ex, &mut cache, &red).unwrap();
        let record = create_object(&api, &mut ex, &mut cache, &blue).unwrap();
        assert_eq!(record.state, IntentState::Skipped);
        assert_eq!(api.calls().len(), 1);
    }
}
