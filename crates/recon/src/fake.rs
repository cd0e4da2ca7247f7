//! Scripted in-memory API for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use megaverse_client::{ApiRequest, ClientError, MegaverseApi, Method};
use megaverse_core::{RawResponse, Sleeper};

/// Answers 200 `{}` unless a route has a script. A route's last scripted
/// response repeats once the script runs out.
pub(crate) struct FakeApi {
    candidate: String,
    routes: RefCell<HashMap<(Method, String), VecDeque<RawResponse>>>,
    calls: RefCell<Vec<ApiRequest>>,
}

impl FakeApi {
    pub(crate) fn new(candidate: &str) -> Self {
        Self {
            candidate: candidate.to_string(),
            routes: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn script(&self, method: Method, path: &str, responses: Vec<RawResponse>) {
        self.routes
            .borrow_mut()
            .insert((method, path.to_string()), responses.into());
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.borrow().clone()
    }

    pub(crate) fn calls_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .cloned()
            .collect()
    }
}

impl MegaverseApi for FakeApi {
    fn candidate_id(&self) -> &str {
        &self.candidate
    }

    fn send(&self, request: &ApiRequest) -> Result<RawResponse, ClientError> {
        self.calls.borrow_mut().push(request.clone());
        let mut routes = self.routes.borrow_mut();
        let response = match routes.get_mut(&(request.method, request.path.clone())) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| RawResponse::new(200, "{}")))
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSleeper {
    pub(crate) waits: Vec<Duration>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.waits.push(duration);
    }
}
