use megaverse_core::{ClearIntent, ObjectIntent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request relative to the API base, e.g. `POST polyanets {..}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path without leading slash.
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// `GET map/{candidateId}/goal`
    pub fn goal(candidate_id: &str) -> Self {
        Self {
            method: Method::Get,
            path: format!("map/{}/goal", candidate_id),
            body: None,
        }
    }

    /// `POST {endpoint}` with the intent's type-specific payload.
    pub fn create(intent: &ObjectIntent, candidate_id: &str) -> Self {
        Self {
            method: Method::Post,
            path: intent.endpoint().to_string(),
            body: Some(intent.payload(candidate_id)),
        }
    }

    /// `DELETE polyanets {candidateId, row, column}`
    pub fn clear(intent: &ClearIntent, candidate_id: &str) -> Self {
        Self {
            method: Method::Delete,
            path: intent.endpoint().to_string(),
            body: Some(intent.payload(candidate_id)),
        }
    }

    /// `POST /soloons` style label for logs.
    pub fn label(&self) -> String {
        format!("{} /{}", self.method, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaverse_core::{AstralObject, SoloonColor};
    use serde_json::json;

    #[test]
    fn test_goal_request() {
        let req = ApiRequest::goal("abc-123");
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "map/abc-123/goal");
        assert!(req.body.is_none());
        assert_eq!(req.label(), "GET /map/abc-123/goal");
    }

    #[test]
    fn test_create_request() {
        let intent = ObjectIntent::new(1, 1, AstralObject::Soloon { color: SoloonColor::Blue });
        let req = ApiRequest::create(&intent, "c");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "soloons");
        assert_eq!(
            req.body,
            Some(json!({ "candidateId": "c", "row": 1, "column": 1, "color": "blue" }))
        );
    }

    #[test]
    fn test_clear_request() {
        let req = ApiRequest::clear(&ClearIntent { row: 0, column: 7 }, "c");
        assert_eq!(req.method, Method::Delete);
        assert_eq!(req.path, "polyanets");
        assert_eq!(req.label(), "DELETE /polyanets");
    }
}
