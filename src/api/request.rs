use reqwest::Method;
use serde_json::Value;

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body at all.
    Empty,
    /// A structured payload, serialized when sent.
    Json(Value),
    /// Text forwarded exactly as given. Never parsed or re-encoded.
    Raw(String),
}

/// A fully-resolved request against the panel, independent of the base URL.
///
/// Path segments are kept separate so that user-supplied ids always land in
/// exactly one segment (they are percent-encoded when joined to the base URL).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    body: RequestBody,
}

impl ApiRequest {
    /// Request under the `/api` prefix.
    pub fn api<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec!["api".to_string()];
        all.extend(segments.into_iter().map(Into::into));
        Self {
            method,
            segments: all,
            body: RequestBody::Empty,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Raw(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Unencoded path for display and logging, e.g. `/api/feeds/3`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

impl std::fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_prefix() {
        let req = ApiRequest::api(Method::DELETE, ["feeds", "7"]);
        assert_eq!(req.path(), "/api/feeds/7");
        assert_eq!(req.segments(), &["api", "feeds", "7"]);
        assert_eq!(req.body(), &RequestBody::Empty);
        assert_eq!(req.to_string(), "DELETE /api/feeds/7");
    }

    #[test]
    fn test_body_builders() {
        let req = ApiRequest::api(Method::POST, ["feeds"]).json(json!({"url": "u"}));
        assert_eq!(req.body(), &RequestBody::Json(json!({"url": "u"})));

        let req = ApiRequest::api(Method::POST, ["update_user_settings"]).raw("{not json");
        assert_eq!(req.body(), &RequestBody::Raw("{not json".to_string()));
    }
}
