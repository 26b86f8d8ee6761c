use serde_json::Value;

/// The `{status, message?}` shape returned by the feed, settings and refresh
/// endpoints.
///
/// Extraction is lenient: a payload that is not an object, or whose fields
/// are not strings, yields an envelope without a status, which counts as a
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub status: Option<String>,
    pub message: Option<String>,
}

impl Envelope {
    pub const SUCCESS: &'static str = "success";

    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_owned);
        Self {
            status: field("status"),
            message: field("message"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(Self::SUCCESS)
    }
}
