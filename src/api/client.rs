use super::request::{ApiRequest, RequestBody};
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB
const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Default per-request timeout when the config does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level failures. Actions surface all of these as a generic notice.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Redirect policy for the panel: the login flow redirects once or twice,
/// anything longer is treated as a misconfiguration.
///
/// - Limits redirects to 5 hops
/// - Detects redirect loops (same URL appearing twice in chain)
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 5 {
            return attempt.error("Too many redirects (max 5)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Validate the panel base URL.
///
/// Only http(s) is accepted. Plain http to a non-loopback host is allowed
/// (panels usually live on a LAN) but logged, since the login form and
/// session cookie travel in cleartext.
pub fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidBaseUrl(format!("{raw}: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(ApiError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ApiError::InvalidBaseUrl(raw.to_owned()));
    }

    if url.scheme() == "http" {
        let is_loopback = matches!(
            url.host_str(),
            Some("localhost") | Some("127.0.0.1") | Some("[::1]")
        );
        if !is_loopback {
            tracing::warn!(base_url = %url, "Panel base URL is not HTTPS; credentials are sent in cleartext");
        }
    }

    Ok(url)
}

/// HTTP client bound to one panel instance.
///
/// Holds a cookie store so a session obtained through the login form is
/// reused by every later request made through the same client.
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl PanelClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(redirect_policy())
            .user_agent(concat!("rdpanel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        tracing::debug!(base_url = %base_url, timeout_ms = timeout.as_millis() as u64, "Panel client ready");
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Join path segments onto the base URL, one encoded segment each.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments.iter().map(AsRef::as_ref));
        Ok(url)
    }

    /// Send a request and decode the response body as JSON.
    ///
    /// The HTTP status code is not inspected: any JSON body is returned to the
    /// caller, which decides what it means. Network failures, a body that is
    /// not JSON, and exceeding the timeout are all errors.
    pub async fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = self.endpoint(request.segments())?;
        // Every API call is labelled JSON, bodiless ones and the raw passthrough included
        let builder = self
            .http
            .request(request.method().clone(), url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

        let builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(serde_json::to_vec(value)?),
            RequestBody::Raw(text) => builder.body(text.clone()),
        };

        tracing::debug!(request = %request, "Sending panel request");

        let bytes = tokio::time::timeout(self.timeout, async {
            let response = builder.send().await?;
            let status = response.status();
            tracing::debug!(request = %request, status = status.as_u16(), "Panel responded");
            let bytes = read_limited(response, MAX_RESPONSE_SIZE).await?;
            Ok::<_, ApiError>(bytes)
        })
        .await
        .map_err(|_| ApiError::Timeout(self.timeout))??;

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Post an urlencoded form, following redirects.
    ///
    /// Returns the final URL after redirects; the panel's form endpoints
    /// signal their outcome only through where they redirect to.
    pub async fn submit_form(
        &self,
        segments: &[&str],
        fields: &[(&str, &str)],
    ) -> Result<Url, ApiError> {
        let url = self.endpoint(segments)?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();
        let field_names: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        tracing::debug!(url = %url, fields = ?field_names, "Submitting panel form");

        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);

        let final_url = tokio::time::timeout(self.timeout, async {
            let response = request.send().await?;
            Ok::<_, ApiError>(response.url().clone())
        })
        .await
        .map_err(|_| ApiError::Timeout(self.timeout))??;

        tracing::debug!(final_url = %final_url, "Form submission settled");
        Ok(final_url)
    }
}

async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
