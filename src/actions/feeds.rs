use super::{ActionOutcome, Panel};
use crate::api::ApiRequest;
use crate::ui::{Page, Prompter};
use reqwest::Method;
use serde_json::json;

pub(crate) const MSG_URL_REQUIRED: &str = "Please enter a feed URL";
pub(crate) const MSG_ADD_ERROR: &str = "Error adding feed";
pub(crate) const MSG_REMOVE_CONFIRM: &str = "Are you sure you want to remove this feed?";
pub(crate) const MSG_REMOVE_FAILED: &str = "Failed to remove feed";
pub(crate) const MSG_REMOVE_ERROR: &str = "Error removing feed";
pub(crate) const MSG_REFRESH_OK: &str = "Feeds refreshed successfully";
pub(crate) const MSG_REFRESH_FAILED: &str = "Failed to refresh feeds";
pub(crate) const MSG_REFRESH_ERROR: &str = "Error refreshing feeds";

/// Opaque server-assigned feed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedId(String);

impl FeedId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for FeedId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for FeedId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<u64> for FeedId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn add_feed_request(url: &str) -> ApiRequest {
    ApiRequest::api(Method::POST, ["feeds"]).json(json!({ "url": url }))
}

pub(crate) fn remove_feed_request(id: &FeedId) -> ApiRequest {
    ApiRequest::api(Method::DELETE, ["feeds", id.as_str()])
}

pub(crate) fn refresh_request() -> ApiRequest {
    ApiRequest::api(Method::POST, ["refresh"])
}

impl<P: Page, I: Prompter> Panel<P, I> {
    /// Subscribe to a feed.
    ///
    /// An empty URL is rejected locally. On success the page is reloaded
    /// (the server renders the feed list); on failure the server's message
    /// is included in the notice.
    pub async fn add_feed(&self, url: &str) -> ActionOutcome {
        if url.is_empty() {
            self.alerts.notify(MSG_URL_REQUIRED);
            return ActionOutcome::Rejected;
        }

        match self.call_envelope(&add_feed_request(url)).await {
            Ok(envelope) if envelope.is_success() => {
                tracing::info!(url, "Feed added");
                self.page.reload();
                ActionOutcome::Reloaded
            }
            Ok(envelope) => {
                let reason = envelope.message.as_deref().unwrap_or("unknown error");
                self.alerts.notify(format!("Failed to add feed: {reason}"));
                ActionOutcome::Failed
            }
            Err(e) => self.transport_failure(&e, MSG_ADD_ERROR),
        }
    }

    /// Unsubscribe from a feed after the user confirms.
    ///
    /// Declining sends nothing and shows nothing. A server-side failure is
    /// reported without the server's message.
    pub async fn remove_feed(&self, id: &FeedId) -> ActionOutcome {
        if !self.prompter.confirm(MSG_REMOVE_CONFIRM) {
            tracing::debug!(feed_id = %id, "Feed removal declined");
            return ActionOutcome::Cancelled;
        }

        match self.call_envelope(&remove_feed_request(id)).await {
            Ok(envelope) if envelope.is_success() => {
                tracing::info!(feed_id = %id, "Feed removed");
                self.page.reload();
                ActionOutcome::Reloaded
            }
            Ok(_) => {
                self.alerts.notify(MSG_REMOVE_FAILED);
                ActionOutcome::Failed
            }
            Err(e) => self.transport_failure(&e, MSG_REMOVE_ERROR),
        }
    }

    /// Ask the server to run a refresh cycle. Only notifies; the set of
    /// feeds does not change so there is nothing to reload.
    pub async fn refresh_feeds(&self) -> ActionOutcome {
        match self.call_envelope(&refresh_request()).await {
            Ok(envelope) if envelope.is_success() => {
                self.alerts.notify(MSG_REFRESH_OK);
                ActionOutcome::Succeeded
            }
            Ok(_) => {
                self.alerts.notify(MSG_REFRESH_FAILED);
                ActionOutcome::Failed
            }
            Err(e) => self.transport_failure(&e, MSG_REFRESH_ERROR),
        }
    }
}
