//! User-triggered actions against the panel.
//!
//! Every action follows the same flow: gather parameters (arguments or the
//! [`Prompter`]), issue at most one request through the [`PanelClient`], then
//! either reload the [`Page`], render output, or raise a notice on the
//! [`AlertTray`]. Actions never return errors; the [`ActionOutcome`] records
//! which of those things happened.
//!
//! - [`feeds`] - add, remove and refresh feeds
//! - [`settings`] - save the remote-service API key
//! - [`dispatch`] - the generic, table-driven API action invoker
//! - [`session`] - form login and password change

pub mod dispatch;
pub mod feeds;
pub mod session;
pub mod settings;

pub use dispatch::{ActionDescriptor, ApiAction, MissingParameter, ParamKind, ParamSpec, RequestShape, UnknownAction};
pub use feeds::FeedId;

use crate::alert::AlertTray;
use crate::api::{ApiError, ApiRequest, Envelope, PanelClient};
use crate::ui::{Page, Prompter};
use serde_json::Value;

/// What an action ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Local validation failed. Nothing was sent, one notice was raised.
    Rejected,
    /// The user declined a confirmation. Nothing was sent or shown.
    Cancelled,
    /// The server accepted the change and the page was reloaded.
    Reloaded,
    /// The response was rendered into the output area.
    Rendered,
    /// The server accepted the request; a notice says so.
    Succeeded,
    /// The server reported a failure.
    Failed,
    /// Network error, timeout, or a body that was not JSON.
    TransportFailed,
}

impl ActionOutcome {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            ActionOutcome::Rejected | ActionOutcome::Failed | ActionOutcome::TransportFailed
        )
    }
}

/// Everything an action needs, injected rather than looked up.
pub struct Panel<P, I> {
    client: PanelClient,
    alerts: AlertTray,
    page: P,
    prompter: I,
}

impl<P: Page, I: Prompter> Panel<P, I> {
    pub fn new(client: PanelClient, alerts: AlertTray, page: P, prompter: I) -> Self {
        Self {
            client,
            alerts,
            page,
            prompter,
        }
    }

    pub fn client(&self) -> &PanelClient {
        &self.client
    }

    pub fn alerts(&self) -> &AlertTray {
        &self.alerts
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn prompter(&self) -> &I {
        &self.prompter
    }

    async fn call(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.client.send(request).await
    }

    async fn call_envelope(&self, request: &ApiRequest) -> Result<Envelope, ApiError> {
        let value = self.call(request).await?;
        let envelope = Envelope::from_value(&value);
        if !envelope.is_success() {
            tracing::debug!(
                request = %request,
                status = ?envelope.status,
                message = ?envelope.message,
                "Panel reported failure"
            );
        }
        Ok(envelope)
    }

    /// Log the cause, show only the generic notice.
    fn transport_failure(&self, error: &ApiError, notice: &'static str) -> ActionOutcome {
        tracing::warn!(error = %error, notice, "Panel request failed");
        self.alerts.notify(notice);
        ActionOutcome::TransportFailed
    }
}
