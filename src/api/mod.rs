//! Transport layer for the panel's HTTP API.
//!
//! - [`request`] - method, path segments and body of an outgoing call
//! - [`envelope`] - the `{status, message?}` reply shape
//! - [`client`] - reqwest-based client with cookie session and timeout

mod client;
mod envelope;
mod request;

pub use client::{parse_base_url, ApiError, PanelClient, DEFAULT_TIMEOUT};
pub use envelope::Envelope;
pub use request::{ApiRequest, RequestBody};
