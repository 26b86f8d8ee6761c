//! Generic API action invoker.
//!
//! Each [`ApiAction`] has one entry in a static descriptor table. The entry
//! says whether the action needs an interactively collected parameter and,
//! if so, how that parameter is turned into a request (appended to the path,
//! wrapped in a JSON object, or forwarded verbatim as the body). Actions
//! without a parameter are plain `GET /api/{name}`.
//!
//! Whatever JSON comes back is pretty-printed into the output area; only
//! transport failures go through the alert tray.
use super::{ActionOutcome, Panel};
use crate::api::{ApiError, ApiRequest};
use crate::ui::{Page, Prompter};
use reqwest::Method;
use serde_json::json;
use std::str::FromStr;
use thiserror::Error;

pub(crate) const MSG_CALL_ERROR: &str = "Error calling API";

/// The closed set of remote capabilities the invoker knows about.
///
/// Variant order matches [`ACTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiAction {
    UnrestrictLink,
    GetStreamingLinks,
    DeleteDownload,
    UpdateUserSettings,
    User,
    Downloads,
    Torrents,
    Traffic,
    Hosts,
}

/// What kind of value an action prompts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A hoster link, sent inside a JSON object.
    Link,
    /// A file or download id, appended to the path.
    DownloadId,
    /// Settings text, forwarded as the body without parsing.
    RawSettings,
}

impl ParamKind {
    pub fn label(self) -> &'static str {
        match self {
            ParamKind::Link => "link",
            ParamKind::DownloadId => "id",
            ParamKind::RawSettings => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub kind: ParamKind,
    /// Question shown to the user.
    pub prompt: &'static str,
    /// Notice raised when the answer is cancelled or empty.
    pub missing: &'static str,
}

#[derive(Clone, Copy)]
pub enum RequestShape {
    /// `GET /api/{name}`, nothing to ask.
    ReadOnly,
    Prompted {
        param: ParamSpec,
        build: fn(String) -> ApiRequest,
    },
}

pub struct ActionDescriptor {
    pub action: ApiAction,
    pub name: &'static str,
    pub summary: &'static str,
    pub shape: RequestShape,
}

const LINK_PARAM: ParamSpec = ParamSpec {
    kind: ParamKind::Link,
    prompt: "Enter the link to unrestrict:",
    missing: "Link is required",
};

const ID_PARAM: ParamSpec = ParamSpec {
    kind: ParamKind::DownloadId,
    prompt: "Enter the file/download ID:",
    missing: "ID is required",
};

const SETTINGS_PARAM: ParamSpec = ParamSpec {
    kind: ParamKind::RawSettings,
    prompt: "Enter the settings as JSON:",
    missing: "Settings are required",
};

fn build_unrestrict_link(link: String) -> ApiRequest {
    ApiRequest::api(Method::POST, ["unrestrict_link"]).json(json!({ "link": link }))
}

fn build_get_streaming_links(id: String) -> ApiRequest {
    ApiRequest::api(Method::GET, ["get_streaming_links".to_string(), id])
}

fn build_delete_download(id: String) -> ApiRequest {
    ApiRequest::api(Method::DELETE, ["delete_download".to_string(), id])
}

fn build_update_user_settings(settings: String) -> ApiRequest {
    ApiRequest::api(Method::POST, ["update_user_settings"]).raw(settings)
}

static ACTIONS: [ActionDescriptor; 9] = [
    ActionDescriptor {
        action: ApiAction::UnrestrictLink,
        name: "unrestrict_link",
        summary: "Unrestrict a hoster link",
        shape: RequestShape::Prompted {
            param: LINK_PARAM,
            build: build_unrestrict_link,
        },
    },
    ActionDescriptor {
        action: ApiAction::GetStreamingLinks,
        name: "get_streaming_links",
        summary: "Look up streaming links for a file",
        shape: RequestShape::Prompted {
            param: ID_PARAM,
            build: build_get_streaming_links,
        },
    },
    ActionDescriptor {
        action: ApiAction::DeleteDownload,
        name: "delete_download",
        summary: "Delete a download",
        shape: RequestShape::Prompted {
            param: ID_PARAM,
            build: build_delete_download,
        },
    },
    ActionDescriptor {
        action: ApiAction::UpdateUserSettings,
        name: "update_user_settings",
        summary: "Send raw JSON user settings",
        shape: RequestShape::Prompted {
            param: SETTINGS_PARAM,
            build: build_update_user_settings,
        },
    },
    ActionDescriptor {
        action: ApiAction::User,
        name: "user",
        summary: "Show the account",
        shape: RequestShape::ReadOnly,
    },
    ActionDescriptor {
        action: ApiAction::Downloads,
        name: "downloads",
        summary: "List downloads",
        shape: RequestShape::ReadOnly,
    },
    ActionDescriptor {
        action: ApiAction::Torrents,
        name: "torrents",
        summary: "List torrents",
        shape: RequestShape::ReadOnly,
    },
    ActionDescriptor {
        action: ApiAction::Traffic,
        name: "traffic",
        summary: "Show traffic usage",
        shape: RequestShape::ReadOnly,
    },
    ActionDescriptor {
        action: ApiAction::Hosts,
        name: "hosts",
        summary: "List supported hosters",
        shape: RequestShape::ReadOnly,
    },
];

/// The action name is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

/// The prompted parameter was cancelled or empty. Holds the notice text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MissingParameter(pub &'static str);

impl ApiAction {
    pub const ALL: [ApiAction; 9] = [
        ApiAction::UnrestrictLink,
        ApiAction::GetStreamingLinks,
        ApiAction::DeleteDownload,
        ApiAction::UpdateUserSettings,
        ApiAction::User,
        ApiAction::Downloads,
        ApiAction::Torrents,
        ApiAction::Traffic,
        ApiAction::Hosts,
    ];

    pub fn descriptor(self) -> &'static ActionDescriptor {
        &ACTIONS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// The parameter this action prompts for, if any.
    pub fn param(self) -> Option<ParamSpec> {
        match self.descriptor().shape {
            RequestShape::ReadOnly => None,
            RequestShape::Prompted { param, .. } => Some(param),
        }
    }

    /// Build the request for this action from the prompted answer.
    ///
    /// The answer is ignored for read-only actions. For the others a
    /// missing or empty answer is an error carrying the notice to show.
    pub fn request(self, answer: Option<String>) -> Result<ApiRequest, MissingParameter> {
        let descriptor = self.descriptor();
        match descriptor.shape {
            RequestShape::ReadOnly => Ok(ApiRequest::api(Method::GET, [descriptor.name])),
            RequestShape::Prompted { param, build } => match answer {
                Some(value) if !value.is_empty() => Ok(build(value)),
                _ => Err(MissingParameter(param.missing)),
            },
        }
    }
}

impl FromStr for ApiAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACTIONS
            .iter()
            .find(|d| d.name == s)
            .map(|d| d.action)
            .ok_or_else(|| UnknownAction(s.to_owned()))
    }
}

impl std::fmt::Display for ApiAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// All descriptors, in table order.
pub fn descriptors() -> &'static [ActionDescriptor] {
    &ACTIONS
}

impl<P: Page, I: Prompter> Panel<P, I> {
    /// Run one API action and render whatever JSON comes back.
    pub async fn invoke(&self, action: ApiAction) -> ActionOutcome {
        let answer = action
            .param()
            .and_then(|spec| self.prompter.prompt(spec.prompt));

        let request = match action.request(answer) {
            Ok(request) => request,
            Err(MissingParameter(notice)) => {
                tracing::debug!(action = %action, "Action aborted, parameter missing");
                self.alerts.notify(notice);
                return ActionOutcome::Rejected;
            }
        };

        tracing::info!(action = %action, request = %request, "Invoking API action");
        match self.call(&request).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(rendered) => {
                    self.page.show_output(&rendered);
                    ActionOutcome::Rendered
                }
                Err(e) => self.transport_failure(&ApiError::from(e), MSG_CALL_ERROR),
            },
            Err(e) => self.transport_failure(&e, MSG_CALL_ERROR),
        }
    }

    /// Like [`Panel::invoke`], resolving the action from its wire name first.
    pub async fn invoke_named(&self, name: &str) -> ActionOutcome {
        match name.parse::<ApiAction>() {
            Ok(action) => self.invoke(action).await,
            Err(e) => {
                self.alerts.notify(e.to_string());
                ActionOutcome::Rejected
            }
        }
    }
}
