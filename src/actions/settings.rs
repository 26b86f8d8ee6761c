use super::{ActionOutcome, Panel};
use crate::api::ApiRequest;
use crate::ui::{Page, Prompter};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

pub(crate) const MSG_SAVE_OK: &str = "Settings saved successfully";
pub(crate) const MSG_SAVE_FAILED: &str = "Failed to save settings";
pub(crate) const MSG_SAVE_ERROR: &str = "Error saving settings";
pub(crate) const API_KEY_PROMPT: &str = "Enter the API key:";

pub(crate) fn save_settings_request(api_key: &SecretString) -> ApiRequest {
    ApiRequest::api(Method::POST, ["settings"]).json(json!({ "rd_api_key": api_key.expose_secret() }))
}

impl<P: Page, I: Prompter> Panel<P, I> {
    /// Replace the stored remote-service API key.
    ///
    /// Unlike `add_feed`, an empty key is sent as-is: clearing the key is a
    /// legitimate use.
    pub async fn save_settings(&self, api_key: &SecretString) -> ActionOutcome {
        if api_key.expose_secret().is_empty() {
            tracing::debug!("Saving empty API key");
        }

        match self.call_envelope(&save_settings_request(api_key)).await {
            Ok(envelope) if envelope.is_success() => {
                tracing::info!("API key saved");
                self.alerts.notify(MSG_SAVE_OK);
                ActionOutcome::Succeeded
            }
            Ok(_) => {
                self.alerts.notify(MSG_SAVE_FAILED);
                ActionOutcome::Failed
            }
            Err(e) => self.transport_failure(&e, MSG_SAVE_ERROR),
        }
    }

    /// Save `api_key`, or ask for one when none was supplied.
    ///
    /// A cancelled prompt sends nothing. An empty answer is still a typed
    /// answer and is saved like any other key.
    pub async fn save_settings_or_prompt(&self, api_key: Option<SecretString>) -> ActionOutcome {
        let api_key = match api_key {
            Some(key) => key,
            None => match self.prompter.prompt(API_KEY_PROMPT) {
                Some(answer) => SecretString::from(answer),
                None => {
                    tracing::debug!("API key prompt cancelled, nothing saved");
                    return ActionOutcome::Cancelled;
                }
            },
        };
        self.save_settings(&api_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RequestBody;

    #[test]
    fn test_save_settings_request_shape() {
        let req = save_settings_request(&SecretString::from("rd-key"));
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.path(), "/api/settings");
        assert_eq!(req.body(), &RequestBody::Json(json!({"rd_api_key": "rd-key"})));
    }

    #[test]
    fn test_empty_key_still_builds_request() {
        let req = save_settings_request(&SecretString::from(""));
        assert_eq!(req.body(), &RequestBody::Json(json!({"rd_api_key": ""})));
    }
}
