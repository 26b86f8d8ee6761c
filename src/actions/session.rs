use super::{ActionOutcome, Panel};
use crate::ui::{Page, Prompter};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

pub(crate) const MSG_LOGIN_FAILED: &str = "Invalid username or password";
pub(crate) const MSG_LOGIN_ERROR: &str = "Error logging in";
pub(crate) const MSG_PASSWORD_REQUIRED: &str = "Please enter a new password";
pub(crate) const MSG_PASSWORD_OK: &str = "Password updated successfully";
pub(crate) const MSG_NOT_LOGGED_IN: &str = "Not logged in";
pub(crate) const MSG_PASSWORD_ERROR: &str = "Error changing password";

/// The panel answers an unauthenticated or rejected form post by showing
/// the login page again.
fn lands_on_login(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .is_some_and(|last| last == "login")
}

impl<P: Page, I: Prompter> Panel<P, I> {
    /// Log in through the panel's form. The session cookie is kept by the
    /// client and sent with every later request.
    pub async fn login(&self, username: &str, password: &SecretString) -> ActionOutcome {
        let result = self
            .client
            .submit_form(
                &["login"],
                &[("username", username), ("password", password.expose_secret())],
            )
            .await;

        match result {
            Ok(final_url) if !lands_on_login(&final_url) => {
                tracing::info!(username, "Logged in");
                self.alerts.notify(format!("Logged in as {username}"));
                ActionOutcome::Succeeded
            }
            Ok(_) => {
                tracing::warn!(username, "Login rejected");
                self.alerts.notify(MSG_LOGIN_FAILED);
                ActionOutcome::Failed
            }
            Err(e) => self.transport_failure(&e, MSG_LOGIN_ERROR),
        }
    }

    /// Change the panel password for the logged-in user.
    pub async fn change_password(&self, new_password: &SecretString) -> ActionOutcome {
        if new_password.expose_secret().is_empty() {
            self.alerts.notify(MSG_PASSWORD_REQUIRED);
            return ActionOutcome::Rejected;
        }

        let result = self
            .client
            .submit_form(
                &["change_password"],
                &[("new_password", new_password.expose_secret())],
            )
            .await;

        match result {
            Ok(final_url) if !lands_on_login(&final_url) => {
                tracing::info!("Panel password changed");
                self.alerts.notify(MSG_PASSWORD_OK);
                ActionOutcome::Succeeded
            }
            Ok(_) => {
                self.alerts.notify(MSG_NOT_LOGGED_IN);
                ActionOutcome::Failed
            }
            Err(e) => self.transport_failure(&e, MSG_PASSWORD_ERROR),
        }
    }
}
