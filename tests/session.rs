//! Integration tests for the form login and password change.

mod common;

use common::{panel_for, request_count, ScriptedPrompter};
use rdpanel::actions::ActionOutcome;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>panel</html>"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_success_follows_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string("username=admin&password=ADM2024"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/")
                .insert_header("set-cookie", "session=abc; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_index(&server).await;
    let panel = panel_for(&server, ScriptedPrompter::silent());

    let outcome = panel.login("admin", &SecretString::from("ADM2024")).await;

    assert_eq!(outcome, ActionOutcome::Succeeded);
    assert_eq!(panel.alerts().messages(), vec!["Logged in as admin"]);
}

#[tokio::test]
async fn test_session_cookie_sent_with_api_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/")
                .insert_header("set-cookie", "session=abc; Path=/"),
        )
        .mount(&server)
        .await;
    mount_index(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;
    let panel = panel_for(&server, ScriptedPrompter::silent());

    panel.login("admin", &SecretString::from("pw")).await;
    let outcome = panel.refresh_feeds().await;

    assert_eq!(outcome, ActionOutcome::Succeeded);
}

#[tokio::test]
async fn test_login_rejected_stays_on_login_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Invalid</html>"))
        .mount(&server)
        .await;
    let panel = panel_for(&server, ScriptedPrompter::silent());

    let outcome = panel.login("admin", &SecretString::from("wrong")).await;

    assert_eq!(outcome, ActionOutcome::Failed);
    assert_eq!(panel.alerts().messages(), vec!["Invalid username or password"]);
}

#[tokio::test]
async fn test_change_password_empty_is_rejected() {
    let server = MockServer::start().await;
    let panel = panel_for(&server, ScriptedPrompter::silent());

    let outcome = panel.change_password(&SecretString::from("")).await;

    assert_eq!(outcome, ActionOutcome::Rejected);
    assert_eq!(request_count(&server).await, 0);
    assert_eq!(panel.alerts().messages(), vec!["Please enter a new password"]);
}

#[tokio::test]
async fn test_change_password_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/change_password"))
        .and(body_string("new_password=s3cret%21"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
        .expect(1)
        .mount(&server)
        .await;
    mount_index(&server).await;
    let panel = panel_for(&server, ScriptedPrompter::silent());

    let outcome = panel.change_password(&SecretString::from("s3cret!")).await;

    assert_eq!(outcome, ActionOutcome::Succeeded);
    assert_eq!(panel.alerts().messages(), vec!["Password updated successfully"]);
}

#[tokio::test]
async fn test_change_password_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/change_password"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/login?next=%2Fchange_password"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;
    let panel = panel_for(&server, ScriptedPrompter::silent());

    let outcome = panel.change_password(&SecretString::from("x")).await;

    assert_eq!(outcome, ActionOutcome::Failed);
    assert_eq!(panel.alerts().messages(), vec!["Not logged in"]);
}
