//! Shared doubles for the integration tests.
#![allow(dead_code)]

use rdpanel::actions::Panel;
use rdpanel::alert::AlertTray;
use rdpanel::api::PanelClient;
use rdpanel::ui::{Page, Prompter};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use wiremock::MockServer;

/// Records reloads and rendered output instead of showing them.
#[derive(Default)]
pub struct RecordingPage {
    reloads: Mutex<usize>,
    outputs: Mutex<Vec<String>>,
}

impl RecordingPage {
    pub fn reloads(&self) -> usize {
        *self.reloads.lock().unwrap()
    }

    pub fn outputs(&self) -> Vec<String> {
        self.outputs.lock().unwrap().clone()
    }
}

impl Page for RecordingPage {
    fn reload(&self) {
        *self.reloads.lock().unwrap() += 1;
    }

    fn show_output(&self, rendered: &str) {
        self.outputs.lock().unwrap().push(rendered.to_string());
    }
}

/// Replays canned answers and remembers what was asked.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Option<String>>>,
    confirm_answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(confirm_answer: bool, answers: Vec<Option<&str>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(|a| a.map(str::to_string)).collect()),
            confirm_answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Confirms everything, has no answers.
    pub fn silent() -> Self {
        Self::new(true, Vec::new())
    }

    pub fn answering(answer: &str) -> Self {
        Self::new(true, vec![Some(answer)])
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, message: &str) -> Option<String> {
        self.asked.lock().unwrap().push(message.to_string());
        self.answers.lock().unwrap().pop_front().flatten()
    }

    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.confirm_answer
    }
}

pub type TestPanel = Panel<RecordingPage, ScriptedPrompter>;

pub fn panel_for(server: &MockServer, prompter: ScriptedPrompter) -> TestPanel {
    panel_with_timeout(server, prompter, Duration::from_secs(5))
}

pub fn panel_with_timeout(
    server: &MockServer,
    prompter: ScriptedPrompter,
    timeout: Duration,
) -> TestPanel {
    let client = PanelClient::new(&server.uri(), timeout).unwrap();
    Panel::new(client, AlertTray::new(), RecordingPage::default(), prompter)
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}
