use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rdpanel::actions::{dispatch, ActionOutcome, FeedId, Panel};
use rdpanel::alert::AlertTray;
use rdpanel::api::PanelClient;
use rdpanel::config::Config;
use rdpanel::ui::{Page, Prompter, TerminalPage, TerminalPrompter};
use secrecy::SecretString;
use std::path::PathBuf;
use std::process::ExitCode;

/// Get the config directory path (~/.config/rdpanel/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("rdpanel"))
}

#[derive(Parser, Debug)]
#[command(name = "rdpanel", about = "Manage feeds and unrestrict links on a self-hosted panel")]
struct Args {
    /// Config file (default: ~/.config/rdpanel/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Panel base URL, overrides the config file
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Subscribe to a feed
    AddFeed {
        /// Feed URL
        url: String,
    },
    /// Remove a feed by id
    RemoveFeed {
        id: String,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Trigger a server-side refresh of all feeds
    Refresh,
    /// Save the remote-service API key
    SaveSettings {
        /// API key (falls back to RD_API_KEY, the config file, then a prompt)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
    },
    /// Invoke an API action and print the JSON response
    Call {
        /// Action name, see `rdpanel actions`
        action: String,
    },
    /// List the actions `call` accepts
    Actions,
    /// Change the panel password (prompts for the new one)
    ChangePassword,
}

fn print_actions() {
    for d in dispatch::descriptors() {
        let param = d
            .action
            .param()
            .map(|p| format!("<{}>", p.kind.label()))
            .unwrap_or_default();
        println!("{:<22} {:<7} {}", d.name, param, d.summary);
    }
}

/// Print notices that are still active, oldest first.
fn flush_alerts(alerts: &AlertTray) {
    for alert in alerts.active().iter().rev() {
        eprintln!("{}", alert.message);
    }
    alerts.prune_expired();
}

async fn run_command<P: Page, I: Prompter>(
    panel: &Panel<P, I>,
    config: &Config,
    command: Command,
) -> ActionOutcome {
    match command {
        Command::AddFeed { url } => panel.add_feed(&url).await,
        Command::RemoveFeed { id, .. } => panel.remove_feed(&FeedId::from(id)).await,
        Command::Refresh => panel.refresh_feeds().await,
        Command::SaveSettings { api_key } => {
            let key = api_key
                .map(SecretString::from)
                .or_else(|| config.rd_api_key());
            panel.save_settings_or_prompt(key).await
        }
        Command::Call { action } => panel.invoke_named(&action).await,
        Command::ChangePassword => {
            let password = panel
                .prompter()
                .prompt("Enter the new password:")
                .unwrap_or_default();
            panel.change_password(&SecretString::from(password)).await
        }
        // Handled before the panel is built
        Command::Actions => ActionOutcome::Succeeded,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout carries only API output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if matches!(args.command, Command::Actions) {
        print_actions();
        return Ok(ExitCode::SUCCESS);
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    tracing::debug!(config = ?config, "Effective configuration");

    let client = PanelClient::new(&config.base_url, config.request_timeout())
        .with_context(|| format!("Invalid panel URL '{}'", config.base_url))?;

    let assume_yes = matches!(args.command, Command::RemoveFeed { yes: true, .. });
    let alerts = AlertTray::new();
    let panel = Panel::new(
        client,
        alerts.clone(),
        TerminalPage,
        TerminalPrompter::new(assume_yes),
    );

    if let Some(password) = config.password() {
        let outcome = panel.login(&config.username, &password).await;
        if outcome.is_failure() {
            flush_alerts(&alerts);
            return Ok(ExitCode::FAILURE);
        }
    } else {
        tracing::debug!("No password configured, skipping login");
    }

    let outcome = run_command(&panel, &config, args.command).await;
    tracing::debug!(outcome = ?outcome, "Command finished");
    flush_alerts(&alerts);

    Ok(if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
