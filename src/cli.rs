use std::io::Write;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::app_state::AppState;
use crate::config::ClientConfig;
use crate::core::util::error_formatter::{format_error, is_not_logged_in};
use crate::core::util::time_formatter::describe_last_modified;
use crate::domain::logs::service::job_resolver_service::parse_log_location;
use crate::domain::logs::service::log_follower_service::FollowEvent;
use crate::errors::LogViewerError;

/// Terminal client for the CDS log viewer.
#[derive(Parser, Debug, Clone)]
#[command(name = "cdslogviewer", about = "Browse and tail CDS job logs")]
pub struct Cli {
    /// Log server base URL
    #[arg(long, global = true, env = "LOGVIEWER_BASE_URL")]
    pub base_url: Option<String>,

    /// Deployment root path
    #[arg(long, global = true, env = "LOGVIEWER_DEPLOYMENT_ROOT")]
    pub root: Option<String>,

    /// Bearer token
    #[arg(long, global = true, env = "LOGVIEWER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, env = "LOGVIEWER_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List known routes
    Routes,
    /// List the log files of a route
    Files { route: String },
    /// Follow a log, printing new lines as they arrive
    Tail {
        route: String,
        log: String,
        /// Refresh interval in milliseconds
        #[arg(long, env = "LOGVIEWER_POLL_INTERVAL_MS")]
        interval_ms: Option<u64>,
    },
    /// Resolve a job name to its log URL
    Job {
        job_name: String,
        /// Start tailing the resolved log
        #[arg(long)]
        follow: bool,
    },
}

impl Cli {
    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(v) = &self.base_url {
            config.base_url = v.clone();
        }
        if let Some(v) = &self.root {
            config.deployment_root = v.clone();
        }
        if let Some(v) = &self.token {
            config.token = Some(v.clone());
        }
        if let Some(v) = &self.log_level {
            config.log_level = v.clone();
        }
        if let Command::Tail { interval_ms: Some(ms), .. } = &self.command {
            config.poll_interval_ms = *ms;
        }
    }
}

pub async fn run(command: Command, state: AppState) -> Result<()> {
    match command {
        Command::Routes => list_routes(&state).await,
        Command::Files { route } => list_files(&state, &route).await,
        Command::Tail { route, log, .. } => tail(&state, &route, &log).await,
        Command::Job { job_name, follow } => {
            let location = state
                .job_resolver
                .resolve_job_log_url(&job_name)
                .await
                .map_err(|e| user_error("Could not load log URL", &e))?;
            println!("{}", location);

            if follow {
                let (route, log) = parse_log_location(&location)
                    .ok_or_else(|| anyhow!("Resolved location '{}' does not point at a log", location))?;
                tail(&state, &route, &log).await?;
            }
            Ok(())
        }
    }
}

async fn list_routes(state: &AppState) -> Result<()> {
    let routes = state
        .route_lister
        .list_routes()
        .await
        .map_err(|e| user_error("Could not list known routes", &e))?;

    if routes.is_empty() {
        println!("No routes loaded");
    }
    for route in routes {
        println!("{}", route);
    }
    Ok(())
}

async fn list_files(state: &AppState, route: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    state
        .route_lister
        .list_files(route, |file| {
            let _ = writeln!(
                stdout,
                "{:<48} {:>10}  {}",
                file.name,
                file.display_size(),
                file.last_modified
            );
        })
        .await
        .map_err(|e| user_error(&format!("Could not load in logs for route {}", route), &e))?;
    Ok(())
}

async fn tail(state: &AppState, route: &str, log: &str) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(64);
    let follower = state.spawn_follower(tx);
    follower.switch_to(route, log).await?;
    eprintln!("{} from {} (auto-refresh every {:?})", log, route, state.poll_interval);

    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break Ok(());
            }
            event = rx.recv() => match event {
                Some(FollowEvent::Lines { lines, .. }) => {
                    for line in lines {
                        println!("{}", line);
                    }
                }
                Some(FollowEvent::LastModified { value, .. }) => {
                    if let Some(text) = describe_last_modified(&value, Utc::now()) {
                        eprintln!("{}", text);
                    }
                }
                Some(FollowEvent::PollFailed { error, .. }) => {
                    if is_not_logged_in(&error) {
                        break Err(user_error("Not logged in", &error));
                    }
                    eprintln!("{}", format_error(&error, true));
                }
                None => break Ok(()),
            }
        }
    };

    let final_state = follower.stop().await?;
    if let Some(s) = final_state {
        info!(offset = s.offset, lines = s.lines.len(), "tail finished");
    }
    outcome
}

fn user_error(context: &str, err: &LogViewerError) -> anyhow::Error {
    error!(error = ?err, "{}", context);
    if is_not_logged_in(err) {
        return anyhow!("{}: not logged in or session expired ({})", context, format_error(err, false));
    }
    anyhow!("{}: {}", context, format_error(err, false))
}

pub fn ensure_valid(config: ClientConfig) -> Result<ClientConfig> {
    match config.validated() {
        Ok(cfg) => Ok(cfg),
        Err(e) => bail!("{}", e),
    }
}
