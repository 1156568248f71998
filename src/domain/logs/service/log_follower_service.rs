use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::util::error_formatter::format_error;
use crate::domain::logs::dto::log_lines_batch::LogLinesBatch;
use crate::domain::logs::service::log_tailer_service::LinesSource;
use crate::domain::logs::tail_state::{ApplyOutcome, PollTicket, TailSession, TailState};
use crate::errors::{ClientResult, LogViewerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowCommand {
    SwitchTo { route: String, log: String },
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowEvent {
    /// New lines were applied; `offset` is the state's offset afterwards.
    Lines {
        route: String,
        log: String,
        lines: Vec<String>,
        offset: u64,
    },
    LastModified {
        route: String,
        log: String,
        value: String,
    },
    PollFailed {
        route: String,
        log: String,
        error: LogViewerError,
    },
}

type PollResult = (PollTicket, ClientResult<LogLinesBatch>);

/// Polls a `LinesSource` on a fixed interval and applies results in order.
///
/// The ticker is never paused for in-flight polls, so polls overlap; their
/// results go through `TailSession::apply` and anything stale is dropped.
/// Failed polls are reported and retried by the next tick only.
pub struct LogFollower {
    source: Arc<dyn LinesSource>,
    poll_interval: Duration,
    session: Option<TailSession>,
}

impl LogFollower {
    pub fn new(source: Arc<dyn LinesSource>, poll_interval: Duration) -> Self {
        Self {
            source,
            poll_interval,
            session: None,
        }
    }

    /// Runs until `Stop` arrives or the command channel closes. In-flight
    /// polls are dropped on exit.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<FollowCommand>,
        events: mpsc::Sender<FollowEvent>,
    ) -> Option<TailState> {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight: FuturesUnordered<BoxFuture<'static, PollResult>> = FuturesUnordered::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(poll) = self.issue_poll() {
                        in_flight.push(poll);
                    }
                }
                Some((ticket, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    if !self.handle_result(ticket, result, &events).await {
                        break;
                    }
                }
                command = commands.recv() => match command {
                    Some(FollowCommand::SwitchTo { route, log }) => {
                        info!(%route, %log, "following log");
                        self.session = Some(TailSession::new(route, log));
                        ticker.reset_immediately();
                    }
                    Some(FollowCommand::Stop) | None => break,
                },
            }
        }

        debug!(dropped = in_flight.len(), "follower stopped");
        self.session.map(|s| s.state().clone())
    }

    fn issue_poll(&mut self) -> Option<BoxFuture<'static, PollResult>> {
        let session = self.session.as_mut()?;
        let ticket = session.issue();
        let route = session.route().to_string();
        let log = session.log().to_string();
        let source = self.source.clone();

        debug!(%route, %log, seq = ticket.seq, from_line = ticket.from_line, "poll issued");
        Some(
            async move {
                let result = source.fetch_more_lines(&route, &log, ticket.from_line).await;
                (ticket, result)
            }
            .boxed(),
        )
    }

    /// Returns false once the event receiver is gone.
    async fn handle_result(
        &mut self,
        ticket: PollTicket,
        result: ClientResult<LogLinesBatch>,
        events: &mpsc::Sender<FollowEvent>,
    ) -> bool {
        let Some(session) = self.session.as_mut() else {
            return true;
        };
        let route = session.route().to_string();
        let log = session.log().to_string();

        let batch = match result {
            Ok(batch) => batch,
            Err(error) => {
                if ticket.session != session.id() {
                    return true;
                }
                warn!(%route, %log, seq = ticket.seq, detail = %error, "{}", format_error(&error, true));
                return events.send(FollowEvent::PollFailed { route, log, error }).await.is_ok();
            }
        };

        let previous_modified = session.state().last_modified.clone();
        match session.apply(&ticket, &batch) {
            ApplyOutcome::Applied => {}
            outcome => {
                debug!(?outcome, seq = ticket.seq, from_line = ticket.from_line, "poll result dropped");
                return true;
            }
        }

        let state = session.state();
        if let Some(value) = state.last_modified.clone() {
            if previous_modified.as_ref() != Some(&value) {
                let event = FollowEvent::LastModified {
                    route: route.clone(),
                    log: log.clone(),
                    value,
                };
                if events.send(event).await.is_err() {
                    return false;
                }
            }
        }

        if batch.count == 0 {
            debug!("Received no more extra content");
            return true;
        }

        debug!(count = batch.count, "Received more log lines");
        let event = FollowEvent::Lines {
            route,
            log,
            lines: batch.content,
            offset: state.offset,
        };
        events.send(event).await.is_ok()
    }
}

/// Handle to a follower running on its own task.
pub struct FollowerHandle {
    commands: mpsc::Sender<FollowCommand>,
    join: JoinHandle<Option<TailState>>,
}

impl FollowerHandle {
    pub fn spawn(follower: LogFollower, events: mpsc::Sender<FollowEvent>) -> Self {
        let (commands, rx) = mpsc::channel(8);
        let join = tokio::spawn(follower.run(rx, events));
        Self { commands, join }
    }

    pub async fn switch_to(&self, route: &str, log: &str) -> anyhow::Result<()> {
        self.commands
            .send(FollowCommand::SwitchTo {
                route: route.to_string(),
                log: log.to_string(),
            })
            .await
            .map_err(|_| anyhow::anyhow!("follower is no longer running"))
    }

    /// Stops the follower and returns the final state of the current tail.
    pub async fn stop(self) -> anyhow::Result<Option<TailState>> {
        // Already gone if the send fails; join reports how it ended
        let _ = self.commands.send(FollowCommand::Stop).await;
        Ok(self.join.await?)
    }
}
