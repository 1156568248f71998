use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::core::client::authenticated_fetch::AuthenticatedFetch;
use crate::domain::logs::service::job_resolver_service::JobResolverService;
use crate::domain::logs::service::log_follower_service::{FollowEvent, FollowerHandle, LogFollower};
use crate::domain::logs::service::log_tailer_service::LogTailerService;
use crate::domain::logs::service::route_lister_service::RouteListerService;
use crate::errors::ClientResult;

/// Services sharing one authenticated transport.
#[derive(Clone)]
pub struct AppState {
    pub route_lister: Arc<RouteListerService>,
    pub log_tailer: Arc<LogTailerService>,
    pub job_resolver: Arc<JobResolverService>,
    pub poll_interval: Duration,
}

pub fn build_app_state(config: &ClientConfig) -> ClientResult<AppState> {
    let fetch = Arc::new(AuthenticatedFetch::from_config(config)?);
    Ok(build_app_state_with(fetch, config.poll_interval()))
}

pub fn build_app_state_with(fetch: Arc<AuthenticatedFetch>, poll_interval: Duration) -> AppState {
    AppState {
        route_lister: Arc::new(RouteListerService::new(fetch.clone())),
        log_tailer: Arc::new(LogTailerService::new(fetch.clone())),
        job_resolver: Arc::new(JobResolverService::new(fetch)),
        poll_interval,
    }
}

impl AppState {
    pub fn spawn_follower(&self, events: tokio::sync::mpsc::Sender<FollowEvent>) -> FollowerHandle {
        let follower = LogFollower::new(self.log_tailer.clone(), self.poll_interval);
        FollowerHandle::spawn(follower, events)
    }
}
