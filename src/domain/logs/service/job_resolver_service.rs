use std::sync::Arc;

use http::header::LOCATION;
use http::StatusCode;
use tracing::{error, info};

use crate::core::client::authenticated_fetch::AuthenticatedFetch;
use crate::errors::{ClientResult, LogViewerError};

/// Resolves a job name to the URL of its log via a 308 response.
#[derive(Clone)]
pub struct JobResolverService {
    fetch: Arc<AuthenticatedFetch>,
}

impl JobResolverService {
    pub fn new(fetch: Arc<AuthenticatedFetch>) -> Self {
        Self { fetch }
    }

    /// Only 308 is accepted; any other status, 200 included, is a server error.
    pub async fn resolve_job_log_url(&self, job_name: &str) -> ClientResult<String> {
        let path = format!("logByJobName/{}", urlencoding::encode(job_name));
        let response = self.fetch.get(&path).await?;

        let status = response.status;
        if status != StatusCode::PERMANENT_REDIRECT {
            let body = response.text().await.unwrap_or_default();
            error!(%status, job = job_name, %body, "Could not load log URL");
            return Err(LogViewerError::ServerError(status.as_u16()));
        }

        if response.body.is_none() {
            return Err(LogViewerError::NoContentError);
        }

        let location = response
            .header_str(LOCATION.as_str())
            .ok_or(LogViewerError::MissingLocationError)?;

        info!(job = job_name, %location, "job log resolved");
        Ok(location)
    }
}

/// Extracts `(route, log)` from a location like `/app/log/{route}/{log}`.
pub fn parse_log_location(location: &str) -> Option<(String, String)> {
    let path = location.split(['?', '#']).next()?;
    let (_, rest) = path.rsplit_once("/log/")?;

    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let route = urlencoding::decode(segments.next()?).ok()?.into_owned();
    let log = urlencoding::decode(segments.next()?).ok()?.into_owned();
    if segments.next().is_some() {
        return None;
    }

    Some((route, log))
}
