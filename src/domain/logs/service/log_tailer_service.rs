use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use http::StatusCode;
use tracing::{debug, error};

use crate::core::client::authenticated_fetch::AuthenticatedFetch;
use crate::core::stream::line_assembler::LineAssembler;
use crate::domain::logs::dto::log_lines_batch::LogLinesBatch;
use crate::errors::{ClientResult, LogViewerError};

pub const LOGFILE_MODIFIED_HEADER: &str = "x-logfile-modified";

/// Anything that can hand out the lines of a log beyond an offset.
#[async_trait]
pub trait LinesSource: Send + Sync {
    async fn fetch_more_lines(
        &self,
        route_name: &str,
        log_name: &str,
        from_line: u64,
    ) -> ClientResult<LogLinesBatch>;
}

/// Stateless incremental tailer. Every call is an independent request; the
/// caller owns the offset.
#[derive(Clone)]
pub struct LogTailerService {
    fetch: Arc<AuthenticatedFetch>,
}

impl LogTailerService {
    pub fn new(fetch: Arc<AuthenticatedFetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl LinesSource for LogTailerService {
    async fn fetch_more_lines(
        &self,
        route_name: &str,
        log_name: &str,
        from_line: u64,
    ) -> ClientResult<LogLinesBatch> {
        let path = format!(
            "{}/{}?fromLine={}",
            urlencoding::encode(route_name),
            urlencoding::encode(log_name),
            from_line
        );
        let response = self.fetch.get(&path).await?;

        let status = response.status;
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(%status, route = route_name, log = log_name, %body, "Server error loading log lines");
            return Err(LogViewerError::ServerError(status.as_u16()));
        }

        let last_modified = response.header_str(LOGFILE_MODIFIED_HEADER);
        let mut body = response.body.ok_or(LogViewerError::NoContentError)?;

        let mut batch = LogLinesBatch::new(last_modified);
        let mut assembler = LineAssembler::new();
        while let Some(chunk) = body.next().await {
            for line in assembler.push(&chunk?)? {
                batch.push_candidate(line);
            }
        }
        if let Some(last) = assembler.finish()? {
            batch.push_candidate(last);
        }

        debug!(
            route = route_name,
            log = log_name,
            from_line,
            count = batch.count,
            kept = batch.content.len(),
            "log lines received"
        );
        Ok(batch)
    }
}
