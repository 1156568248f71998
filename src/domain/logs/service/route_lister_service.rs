use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::core::client::authenticated_fetch::AuthenticatedFetch;
use crate::core::client::transport::RawResponse;
use crate::core::stream::ndjson::ndjson_stream;
use crate::domain::logs::dto::file_descriptor::FileDescriptor;
use crate::errors::{decode_error, ClientResult, LogViewerError};

/// `/routes` is either a bare array or wrapped in `{status, entries}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RoutesPayload {
    Plain(Vec<String>),
    Wrapped { entries: Vec<String> },
}

/// Lists routes and streams the file descriptors of a route.
#[derive(Clone)]
pub struct RouteListerService {
    fetch: Arc<AuthenticatedFetch>,
}

impl RouteListerService {
    pub fn new(fetch: Arc<AuthenticatedFetch>) -> Self {
        Self { fetch }
    }

    /// Known route names, sorted.
    pub async fn list_routes(&self) -> ClientResult<Vec<String>> {
        let response = self.fetch.get("routes").await?;
        let response = ensure_success(response, "routes").await?;
        if response.body.is_none() {
            return Err(LogViewerError::NoContentError);
        }

        let text = response.text().await?;
        let mut routes = match serde_json::from_str::<RoutesPayload>(&text).map_err(decode_error)? {
            RoutesPayload::Plain(routes) => routes,
            RoutesPayload::Wrapped { entries } => entries,
        };
        routes.sort();

        debug!(count = routes.len(), "routes loaded");
        Ok(routes)
    }

    /// Lazy stream of the files of `route_name`, decoded as they arrive.
    /// Dropping the stream releases the response.
    pub async fn file_stream(
        &self,
        route_name: &str,
    ) -> ClientResult<BoxStream<'static, ClientResult<FileDescriptor>>> {
        let path = urlencoding::encode(route_name).into_owned();
        let response = self.fetch.get(&path).await?;
        let response = ensure_success(response, route_name).await?;
        let body = response.body.ok_or(LogViewerError::NoContentError)?;

        Ok(ndjson_stream::<FileDescriptor>(body))
    }

    /// Calls `on_record` once per file, in stream order, as soon as each
    /// record is complete. Returns the number of records delivered.
    pub async fn list_files<F>(&self, route_name: &str, mut on_record: F) -> ClientResult<usize>
    where
        F: FnMut(FileDescriptor),
    {
        let mut records = self.file_stream(route_name).await?;
        let mut delivered = 0;

        while let Some(record) = records.next().await {
            match record {
                Ok(file) => {
                    on_record(file);
                    delivered += 1;
                }
                Err(e) => {
                    error!(route = route_name, error = %e, delivered, "Could not load in logs for route");
                    return Err(e);
                }
            }
        }

        info!(route = route_name, delivered, "route listing complete");
        Ok(delivered)
    }
}

async fn ensure_success(response: RawResponse, what: &str) -> ClientResult<RawResponse> {
    let status = response.status;
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(%status, target_path = what, %body, "Server error listing");
    Err(LogViewerError::ServerError(status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::test_support::{MockResponse, MockTransport};
    use crate::core::client::token_store::StaticTokenStore;

    fn lister(responses: Vec<MockResponse>) -> (RouteListerService, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::with_responses(responses));
        let fetch = AuthenticatedFetch::new(
            transport.clone(),
            Arc::new(StaticTokenStore::new(None)),
            "http://logs",
            "/api",
        );
        (RouteListerService::new(Arc::new(fetch)), transport)
    }

    fn record(name: &str, size: u64) -> String {
        format!(
            "{{\"name\":\"{}\",\"size\":{},\"lastModified\":\"2024-01-01T00:00:00Z\"}}\n",
            name, size
        )
    }

    #[tokio::test]
    async fn test_callback_once_per_record_in_order() {
        let body: String = (0..25).map(|i| record(&format!("pod-{}.log", i), i * 100)).collect();
        // Odd chunk size so records straddle chunk boundaries
        let chunks: Vec<String> = body
            .as_bytes()
            .chunks(37)
            .map(|c| String::from_utf8(c.to_vec()).unwrap())
            .collect();
        let chunk_refs: Vec<&str> = chunks.iter().map(|s| s.as_str()).collect();
        let (svc, transport) = lister(vec![MockResponse::ok_chunks(&chunk_refs)]);

        let mut seen = Vec::new();
        let delivered = svc.list_files("route-a", |f| seen.push(f)).await.unwrap();

        assert_eq!(delivered, 25);
        assert_eq!(seen.len(), 25);
        for (i, file) in seen.iter().enumerate() {
            assert_eq!(file.name, format!("pod-{}.log", i));
            assert_eq!(file.size, i as u64 * 100);
        }
        assert_eq!(transport.urls(), vec!["http://logs/api/route-a"]);
    }

    #[tokio::test]
    async fn test_empty_route() {
        let (svc, _) = lister(vec![MockResponse::ok_chunks(&[])]);

        let mut calls = 0;
        assert_eq!(svc.list_files("empty", |_| calls += 1).await.unwrap(), 0);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_records_before_stream_error_are_delivered() {
        let first = record("a.log", 1);
        let (svc, _) = lister(vec![MockResponse::ok_chunks(&[first.as_str(), "{\"name\":\"b"]).with_stream_error()]);

        let mut seen = Vec::new();
        let err = svc.list_files("r", |f| seen.push(f.name)).await.unwrap_err();
        assert_eq!(seen, vec!["a.log"]);
        assert!(matches!(err, LogViewerError::TransportError(_)));
    }

    #[tokio::test]
    async fn test_request_failure_rejects() {
        let (svc, _) = lister(vec![MockResponse::status(503).with_body("down")]);

        let err = svc.list_files("r", |_| {}).await.unwrap_err();
        assert_eq!(err, LogViewerError::ServerError(503));
    }

    #[tokio::test]
    async fn test_file_stream_is_lazy_and_droppable() {
        let body = format!("{}{}", record("a.log", 1), record("b.log", 2));
        let (svc, _) = lister(vec![MockResponse::ok_chunks(&[body.as_str()])]);

        let mut stream = svc.file_stream("r").await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.name, "a.log");
        drop(stream);
    }

    #[tokio::test]
    async fn test_routes_sorted() {
        let (svc, transport) = lister(vec![MockResponse::ok_chunks(&["[\"zeta\",\"alpha\",\"mid\"]"])]);

        assert_eq!(svc.list_routes().await.unwrap(), vec!["alpha", "mid", "zeta"]);
        assert_eq!(transport.urls(), vec!["http://logs/api/routes"]);
    }

    #[tokio::test]
    async fn test_routes_wrapped_payload() {
        let (svc, _) = lister(vec![MockResponse::ok_chunks(&[
            "{\"status\":\"ok\",\"entries\":[\"b\",\"a\"]}",
        ])]);

        assert_eq!(svc.list_routes().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_routes_unauthorised() {
        let (svc, _) = lister(vec![MockResponse::status(401).with_body("login required")]);

        assert_eq!(svc.list_routes().await.unwrap_err(), LogViewerError::ServerError(401));
    }
}
