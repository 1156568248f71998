use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use http::{HeaderMap, StatusCode};
use reqwest::{redirect, Client};
use tracing::{debug, warn};

use crate::core::client::transport::{HttpTransport, RawResponse};
use crate::errors::{ClientResult, LogViewerError};

/// `HttpTransport` backed by a shared reqwest client.
///
/// Redirects are never followed: the job-name resolver reads `Location`
/// from the 308 itself.
///
/// `request_timeout` bounds connecting, waiting for response headers and
/// each read of the body. A long NDJSON body survives as long as chunks
/// keep arriving.
pub struct ReqwestTransport {
    client: Client,
    request_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(request_timeout)
            .read_timeout(request_timeout)
            .build()
            .map_err(|e| LogViewerError::RequestSetupError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, request_timeout })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> ClientResult<RawResponse> {
        let send = self.client.get(url).headers(headers).send();
        let resp = match tokio::time::timeout(self.request_timeout, send).await {
            Ok(resp) => resp?,
            Err(_) => {
                warn!(%url, timeout = ?self.request_timeout, "no response before timeout");
                return Err(LogViewerError::TransportError(format!(
                    "no response from {} within {:?}",
                    url, self.request_timeout
                )));
            }
        };

        let status = resp.status();
        let headers = resp.headers().clone();
        debug!(%url, %status, "response received");

        let body = if is_null_body_status(status) {
            None
        } else {
            Some(
                resp.bytes_stream()
                    .map(|chunk| chunk.map_err(LogViewerError::from))
                    .boxed(),
            )
        };

        Ok(RawResponse { status, headers, body })
    }
}

/// Statuses that never carry a body on the wire.
fn is_null_body_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 101 | 103 | 204 | 205 | 304)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_body_statuses() {
        assert!(is_null_body_status(StatusCode::NO_CONTENT));
        assert!(is_null_body_status(StatusCode::NOT_MODIFIED));
        assert!(!is_null_body_status(StatusCode::OK));
        assert!(!is_null_body_status(StatusCode::PERMANENT_REDIRECT));
    }

    #[test]
    fn test_build_transport() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }
}
