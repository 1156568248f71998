use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use http::{HeaderMap, StatusCode};

use crate::errors::ClientResult;

/// Response body as a chunked byte stream.
pub type ByteStream = BoxStream<'static, ClientResult<Bytes>>;

/// A response whose body has not been read yet.
///
/// `body` is `None` when the server sent no body at all, which is distinct
/// from an empty body.
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<ByteStream>,
}

impl RawResponse {
    /// Header value as a string, if present and valid visible ASCII.
    pub fn header_str(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }

    /// Drains the body as text (lossy). Only used for diagnostics.
    pub async fn text(self) -> ClientResult<String> {
        let Some(mut body) = self.body else {
            return Ok(String::new());
        };

        let mut buf = Vec::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// The HTTP seam. Implementations must not follow redirects.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, headers: HeaderMap) -> ClientResult<RawResponse>;
}
