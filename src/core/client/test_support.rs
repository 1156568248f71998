//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::core::client::transport::{HttpTransport, RawResponse};
use crate::errors::{ClientResult, LogViewerError};

pub struct MockResponse {
    status: u16,
    headers: Vec<(&'static str, String)>,
    chunks: Option<Vec<ClientResult<Vec<u8>>>>,
}

impl MockResponse {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            chunks: Some(Vec::new()),
        }
    }

    pub fn ok_chunks(chunks: &[&str]) -> Self {
        Self::status(200).with_chunks(chunks)
    }

    pub fn with_chunks(mut self, chunks: &[&str]) -> Self {
        self.chunks = Some(chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect());
        self
    }

    pub fn with_raw_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = Some(chunks.into_iter().map(Ok).collect());
        self
    }

    pub fn with_body(self, body: &str) -> Self {
        self.with_chunks(&[body])
    }

    pub fn without_body(mut self) -> Self {
        self.chunks = None;
        self
    }

    pub fn with_stream_error(mut self) -> Self {
        self.chunks
            .get_or_insert_with(Vec::new)
            .push(Err(LogViewerError::TransportError("connection reset".into())));
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    fn into_raw(self) -> RawResponse {
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(&value).unwrap(),
            );
        }

        let body = self.chunks.map(|chunks| {
            futures::stream::iter(chunks.into_iter().map(|c| c.map(Bytes::from))).boxed()
        });

        RawResponse {
            status: StatusCode::from_u16(self.status).unwrap(),
            headers,
            body,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: HeaderMap,
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<ClientResult<MockResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn with_responses(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: LogViewerError) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([Err(err)])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> ClientResult<RawResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers,
        });

        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no mock response queued");

        next.map(MockResponse::into_raw)
    }
}
