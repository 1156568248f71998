use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::config::ClientConfig;
use crate::core::client::reqwest_transport::ReqwestTransport;
use crate::core::client::token_store::TokenStore;
use crate::core::client::transport::{HttpTransport, RawResponse};
use crate::errors::{ClientResult, LogViewerError};

/// Wraps a transport with bearer-token attachment and deployment-root path
/// resolution. Every request of the client goes through here.
#[derive(Clone)]
pub struct AuthenticatedFetch {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    base_url: String,
    deployment_root: String,
}

impl AuthenticatedFetch {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
        base_url: impl Into<String>,
        deployment_root: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            tokens,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            deployment_root: normalize_root(&deployment_root.into()),
        }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::new(
            Arc::new(transport),
            config.token_store(),
            config.base_url.clone(),
            config.deployment_root.clone(),
        ))
    }

    /// Roots `path` at the deployment root unless it already is.
    pub fn resolve_path(&self, path: &str) -> String {
        if !self.deployment_root.is_empty() && path.starts_with(&self.deployment_root) {
            return path.to_string();
        }
        format!("{}/{}", self.deployment_root, path.trim_start_matches('/'))
    }

    pub fn resolve_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, self.resolve_path(path))
    }

    pub async fn get(&self, path: &str) -> ClientResult<RawResponse> {
        let url = self.resolve_url(path);

        let mut headers = HeaderMap::new();
        match self.tokens.token() {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| LogViewerError::RequestSetupError(format!("invalid token: {}", e)))?;
                headers.insert(AUTHORIZATION, value);
            }
            None => debug!("No local access token, performing request without it"),
        }

        debug!(%url, "GET");
        self.transport.get(&url, headers).await
    }
}

/// `""`, `"/"` → `""`; `"api/"` → `"/api"`.
fn normalize_root(root: &str) -> String {
    let trimmed = root.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::test_support::{MockResponse, MockTransport};
    use crate::core::client::token_store::StaticTokenStore;

    fn fetch_with(transport: Arc<MockTransport>, token: Option<&str>, root: &str) -> AuthenticatedFetch {
        AuthenticatedFetch::new(
            transport,
            Arc::new(StaticTokenStore::new(token.map(String::from))),
            "http://logs.example.com/",
            root,
        )
    }

    #[test]
    fn test_resolve_path_roots_relative_paths() {
        let fetch = fetch_with(Arc::new(MockTransport::default()), None, "/api");
        assert_eq!(fetch.resolve_path("routes"), "/api/routes");
        assert_eq!(fetch.resolve_path("/routes"), "/api/routes");
        assert_eq!(fetch.resolve_path("/api/routes"), "/api/routes");
        assert_eq!(fetch.resolve_url("routes"), "http://logs.example.com/api/routes");
    }

    #[test]
    fn test_resolve_path_with_empty_root() {
        let fetch = fetch_with(Arc::new(MockTransport::default()), None, "/");
        assert_eq!(fetch.resolve_path("routes"), "/routes");
        assert_eq!(fetch.resolve_url("a/b?fromLine=3"), "http://logs.example.com/a/b?fromLine=3");
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize_root(""), "");
        assert_eq!(normalize_root("/"), "");
        assert_eq!(normalize_root("api/"), "/api");
        assert_eq!(normalize_root("/logs/api"), "/logs/api");
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::status(200)]));
        let fetch = fetch_with(transport.clone(), Some("abc123"), "/api");

        let resp = fetch.get("routes").await.unwrap();
        assert_eq!(resp.status.as_u16(), 200);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://logs.example.com/api/routes");
        assert_eq!(requests[0].headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
    }

    #[tokio::test]
    async fn test_no_token_sends_no_authorization() {
        let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::status(200)]));
        let fetch = fetch_with(transport.clone(), None, "/api");

        fetch.get("routes").await.unwrap();
        assert!(transport.requests()[0].headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = Arc::new(MockTransport::failing(LogViewerError::TransportError("refused".into())));
        let fetch = fetch_with(transport, None, "/api");

        let err = fetch.get("routes").await.unwrap_err();
        assert_eq!(err, LogViewerError::TransportError("refused".into()));
    }
}
