use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogViewerError {
    #[error("Server error: {0}")]
    ServerError(u16),

    #[error("Response carried no content")]
    NoContentError,

    #[error("Stream decode error: {0}")]
    StreamDecodeError(String),

    #[error("Redirect response carried no Location header")]
    MissingLocationError,

    #[error("No response from server: {0}")]
    TransportError(String),

    #[error("Unable to set up request: {0}")]
    RequestSetupError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ClientResult<T> = Result<T, LogViewerError>;

/// Helper for mapping any decoding failure into a stream decode error
pub fn decode_error<E: ToString>(err: E) -> LogViewerError {
    LogViewerError::StreamDecodeError(err.to_string())
}

impl LogViewerError {
    pub fn status(&self) -> Option<u16> {
        match self {
            LogViewerError::ServerError(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LogViewerError {
    fn from(err: reqwest::Error) -> Self {
        // Builder errors never reach the wire; everything else is a transport failure
        if err.is_builder() {
            LogViewerError::RequestSetupError(err.to_string())
        } else if err.is_decode() {
            LogViewerError::StreamDecodeError(err.to_string())
        } else {
            LogViewerError::TransportError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_server_errors() {
        assert_eq!(LogViewerError::ServerError(404).status(), Some(404));
        assert_eq!(LogViewerError::NoContentError.status(), None);
    }

    #[test]
    fn test_decode_error_keeps_message() {
        let err = decode_error("bad byte at 3");
        assert_eq!(err, LogViewerError::StreamDecodeError("bad byte at 3".into()));
        assert_eq!(err.to_string(), "Stream decode error: bad byte at 3");
    }
}
