use http::StatusCode;
use tracing::error;

use crate::errors::LogViewerError;

/// User-facing text for a failed call. Diagnostic detail goes to the log,
/// never into the returned string.
pub fn format_error(err: &LogViewerError, brief: bool) -> String {
    match err {
        LogViewerError::ServerError(status) => {
            let detail = if brief {
                "See console".to_string()
            } else {
                StatusCode::from_u16(*status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown status")
                    .to_string()
            };
            format!("Server error {}: {}", status, detail)
        }
        LogViewerError::TransportError(detail) => {
            error!(%detail, "Failed request");
            if brief {
                "No response".to_string()
            } else {
                "No response from server. See console log for more details.".to_string()
            }
        }
        LogViewerError::RequestSetupError(detail) => {
            error!(%detail, "Error setting up request");
            if brief {
                "Couldn't send".to_string()
            } else {
                "Unable to set up request. See console log for more details.".to_string()
            }
        }
        other => {
            if brief {
                "See console".to_string()
            } else {
                other.to_string()
            }
        }
    }
}

/// 401/403 mean the stored token is missing or stale.
pub fn is_not_logged_in(err: &LogViewerError) -> bool {
    matches!(err.status(), Some(401 | 403))
}
