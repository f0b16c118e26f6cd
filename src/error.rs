use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

/// Failure reported by a remote collaborator, with the upstream status
/// preserved so it can be passed through to the caller.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UpstreamFailure {
    pub status: Option<u16>,
    pub message: String,
}

/// Error taxonomy of the aggregation layer.
///
/// Upstream failures are propagated essentially unmodified; nothing
/// here retries, and only metadata enrichment is allowed to swallow a
/// failure (it does so before an `Error` is ever constructed).
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotImplemented(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// A workflow expectation did not hold (missing identifier,
    /// unresolvable resource group, absent binding).
    #[error("{0}")]
    Invariant(String),
    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Invariant(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Upstream { status, .. } => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<UpstreamFailure>() {
            Ok(upstream) => Error::Upstream {
                status: upstream.status,
                message: upstream.message,
            },
            Err(other) => Error::Upstream {
                status: None,
                message: format!("{other:#}"),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            log::error!("{status}: {message}");
        } else {
            log::warn!("{status}: {message}");
        }
        (status, Json(ErrorResponse::new(&message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_passes_through() {
        let err = Error::from(anyhow::Error::new(UpstreamFailure {
            status: Some(404),
            message: "instance not found".to_string(),
        }));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "instance not found");
    }

    #[test]
    fn plain_anyhow_maps_to_internal_error() {
        let err = Error::from(anyhow::anyhow!("socket closed"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn taxonomy_status_codes() {
        assert_eq!(
            Error::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::NotImplemented("x".into()).status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
    }
}
