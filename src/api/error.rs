//! Error taxonomy and the `{status, message, data}` response envelope.
//!
//! Every fallible path ends in an [`ApiError`] carrying exactly one [`ErrorKind`]
//! and a message that is safe to show to clients. Driver and codec details are
//! logged where the error is created and never rendered.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;
use tracing::error;

/// Message returned for every internal failure.
pub const INTERNAL_MESSAGE: &str = "something went wrong";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    UnprocessableEntity,
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    InternalServerError,
}

impl ErrorKind {
    /// Wire status for the kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn unprocessable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::UnprocessableEntity, message)
    }

    pub fn unauthenticated(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Log the details and return a generic internal error.
    pub fn internal(details: impl std::fmt::Display) -> Self {
        error!(error = %details, "internal error");
        Self::new(ErrorKind::InternalServerError, INTERNAL_MESSAGE)
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.kind.status()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Body shape shared by every response.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: u16,
    pub message: String,
    pub data: T,
}

/// Render a success envelope with the given status.
pub fn respond<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    let body = Envelope {
        status: status.as_u16(),
        message: message.to_string(),
        data,
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Envelope {
            status: status.as_u16(),
            message: self.message.into_owned(),
            data: (),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn kinds_map_to_fixed_statuses() {
        let table = [
            (ErrorKind::BadRequest, 400),
            (ErrorKind::UnprocessableEntity, 422),
            (ErrorKind::Unauthenticated, 401),
            (ErrorKind::Forbidden, 403),
            (ErrorKind::NotFound, 404),
            (ErrorKind::Conflict, 409),
            (ErrorKind::InternalServerError, 500),
        ];
        for (kind, status) in table {
            assert_eq!(kind.status().as_u16(), status, "{kind:?}");
        }
    }

    #[test]
    fn internal_hides_details() {
        let err = ApiError::internal("connection reset by peer");
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
        assert_eq!(err.message(), INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn error_renders_envelope_with_null_data() -> anyhow::Result<()> {
        let response = ApiError::forbidden("you're not authorized to access this todo")
            .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(payload["status"], 403);
        assert_eq!(
            payload["message"],
            "you're not authorized to access this todo"
        );
        assert!(payload["data"].is_null());
        Ok(())
    }

    #[tokio::test]
    async fn respond_wraps_data() -> anyhow::Result<()> {
        let response = respond(
            StatusCode::CREATED,
            "todo successfully added",
            serde_json::json!({"id": 7}),
        );
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(payload["status"], 201);
        assert_eq!(payload["data"]["id"], 7);
        Ok(())
    }
}
