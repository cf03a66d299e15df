//! Error type for the HTTP layer and the JSON error envelope.
//!
//! Every failure leaves the server as
//! `{"error": {"code", "message", "details", "trace_id", "timestamp"}}`.

use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

const HIDDEN_INTERNAL_MESSAGE: &str = "An internal server error occurred";

#[derive(Error, Debug)]
pub enum AppError {
    /// A request the caller can fix or is not allowed to make.
    #[error("{status}: {message}")]
    Rejected {
        status: StatusCode,
        code: Cow<'static, str>,
        message: String,
        details: Vec<serde_json::Value>,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn rejected(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            code: Cow::Borrowed(code),
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// 400 with per-field details.
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::rejected(StatusCode::BAD_REQUEST, "validation_error", message).with_details(details)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::rejected(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::rejected(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::rejected(StatusCode::FORBIDDEN, "forbidden", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::rejected(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn conflict(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::rejected(StatusCode::CONFLICT, "conflict", message).with_details(details)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::rejected(StatusCode::NOT_IMPLEMENTED, "not_implemented", message)
    }

    /// Replace the machine-readable code, keeping status and message.
    /// Internal errors always report `internal_error`.
    pub fn with_code(mut self, new_code: &'static str) -> Self {
        if let AppError::Rejected { code, .. } = &mut self {
            *code = Cow::Borrowed(new_code);
        }
        self
    }

    pub fn with_details(mut self, new_details: Vec<serde_json::Value>) -> Self {
        if let AppError::Rejected { details, .. } = &mut self {
            *details = new_details;
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Rejected { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AppError::Rejected { code, .. } => code,
            AppError::Internal(_) => "internal_error",
        }
    }
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    details: Vec<serde_json::Value>,
    trace_id: Uuid,
    timestamp: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let trace_id = Uuid::new_v4();
        let status = self.status();
        let code = self.code().to_owned();

        let (message, details) = match self {
            AppError::Rejected {
                message, details, ..
            } => {
                tracing::debug!(%trace_id, %code, status = status.as_u16(), "request rejected");
                (message, details)
            }
            AppError::Internal(e) => {
                tracing::error!(%trace_id, status = status.as_u16(), error = ?e, "request failed");
                // Internal details stay in the logs for release builds.
                let message = if cfg!(debug_assertions) {
                    format!("{e:#}")
                } else {
                    HIDDEN_INTERNAL_MESSAGE.to_owned()
                };
                (message, Vec::new())
            }
        };

        let envelope = Envelope {
            error: ErrorBody {
                code: &code,
                message,
                details,
                trace_id,
                timestamp: OffsetDateTime::now_utc()
                    .format(&Rfc3339)
                    .unwrap_or_default(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}
