//! HTTP-facing error type.
//!
//! Every handler returns [`AppError`], rendered as
//! `{"error": <message>, "code": <machine code>, "details": {...}}` with the
//! matching status code. `details` is omitted when empty.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use tracing::error;

use crate::domain::ShortenError;

/// Error body returned by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "is_empty_details")]
    pub details: Value,
}

fn is_empty_details(details: &Value) -> bool {
    match details {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[derive(Debug)]
pub enum AppError {
    Validation {
        code: &'static str,
        message: String,
        details: Value,
    },
    NotFound {
        message: String,
        details: Value,
    },
    Conflict {
        code: &'static str,
        message: String,
        details: Value,
    },
    Internal {
        code: &'static str,
        message: String,
        details: Value,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            code: "validation_error",
            message: message.into(),
            details,
        }
    }

    pub fn not_found(details: Value) -> Self {
        Self::NotFound {
            message: "not found".to_string(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            code: "conflict",
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            code: "internal_error",
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            Self::Validation {
                code,
                message,
                details,
            }
            | Self::Conflict {
                code,
                message,
                details,
            }
            | Self::Internal {
                code,
                message,
                details,
            } => (*code, message, details),
            Self::NotFound { message, details } => ("not_found", message, details),
        };

        ErrorInfo {
            error: message.clone(),
            code,
            details: details.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.to_error_info();
        write!(f, "{} ({})", info.error, info.code)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_error_info())).into_response()
    }
}

impl From<ShortenError> for AppError {
    fn from(e: ShortenError) -> Self {
        let code = e.code();
        let message = e.to_string();

        match e {
            ShortenError::InvalidFormat(reason) | ShortenError::InvalidImageUrl(reason) => {
                Self::Validation {
                    code,
                    message,
                    details: json!({ "reason": reason }),
                }
            }
            ShortenError::SelfReferential(hostname) => Self::Validation {
                code,
                message,
                details: json!({ "hostname": hostname }),
            },
            ShortenError::AliasTooLong { len, max } => Self::Validation {
                code,
                message,
                details: json!({ "length": len, "max": max }),
            },
            ShortenError::AliasIllegalChars(alias) | ShortenError::AliasReserved(alias) => {
                Self::Validation {
                    code,
                    message,
                    details: json!({ "alias": alias }),
                }
            }
            ShortenError::AliasConflict(alias) => Self::Conflict {
                code,
                message,
                details: json!({ "alias": alias }),
            },
            ShortenError::NotFound(short) => Self::not_found(json!({ "short": short })),
            ShortenError::GeneratorExhausted { attempts } => {
                error!(attempts, "Short code generation exhausted");
                Self::Internal {
                    code,
                    message,
                    details: json!({ "attempts": attempts }),
                }
            }
            ShortenError::Persistence(source) => {
                error!(error = %source, "Storage failure");
                Self::Internal {
                    code,
                    message: "storage error".to_string(),
                    details: Value::Null,
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: serde_json::Map<String, Value> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), json!(messages))
            })
            .collect();

        Self::bad_request("invalid request", json!({ "fields": fields }))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            code: "invalid_json",
            message: "invalid json".to_string(),
            details: json!({ "reason": rejection.body_text() }),
        }
    }
}
