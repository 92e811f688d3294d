use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

use crate::constants::{LOGIN_ROUTE, SETUP_ROUTE};

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    NotFound(String),
    SetupRequired,
    UnauthorizedAccess,
    AuthRejected(String),
    ConfirmationRequired(String),
    TooManyRequests(u64),
    BackendFailure(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::SetupRequired => write!(f, "Setup required: the site backend is not configured yet"),
            AppError::UnauthorizedAccess => write!(f, "Please sign in to continue"),
            AppError::AuthRejected(msg) => write!(f, "{}", msg),
            AppError::ConfirmationRequired(msg) => write!(f, "Confirmation required: {}", msg),
            AppError::TooManyRequests(secs) => write!(f, "Too many attempts, try again in {} seconds", secs),
            AppError::BackendFailure(msg) => write!(f, "{}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors
                })
            }
            AppError::SetupRequired => {
                serde_json::json!({
                    "error": self.to_string(),
                    "setup_url": SETUP_ROUTE
                })
            }
            AppError::UnauthorizedAccess => {
                serde_json::json!({
                    "error": self.to_string(),
                    "redirect": LOGIN_ROUTE
                })
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::TooManyRequests(secs) = self {
            builder.insert_header(("Retry-After", secs.to_string()));
        }
        builder
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SetupRequired => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UnauthorizedAccess => StatusCode::UNAUTHORIZED,
            AppError::AuthRejected(_) => StatusCode::BAD_REQUEST,
            AppError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::BackendFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(field_errors(&errors))
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotConfigured => AppError::SetupRequired,
            DataError::NotFound => AppError::NotFound("Project not found".into()),
            other => AppError::BackendFailure(other.user_message().to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotConfigured => AppError::SetupRequired,
            AuthError::Rejected(msg) => AppError::AuthRejected(msg),
            _ => AppError::BackendFailure("An unexpected error occurred".into()),
        }
    }
}

/// Flattens validator output into `field: message` pairs for the client.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(|e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect()
}

/// Failures of the hosted data API, kept apart by kind so the logs can tell
/// a missing configuration from a missing row or a flaky network.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum DataError {
    #[display("Data backend is not configured")]
    NotConfigured,

    #[display("Record not found")]
    NotFound,

    #[display("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[display("Transient backend failure: {_0}")]
    Transient(String),

    #[display("Malformed backend payload: {_0}")]
    Decode(String),
}

impl DataError {
    pub fn kind(&self) -> &'static str {
        match self {
            DataError::NotConfigured => "config_absent",
            DataError::NotFound => "not_found",
            DataError::Rejected { .. } => "rejected",
            DataError::Transient(_) => "transient",
            DataError::Decode(_) => "decode",
        }
    }

    /// Plain-language summary shown next to the form that triggered it.
    pub fn user_message(&self) -> &'static str {
        match self {
            DataError::NotConfigured => "The site backend is not configured yet",
            DataError::NotFound => "That project no longer exists",
            DataError::Rejected { status: 401 | 403, .. } => "You are not allowed to change this project",
            DataError::Rejected { .. } => "The project could not be saved, please check the form",
            DataError::Transient(_) | DataError::Decode(_) => "The project service is unavailable, please try again",
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::Decode(err.to_string())
        } else {
            DataError::Transient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Decode(err.to_string())
    }
}

#[derive(Debug, Display, Clone, PartialEq)]
pub enum AuthError {
    #[display("Auth backend is not configured")]
    NotConfigured,

    #[display("{_0}")]
    Rejected(String),

    #[display("Auth backend unavailable: {_0}")]
    Transient(String),

    #[display("Malformed auth payload: {_0}")]
    Decode(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::Decode(err.to_string())
        } else {
            AuthError::Transient(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
