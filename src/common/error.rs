// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use thiserror::Error;

use crate::i18n::I18nStore;
use crate::middleware::i18n::Locale;

/// Internal error type. Services and repositories return this; handlers
/// translate it into an [`ApiError`] with the caller's locale.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Missing or invalid session.
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    /// Policy denies the action, or an ownership check failed.
    #[error("forbidden")]
    Forbidden,

    /// Entity missing. Carries the i18n key suffix, e.g. "inquiry".
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate active approval / duplicate calculation / transition from
    /// the wrong state. Carries the i18n key suffix.
    #[error("conflict: {0}")]
    Conflict(&'static str),

    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("jwt error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::JwtError(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Dot-path into the locale files.
    fn i18n_key(&self) -> String {
        match self {
            AppError::ValidationError(_) => "errors.validation".into(),
            AppError::Unauthorized | AppError::JwtError(_) => "errors.unauthorized".into(),
            AppError::InvalidCredentials => "errors.invalid_credentials".into(),
            AppError::Forbidden => "errors.forbidden".into(),
            AppError::NotFound(what) => format!("errors.not_found.{what}"),
            AppError::Conflict(what) => format!("errors.conflict.{what}"),
            AppError::EmailAlreadyExists => "errors.email_exists".into(),
            _ => "errors.internal".into(),
        }
    }

    /// Field-level detail for validation errors: field -> [message codes].
    fn details(&self) -> Option<Value> {
        if let AppError::ValidationError(errors) = self {
            let mut details: HashMap<String, Vec<String>> = HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(field.to_string(), messages);
            }
            return serde_json::to_value(details).ok();
        }
        None
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Full error server-side only; the client gets a generic message.
            tracing::error!("internal server error: {self:?}");
        }
        ApiError {
            status,
            error: store.translate(&locale.0, &self.i18n_key()),
            details: self.details(),
        }
    }
}

// Fallback for places without a Locale (middleware rejections). English only.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal server error: {self:?}");
        }
        let message = match &self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::JwtError(_) => {
                "Unauthorized"
            }
            AppError::Forbidden => "Forbidden",
            AppError::NotFound(_) => "Not found",
            AppError::ValidationError(_) => "One or more fields are invalid",
            AppError::Conflict(_) => "Conflict",
            AppError::EmailAlreadyExists => "This e-mail is already in use",
            _ => "An unexpected error occurred",
        };
        let body = Json(json!({ "error": message, "details": self.details() }));
        (status, body).into_response()
    }
}

/// Localized, wire-ready error. This is what handlers return.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error,
            "details": self.details,
        }));
        (self.status, body).into_response()
    }
}
