use crate::models::common::{ApiResponse, FieldError};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::DbErr;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Replace a store error with a fixed public message. The store error is
    /// logged here and never reaches the client.
    pub fn masked(self, message: &str) -> AppError {
        match self {
            AppError::DatabaseError(err) => {
                log::error!("{message}: {err}");
                AppError::OperationFailed(message.to_string())
            }
            other => other,
        }
    }
}

/// Flatten nested validator output into `[{field, code, message}]`.
pub fn validation_error_list(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_validation_errors("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_validation_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    out.push(FieldError {
                        field: path.clone(),
                        code: e.code.to_string(),
                        message: e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{path} is invalid")),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_validation_errors(&format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                ("VALIDATION_ERROR", msg.clone())
            }
            AppError::InvalidPayload(errors) => {
                log::warn!("Invalid payload: {} field(s) rejected", errors.errors().len());
                let body = ApiResponse::failure("VALIDATION_ERROR", "Validation failed")
                    .with_field_errors(validation_error_list(errors));
                return HttpResponse::build(self.status_code()).json(body);
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                ("DATABASE_ERROR", err.to_string())
            }
            AppError::EncryptionError(msg) => {
                log::error!("Encryption error: {msg}");
                (
                    "ENCRYPTION_ERROR",
                    "Failed to process sensitive fields".to_string(),
                )
            }
            AppError::TransactionFailed(msg) => {
                log::error!("Transaction failed: {msg}");
                ("TRANSACTION_FAILED", msg.clone())
            }
            AppError::OperationFailed(msg) => ("OPERATION_FAILED", msg.clone()),
            AppError::ConfigError(msg) => {
                log::error!("Config error: {msg}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(ApiResponse::failure(error_code, message))
    }
}
