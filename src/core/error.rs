use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::shared::constants::{
    CANNOT_DELETE_SUBCATEGORY_CODE, CATEGORY_NOT_FOUND_CODE, METHOD_NOT_ALLOWED_CODE,
    UNEXPECTED_EXCEPTION_CODE, UNEXPECTED_EXCEPTION_MESSAGE, VALIDATION_EXCEPTION_CODE,
};
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    /// One entry per offending field, formatted as `[field: message]`
    #[error("Validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("{0}")]
    CannotDeleteSubcategory(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    pub fn category_not_found(id: i64) -> Self {
        AppError::NotFound(format!("Category not found for id: {}", id))
    }

    pub fn cannot_delete_subcategory(id: i64) -> Self {
        AppError::CannotDeleteSubcategory(format!(
            "Cannot delete subcategory directly for id: {}",
            id
        ))
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![format!("[{}: {}]", field, message.into())])
    }

    /// Wire code carried in the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => CATEGORY_NOT_FOUND_CODE,
            AppError::Validation(_) => VALIDATION_EXCEPTION_CODE,
            AppError::CannotDeleteSubcategory(_) => CANNOT_DELETE_SUBCATEGORY_CODE,
            AppError::MethodNotAllowed => METHOD_NOT_ALLOWED_CODE,
            AppError::Database(_) => UNEXPECTED_EXCEPTION_CODE,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = Vec::new();
        collect_field_errors(&errors, "", &mut details);
        details.sort();
        AppError::Validation(details)
    }
}

/// Flatten nested validator output into `[path: message]` entries
fn collect_field_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push(format!("[{}: {}]", path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UNEXPECTED_EXCEPTION_MESSAGE.to_string(),
                    None,
                )
            }
            AppError::NotFound(ref msg) => {
                tracing::error!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, msg.clone(), None)
            }
            AppError::Validation(ref details) => {
                tracing::error!("Validation failed: {:?}", details);
                (
                    StatusCode::BAD_REQUEST,
                    self.to_string(),
                    Some(details.clone()),
                )
            }
            AppError::CannotDeleteSubcategory(ref msg) => {
                tracing::error!("Rejected delete: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone(), None)
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
                None,
            ),
        };

        let body = Json(ApiResponse::<()>::error(code, Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
