use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::finalize::{FinalizeError, PostProcessError};
use crate::pdf::PdfError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document could not be opened: {0}")]
    DocumentOpen(String),

    #[error("Template could not be loaded: {0}")]
    TemplateLoad(String),

    #[error("Font could not be loaded: {0}")]
    FontLoad(String),

    #[error("External tool missing: {0}")]
    ExternalToolMissing(String),

    #[error("Finalization failed: {0}")]
    Finalization(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PdfError> for AppError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Open { .. } => AppError::DocumentOpen(err.to_string()),
            PdfError::FontLoad { .. } => AppError::FontLoad(err.to_string()),
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<FinalizeError> for AppError {
    fn from(err: FinalizeError) -> Self {
        match err {
            FinalizeError::Proposal(_) => AppError::DocumentOpen(err.to_string()),
            FinalizeError::Terms(_) => AppError::TemplateLoad(err.to_string()),
            FinalizeError::Font(_) => AppError::FontLoad(err.to_string()),
            FinalizeError::PostProcess(PostProcessError::NotFound { .. }) => {
                AppError::ExternalToolMissing(err.to_string())
            }
            FinalizeError::PostProcess(_) | FinalizeError::Compose(_) => {
                AppError::Finalization(err.to_string())
            }
            FinalizeError::Io(_) | FinalizeError::Task(_) => AppError::Internal(err.into()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::DocumentOpen(msg) => {
                tracing::error!("Document open error: {msg}");
                (
                    "DOCUMENT_OPEN_ERROR",
                    "The PDF document could not be opened".to_string(),
                )
            }
            AppError::TemplateLoad(msg) => {
                tracing::error!("Template load error: {msg}");
                (
                    "TEMPLATE_LOAD_ERROR",
                    "A document template could not be loaded".to_string(),
                )
            }
            AppError::FontLoad(msg) => {
                tracing::error!("Font load error: {msg}");
                ("FONT_LOAD_ERROR", "A font could not be loaded".to_string())
            }
            AppError::ExternalToolMissing(msg) => {
                tracing::error!("External tool missing: {msg}");
                (
                    "EXTERNAL_TOOL_MISSING",
                    "A required PDF tool is not installed".to_string(),
                )
            }
            AppError::Finalization(msg) => {
                tracing::error!("Finalization error: {msg}");
                (
                    "FINALIZATION_ERROR",
                    "The proposal could not be finalized".to_string(),
                )
            }
            AppError::Catalog(e) => {
                tracing::error!("Catalog error: {e}");
                (
                    "CATALOG_ERROR",
                    "The service catalog could not be accessed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}
