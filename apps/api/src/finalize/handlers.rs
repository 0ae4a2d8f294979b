use axum::{
    extract::{Multipart, State},
    response::Response,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::finalize::params::FinalizationParams;
use crate::routes::pdf_attachment;
use crate::state::AppState;

/// POST /proposal/finalize
///
/// Multipart body: a `params` part holding `FinalizationParams` as JSON and a
/// `file` part holding the proposal PDF.
pub async fn handle_finalize(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut params: Option<FinalizationParams> = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        match field.name().map(str::to_string).as_deref() {
            Some("params") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable params part: {e}")))?;
                params = Some(
                    serde_json::from_str(&raw)
                        .map_err(|e| AppError::Validation(format!("invalid params: {e}")))?,
                );
            }
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable file part: {e}")))?;
                file = Some(bytes);
            }
            _ => {}
        }
    }

    let file = file
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::Validation("a non-empty `file` part is required".to_string()))?;
    let params = params.unwrap_or_default();
    let filename = params.output_filename();

    let job_id = Uuid::new_v4();
    let span = info_span!("finalize", %job_id);
    let finalized = state
        .finalizer
        .finalize(file.to_vec(), params)
        .instrument(span.clone())
        .await?;
    let page_count = finalized.page_count;
    let bytes = finalized
        .into_bytes()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    span.in_scope(|| info!(page_count, bytes = bytes.len(), "Finalized proposal sent"));
    Ok(pdf_attachment(&filename, bytes))
}
