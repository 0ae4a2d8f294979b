use axum::{extract::State, response::Response, Json};
use tracing::info;

use crate::errors::AppError;
use crate::proposal::models::ClientInfo;
use crate::routes::pdf_attachment;
use crate::state::AppState;

/// `Acme Pvt Ltd` → `Acme_Pvt_Ltd.pdf`
pub fn letter_filename(name: &str) -> String {
    format!("{}.pdf", name.replace(' ', "_"))
}

/// POST /proposal_letter/details
pub async fn handle_proposal_letter(
    State(state): State<AppState>,
    Json(client): Json<ClientInfo>,
) -> Result<Response, AppError> {
    let name = client
        .display_name()
        .ok_or_else(|| AppError::Validation("client name is required".to_string()))?
        .to_string();

    let stamper = state.stamper.clone();
    let stamp_name = name.clone();
    let outcome = tokio::task::spawn_blocking(move || stamper.stamp(&stamp_name))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    info!(
        client = %name,
        insertions = outcome.insertions,
        bytes = outcome.bytes.len(),
        "Cover letter generated"
    );
    Ok(pdf_attachment(&letter_filename(&name), outcome.bytes))
}
