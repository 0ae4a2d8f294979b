use axum::Json;
use tracing::info;

use crate::errors::AppError;
use crate::proposal::models::{NormalizedProposal, ProposalRequest};
use crate::proposal::normalizer::normalize;

/// POST /proposal
pub async fn handle_compute_proposal(
    Json(req): Json<ProposalRequest>,
) -> Result<Json<NormalizedProposal>, AppError> {
    let normalized = normalize(req.client, req.proposal, req.services);
    info!(
        count = normalized.summary.count,
        total = normalized.summary.total,
        "Proposal computed"
    );
    Ok(Json(normalized))
}
