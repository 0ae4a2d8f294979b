use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::catalog::models::{Facets, NewService, ServiceFilter, ServiceRecord};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /services
pub async fn handle_list_services(
    State(state): State<AppState>,
    Query(filter): Query<ServiceFilter>,
) -> Result<Json<Vec<ServiceRecord>>, AppError> {
    Ok(Json(state.catalog.search(&filter).await?))
}

/// GET /services/facets
pub async fn handle_service_facets(State(state): State<AppState>) -> Result<Json<Facets>, AppError> {
    Ok(Json(state.catalog.facets().await?))
}

/// POST /services
pub async fn handle_create_service(
    State(state): State<AppState>,
    Json(new): Json<NewService>,
) -> Result<(StatusCode, Json<ServiceRecord>), AppError> {
    new.validate().map_err(AppError::Validation)?;
    let record = state.catalog.append(new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
