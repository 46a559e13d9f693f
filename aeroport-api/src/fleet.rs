use aeroport_core::models::{NewPlaneModel, Plane, PlaneModel};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePlaneRequest {
    pub model_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/plane-models", post(create_plane_model))
        .route("/v1/planes", post(create_plane))
}

/// POST /v1/plane-models
async fn create_plane_model(
    State(state): State<AppState>,
    Json(req): Json<NewPlaneModel>,
) -> Result<(StatusCode, Json<PlaneModel>), AppError> {
    let model = state.service.create_plane_model(req).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

/// POST /v1/planes
async fn create_plane(
    State(state): State<AppState>,
    Json(req): Json<CreatePlaneRequest>,
) -> Result<(StatusCode, Json<Plane>), AppError> {
    let plane = state.service.create_plane(req.model_id).await?;
    Ok((StatusCode::CREATED, Json(plane)))
}
