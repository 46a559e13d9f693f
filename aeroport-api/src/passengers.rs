use aeroport_core::models::Passenger;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterPassengerRequest {
    pub name: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/passengers", get(list_passengers).post(register_passenger))
}

/// GET /v1/passengers
async fn list_passengers(State(state): State<AppState>) -> Result<Json<Vec<Passenger>>, AppError> {
    Ok(Json(state.service.list_passengers().await?))
}

/// POST /v1/passengers
async fn register_passenger(
    State(state): State<AppState>,
    Json(req): Json<RegisterPassengerRequest>,
) -> Result<(StatusCode, Json<Passenger>), AppError> {
    let passenger = state.service.register_passenger(&req.name).await?;
    Ok((StatusCode::CREATED, Json(passenger)))
}
