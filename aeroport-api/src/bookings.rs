use aeroport_core::models::Ticket;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BookFlightRequest {
    pub passenger_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/flights/{id}/bookings", post(book_flight))
}

/// POST /v1/flights/{id}/bookings
async fn book_flight(
    State(state): State<AppState>,
    Path(flight_id): Path<Uuid>,
    Json(req): Json<BookFlightRequest>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let ticket = state.service.book_flight(req.passenger_id, flight_id).await?;

    info!("Booking confirmed: flight {} passenger {}", ticket.flight_id, ticket.passenger_id);
    Ok((StatusCode::CREATED, Json(ticket)))
}
