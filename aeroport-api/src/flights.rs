use aeroport_core::models::{Availability, Flight, FlightStatus, NewFlight, Passenger};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, put},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// A flight together with the values derived from its delay.
#[derive(Debug, Serialize)]
pub struct FlightView {
    #[serde(flatten)]
    pub flight: Flight,
    pub status: FlightStatus,
    pub expected_take_off: Option<DateTime<Utc>>,
    pub expected_landing: Option<DateTime<Utc>>,
}

impl From<Flight> for FlightView {
    fn from(flight: Flight) -> Self {
        FlightView {
            status: flight.status(),
            expected_take_off: flight.expected_take_off(),
            expected_landing: flight.expected_landing(),
            flight,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetDelayRequest {
    pub delay_minutes: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetBookingDeadlineRequest {
    pub closes_at: Option<DateTime<Utc>>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights", get(list_flights).post(schedule_flight))
        .route("/v1/flights/{id}", get(get_flight))
        .route("/v1/flights/{id}/availability", get(get_availability))
        .route("/v1/flights/{id}/passengers", get(list_flight_passengers))
        .route("/v1/flights/{id}/delay", put(set_delay))
        .route("/v1/flights/{id}/booking-deadline", put(set_booking_deadline))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/flights
async fn list_flights(State(state): State<AppState>) -> Result<Json<Vec<FlightView>>, AppError> {
    let flights = state.service.list_flights().await?;
    Ok(Json(flights.into_iter().map(FlightView::from).collect()))
}

/// POST /v1/flights
async fn schedule_flight(
    State(state): State<AppState>,
    Json(req): Json<NewFlight>,
) -> Result<(StatusCode, Json<FlightView>), AppError> {
    let flight = state.service.schedule_flight(req).await?;
    Ok((StatusCode::CREATED, Json(flight.into())))
}

/// GET /v1/flights/{id}
async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlightView>, AppError> {
    let flight = state.service.get_flight(id).await?;
    Ok(Json(flight.into()))
}

/// GET /v1/flights/{id}/availability
async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Availability>, AppError> {
    Ok(Json(state.service.availability(id).await?))
}

/// GET /v1/flights/{id}/passengers
async fn list_flight_passengers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Passenger>>, AppError> {
    Ok(Json(state.service.list_flight_passengers(id).await?))
}

/// PUT /v1/flights/{id}/delay
async fn set_delay(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetDelayRequest>,
) -> Result<Json<FlightView>, AppError> {
    let delay = Duration::try_minutes(req.delay_minutes)
        .ok_or_else(|| AppError::ValidationError("delay_minutes is out of range".to_string()))?;

    let flight = state
        .service
        .set_delay(id, delay, req.reason.as_deref())
        .await?;
    Ok(Json(flight.into()))
}

/// PUT /v1/flights/{id}/booking-deadline
async fn set_booking_deadline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetBookingDeadlineRequest>,
) -> Result<Json<FlightView>, AppError> {
    let flight = state.service.set_booking_deadline(id, req.closes_at).await?;
    Ok(Json(flight.into()))
}
