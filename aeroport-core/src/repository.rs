use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Flight, Passenger, Plane, PlaneModel, PlaneWithModel, Ticket};
use crate::CoreResult;

/// Persistence boundary for the booking service.
///
/// Relations are plain foreign keys; anything "related" is fetched through an
/// explicit lookup (`tickets_for_flight`, `get_plane_with_model`, ...).
/// Implementations must reject a second ticket for the same
/// (flight, passenger) pair with `CoreError::DuplicateBooking`.
#[async_trait]
pub trait AirportRepository: Send + Sync {
    async fn insert_plane_model(&self, model: &PlaneModel) -> CoreResult<()>;

    async fn get_plane_model(&self, id: Uuid) -> CoreResult<Option<PlaneModel>>;

    async fn insert_plane(&self, plane: &Plane) -> CoreResult<()>;

    async fn get_plane_with_model(&self, plane_id: Uuid) -> CoreResult<Option<PlaneWithModel>>;

    async fn insert_flight(&self, flight: &Flight) -> CoreResult<()>;

    async fn get_flight(&self, id: Uuid) -> CoreResult<Option<Flight>>;

    /// All flights ordered by scheduled take-off.
    async fn list_flights(&self) -> CoreResult<Vec<Flight>>;

    async fn update_flight_delay(
        &self,
        flight_id: Uuid,
        delay_seconds: Option<i64>,
        delay_reason: Option<&str>,
    ) -> CoreResult<()>;

    async fn update_booking_deadline(
        &self,
        flight_id: Uuid,
        closes_at: Option<DateTime<Utc>>,
    ) -> CoreResult<()>;

    async fn insert_passenger(&self, passenger: &Passenger) -> CoreResult<()>;

    async fn get_passenger(&self, id: Uuid) -> CoreResult<Option<Passenger>>;

    /// All passengers ordered by name.
    async fn list_passengers(&self) -> CoreResult<Vec<Passenger>>;

    async fn tickets_for_flight(&self, flight_id: Uuid) -> CoreResult<Vec<Ticket>>;

    /// Passengers holding a ticket on the flight, ordered by name.
    async fn passengers_on_flight(&self, flight_id: Uuid) -> CoreResult<Vec<Passenger>>;

    async fn insert_ticket(&self, ticket: &Ticket) -> CoreResult<()>;
}
