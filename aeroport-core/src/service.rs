use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    Availability, Flight, NewFlight, NewPlaneModel, Passenger, Plane, PlaneModel, PlaneWithModel,
    Ticket,
};
use crate::repository::AirportRepository;
use crate::{CoreError, CoreResult};

/// Booking rules on top of an `AirportRepository`.
#[derive(Clone)]
pub struct BookingService {
    repo: Arc<dyn AirportRepository>,
}

impl BookingService {
    pub fn new(repo: Arc<dyn AirportRepository>) -> Self {
        Self { repo }
    }

    // ------------------------------------------------------------------------
    // Fleet & schedule
    // ------------------------------------------------------------------------

    pub async fn create_plane_model(&self, req: NewPlaneModel) -> CoreResult<PlaneModel> {
        let name = require_text("name", &req.name)?;
        if req.capacity < 0 {
            return Err(CoreError::ValidationError("capacity must not be negative".to_string()));
        }
        if !req.max_speed.is_finite() || req.max_speed <= 0.0 {
            return Err(CoreError::ValidationError("max_speed must be positive".to_string()));
        }

        let model = PlaneModel {
            id: Uuid::new_v4(),
            name,
            max_speed: req.max_speed,
            capacity: req.capacity,
        };
        self.repo.insert_plane_model(&model).await?;
        info!(model_id = %model.id, capacity = model.capacity, "Plane model created");
        Ok(model)
    }

    pub async fn create_plane(&self, model_id: Uuid) -> CoreResult<Plane> {
        if self.repo.get_plane_model(model_id).await?.is_none() {
            return Err(CoreError::not_found("Plane model", model_id));
        }

        let plane = Plane { id: Uuid::new_v4(), model_id };
        self.repo.insert_plane(&plane).await?;
        info!(plane_id = %plane.id, %model_id, "Plane registered");
        Ok(plane)
    }

    pub async fn schedule_flight(&self, req: NewFlight) -> CoreResult<Flight> {
        let flight_name = require_text("flight_name", &req.flight_name)?;
        let origin = require_text("origin", &req.origin)?;
        let destination = require_text("destination", &req.destination)?;
        if req.landing <= req.take_off {
            return Err(CoreError::ValidationError(
                "landing must be after take_off".to_string(),
            ));
        }
        if self.repo.get_plane_with_model(req.plane_id).await?.is_none() {
            return Err(CoreError::not_found("Plane", req.plane_id));
        }

        let flight = Flight {
            id: Uuid::new_v4(),
            flight_name,
            take_off: req.take_off,
            landing: req.landing,
            origin,
            destination,
            delay_seconds: None,
            delay_reason: None,
            plane_id: req.plane_id,
            booking_closes_at: req.booking_closes_at,
        };
        self.repo.insert_flight(&flight).await?;
        info!(flight_id = %flight.id, flight_name = %flight.flight_name, "Flight scheduled");
        Ok(flight)
    }

    pub async fn get_flight(&self, flight_id: Uuid) -> CoreResult<Flight> {
        self.repo
            .get_flight(flight_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Flight", flight_id))
    }

    pub async fn list_flights(&self) -> CoreResult<Vec<Flight>> {
        self.repo.list_flights().await
    }

    // ------------------------------------------------------------------------
    // Passengers
    // ------------------------------------------------------------------------

    pub async fn register_passenger(&self, name: &str) -> CoreResult<Passenger> {
        let passenger = Passenger {
            id: Uuid::new_v4(),
            name: require_text("name", name)?,
        };
        self.repo.insert_passenger(&passenger).await?;
        info!(passenger_id = %passenger.id, "Passenger registered");
        Ok(passenger)
    }

    pub async fn list_passengers(&self) -> CoreResult<Vec<Passenger>> {
        self.repo.list_passengers().await
    }

    pub async fn list_flight_passengers(&self, flight_id: Uuid) -> CoreResult<Vec<Passenger>> {
        self.get_flight(flight_id).await?;
        self.repo.passengers_on_flight(flight_id).await
    }

    // ------------------------------------------------------------------------
    // Booking
    // ------------------------------------------------------------------------

    pub async fn book_flight(&self, passenger_id: Uuid, flight_id: Uuid) -> CoreResult<Ticket> {
        self.book_flight_at(passenger_id, flight_id, Utc::now()).await
    }

    /// Issues a ticket as of `now`.
    ///
    /// Checks run in a fixed order: sales window, seat count, then existing
    /// ticket. A full flight reports `CapacityExceeded` even for a passenger
    /// who is already on it.
    pub async fn book_flight_at(
        &self,
        passenger_id: Uuid,
        flight_id: Uuid,
        now: DateTime<Utc>,
    ) -> CoreResult<Ticket> {
        let flight = self.get_flight(flight_id).await?;
        if self.repo.get_passenger(passenger_id).await?.is_none() {
            return Err(CoreError::not_found("Passenger", passenger_id));
        }

        if let Some(closed_at) = flight.booking_closes_at {
            if now >= closed_at {
                warn!(%flight_id, %passenger_id, "Booking rejected: sales closed");
                return Err(CoreError::BookingClosed { flight_id, closed_at });
            }
        }

        let PlaneWithModel { model, .. } = self.plane_for(&flight).await?;
        let tickets = self.repo.tickets_for_flight(flight_id).await?;
        debug!(%flight_id, booked = tickets.len(), capacity = model.capacity, "Checking seats");

        if tickets.len() as i64 >= i64::from(model.capacity) {
            warn!(%flight_id, %passenger_id, "Booking rejected: flight full");
            return Err(CoreError::CapacityExceeded { flight_id, capacity: model.capacity });
        }

        if tickets.iter().any(|t| t.passenger_id == passenger_id) {
            warn!(%flight_id, %passenger_id, "Booking rejected: already ticketed");
            return Err(CoreError::DuplicateBooking { flight_id, passenger_id });
        }

        let ticket = Ticket { flight_id, passenger_id, issued_at: now };
        self.repo.insert_ticket(&ticket).await?;

        info!(%flight_id, %passenger_id, "Ticket issued");
        Ok(ticket)
    }

    pub async fn availability(&self, flight_id: Uuid) -> CoreResult<Availability> {
        let flight = self.get_flight(flight_id).await?;
        let PlaneWithModel { model, .. } = self.plane_for(&flight).await?;
        let booked = i32::try_from(self.repo.tickets_for_flight(flight_id).await?.len())
            .unwrap_or(i32::MAX);

        Ok(Availability {
            flight_id,
            capacity: model.capacity,
            booked,
            remaining: (model.capacity - booked).max(0),
        })
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Records a delay. A missing or blank `reason` keeps the one already on
    /// the flight.
    pub async fn set_delay(
        &self,
        flight_id: Uuid,
        delay: Duration,
        reason: Option<&str>,
    ) -> CoreResult<Flight> {
        if delay < Duration::zero() {
            return Err(CoreError::ValidationError("delay must not be negative".to_string()));
        }

        let mut flight = self.get_flight(flight_id).await?;
        let shifted = flight
            .take_off
            .checked_add_signed(delay)
            .and(flight.landing.checked_add_signed(delay));
        if shifted.is_none() {
            return Err(CoreError::ValidationError("delay is out of range".to_string()));
        }

        let new_reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .or(flight.delay_reason.take());

        flight.delay_seconds = Some(delay.num_seconds());
        flight.delay_reason = new_reason;

        self.repo
            .update_flight_delay(flight_id, flight.delay_seconds, flight.delay_reason.as_deref())
            .await?;

        info!(
            %flight_id,
            delay_minutes = delay.num_minutes(),
            reason = flight.delay_reason.as_deref().unwrap_or("-"),
            "Flight delay recorded"
        );
        Ok(flight)
    }

    /// Sets the instant after which no more tickets are sold; `None` re-opens sales.
    pub async fn set_booking_deadline(
        &self,
        flight_id: Uuid,
        closes_at: Option<DateTime<Utc>>,
    ) -> CoreResult<Flight> {
        let mut flight = self.get_flight(flight_id).await?;
        self.repo.update_booking_deadline(flight_id, closes_at).await?;
        flight.booking_closes_at = closes_at;

        info!(%flight_id, closes_at = ?closes_at, "Booking deadline updated");
        Ok(flight)
    }

    async fn plane_for(&self, flight: &Flight) -> CoreResult<PlaneWithModel> {
        self.repo
            .get_plane_with_model(flight.plane_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Plane", flight.plane_id))
    }
}

fn require_text(field: &str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}
