use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Fleet
// ============================================================================

/// An aircraft type. Capacity bounds the tickets of every flight flown by a
/// plane of this model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaneModel {
    pub id: Uuid,
    pub name: String,
    pub max_speed: f64,
    pub capacity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plane {
    pub id: Uuid,
    pub model_id: Uuid,
}

/// A plane loaded together with its model, as needed for capacity checks.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneWithModel {
    pub plane: Plane,
    pub model: PlaneModel,
}

// ============================================================================
// Schedule
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flight {
    pub id: Uuid,
    pub flight_name: String,
    pub take_off: DateTime<Utc>,
    pub landing: DateTime<Utc>,
    pub origin: String,
    pub destination: String,
    pub delay_seconds: Option<i64>,
    pub delay_reason: Option<String>,
    pub plane_id: Uuid,
    pub booking_closes_at: Option<DateTime<Utc>>,
}

/// Derived from the delay fields; there is no stored status column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    OnTime,
    Delayed,
}

impl Flight {
    pub fn delay(&self) -> Option<Duration> {
        self.delay_seconds.and_then(Duration::try_seconds)
    }

    pub fn status(&self) -> FlightStatus {
        match self.delay_seconds {
            Some(secs) if secs > 0 => FlightStatus::Delayed,
            _ => FlightStatus::OnTime,
        }
    }

    /// Take-off shifted by the current delay. `None` when the shifted time
    /// is not representable.
    pub fn expected_take_off(&self) -> Option<DateTime<Utc>> {
        shift(self.take_off, self.delay_seconds)
    }

    pub fn expected_landing(&self) -> Option<DateTime<Utc>> {
        shift(self.landing, self.delay_seconds)
    }

    pub fn is_booking_open(&self, now: DateTime<Utc>) -> bool {
        match self.booking_closes_at {
            Some(closes_at) => now < closes_at,
            None => true,
        }
    }
}

fn shift(at: DateTime<Utc>, delay_seconds: Option<i64>) -> Option<DateTime<Utc>> {
    match delay_seconds {
        Some(secs) => at.checked_add_signed(Duration::try_seconds(secs)?),
        None => Some(at),
    }
}

// ============================================================================
// Passengers & Tickets
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passenger {
    pub id: Uuid,
    pub name: String,
}

/// Keyed by (flight_id, passenger_id); a passenger holds at most one ticket
/// per flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub flight_id: Uuid,
    pub passenger_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Availability {
    pub flight_id: Uuid,
    pub capacity: i32,
    pub booked: i32,
    pub remaining: i32,
}

// ============================================================================
// Creation inputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewPlaneModel {
    pub name: String,
    pub max_speed: f64,
    pub capacity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub flight_name: String,
    pub take_off: DateTime<Utc>,
    pub landing: DateTime<Utc>,
    pub origin: String,
    pub destination: String,
    pub plane_id: Uuid,
    #[serde(default)]
    pub booking_closes_at: Option<DateTime<Utc>>,
}
