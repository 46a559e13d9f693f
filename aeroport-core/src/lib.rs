pub mod models;
pub mod repository;
pub mod memory;
pub mod service;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::InMemoryRepository;
pub use repository::AirportRepository;
pub use service::BookingService;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not enough space in a plane: flight {flight_id} is full ({capacity} seats)")]
    CapacityExceeded {
        flight_id: Uuid,
        capacity: i32,
    },

    #[error("Passenger {passenger_id} already holds a ticket for flight {flight_id}")]
    DuplicateBooking {
        flight_id: Uuid,
        passenger_id: Uuid,
    },

    #[error("Ticket sales for flight {flight_id} closed at {closed_at}")]
    BookingClosed {
        flight_id: Uuid,
        closed_at: DateTime<Utc>,
    },

    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: Uuid,
    },

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        CoreError::NotFound { entity, id }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
