use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::models::{Flight, Passenger, Plane, PlaneModel, PlaneWithModel, Ticket};
use crate::repository::AirportRepository;
use crate::{CoreError, CoreResult};

#[derive(Default)]
struct Tables {
    plane_models: HashMap<Uuid, PlaneModel>,
    planes: HashMap<Uuid, Plane>,
    flights: HashMap<Uuid, Flight>,
    passengers: HashMap<Uuid, Passenger>,
    tickets: HashMap<(Uuid, Uuid), Ticket>,
}

/// Process-local repository. Enforces the same keys and foreign keys as the
/// SQL schema so the service behaves identically on either backend.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| CoreError::StorageError("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> CoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| CoreError::StorageError("in-memory store lock poisoned".to_string()))
    }
}

fn sorted_by_name(mut passengers: Vec<Passenger>) -> Vec<Passenger> {
    passengers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    passengers
}

#[async_trait]
impl AirportRepository for InMemoryRepository {
    async fn insert_plane_model(&self, model: &PlaneModel) -> CoreResult<()> {
        self.write()?.plane_models.insert(model.id, model.clone());
        Ok(())
    }

    async fn get_plane_model(&self, id: Uuid) -> CoreResult<Option<PlaneModel>> {
        Ok(self.read()?.plane_models.get(&id).cloned())
    }

    async fn insert_plane(&self, plane: &Plane) -> CoreResult<()> {
        let mut tables = self.write()?;
        if !tables.plane_models.contains_key(&plane.model_id) {
            return Err(CoreError::not_found("Plane model", plane.model_id));
        }
        tables.planes.insert(plane.id, plane.clone());
        Ok(())
    }

    async fn get_plane_with_model(&self, plane_id: Uuid) -> CoreResult<Option<PlaneWithModel>> {
        let tables = self.read()?;
        let joined = tables.planes.get(&plane_id).and_then(|plane| {
            tables.plane_models.get(&plane.model_id).map(|model| PlaneWithModel {
                plane: plane.clone(),
                model: model.clone(),
            })
        });
        Ok(joined)
    }

    async fn insert_flight(&self, flight: &Flight) -> CoreResult<()> {
        let mut tables = self.write()?;
        if !tables.planes.contains_key(&flight.plane_id) {
            return Err(CoreError::not_found("Plane", flight.plane_id));
        }
        tables.flights.insert(flight.id, flight.clone());
        Ok(())
    }

    async fn get_flight(&self, id: Uuid) -> CoreResult<Option<Flight>> {
        Ok(self.read()?.flights.get(&id).cloned())
    }

    async fn list_flights(&self) -> CoreResult<Vec<Flight>> {
        let mut flights: Vec<Flight> = self.read()?.flights.values().cloned().collect();
        flights.sort_by(|a, b| a.take_off.cmp(&b.take_off).then(a.id.cmp(&b.id)));
        Ok(flights)
    }

    async fn update_flight_delay(
        &self,
        flight_id: Uuid,
        delay_seconds: Option<i64>,
        delay_reason: Option<&str>,
    ) -> CoreResult<()> {
        let mut tables = self.write()?;
        let flight = tables
            .flights
            .get_mut(&flight_id)
            .ok_or_else(|| CoreError::not_found("Flight", flight_id))?;
        flight.delay_seconds = delay_seconds;
        flight.delay_reason = delay_reason.map(str::to_string);
        Ok(())
    }

    async fn update_booking_deadline(
        &self,
        flight_id: Uuid,
        closes_at: Option<DateTime<Utc>>,
    ) -> CoreResult<()> {
        let mut tables = self.write()?;
        let flight = tables
            .flights
            .get_mut(&flight_id)
            .ok_or_else(|| CoreError::not_found("Flight", flight_id))?;
        flight.booking_closes_at = closes_at;
        Ok(())
    }

    async fn insert_passenger(&self, passenger: &Passenger) -> CoreResult<()> {
        self.write()?.passengers.insert(passenger.id, passenger.clone());
        Ok(())
    }

    async fn get_passenger(&self, id: Uuid) -> CoreResult<Option<Passenger>> {
        Ok(self.read()?.passengers.get(&id).cloned())
    }

    async fn list_passengers(&self) -> CoreResult<Vec<Passenger>> {
        let passengers = self.read()?.passengers.values().cloned().collect();
        Ok(sorted_by_name(passengers))
    }

    async fn tickets_for_flight(&self, flight_id: Uuid) -> CoreResult<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = self
            .read()?
            .tickets
            .values()
            .filter(|t| t.flight_id == flight_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.issued_at);
        Ok(tickets)
    }

    async fn passengers_on_flight(&self, flight_id: Uuid) -> CoreResult<Vec<Passenger>> {
        let tables = self.read()?;
        let passengers = tables
            .tickets
            .values()
            .filter(|t| t.flight_id == flight_id)
            .filter_map(|t| tables.passengers.get(&t.passenger_id).cloned())
            .collect();
        Ok(sorted_by_name(passengers))
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> CoreResult<()> {
        let mut tables = self.write()?;
        if !tables.flights.contains_key(&ticket.flight_id) {
            return Err(CoreError::not_found("Flight", ticket.flight_id));
        }
        if !tables.passengers.contains_key(&ticket.passenger_id) {
            return Err(CoreError::not_found("Passenger", ticket.passenger_id));
        }

        let key = (ticket.flight_id, ticket.passenger_id);
        if tables.tickets.contains_key(&key) {
            return Err(CoreError::DuplicateBooking {
                flight_id: ticket.flight_id,
                passenger_id: ticket.passenger_id,
            });
        }
        tables.tickets.insert(key, ticket.clone());
        Ok(())
    }
}
