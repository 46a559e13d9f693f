use aeroport_core::models::{Flight, Passenger, Plane, PlaneModel, PlaneWithModel, Ticket};
use aeroport_core::repository::AirportRepository;
use aeroport_core::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

// Named in migrations/20250101000000_init.sql
const PASSENGER_FK: &str = "tickets_passenger_id_fkey";

const FLIGHT_COLUMNS: &str = "id, flight_name, take_off, landing, origin, destination, \
     delay_seconds, delay_reason, plane_id, booking_closes_at";

pub struct PgAirportRepository {
    pool: PgPool,
}

impl PgAirportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct PlaneModelRow {
    id: Uuid,
    name: String,
    max_speed: f64,
    capacity: i32,
}

impl From<PlaneModelRow> for PlaneModel {
    fn from(row: PlaneModelRow) -> Self {
        PlaneModel {
            id: row.id,
            name: row.name,
            max_speed: row.max_speed,
            capacity: row.capacity,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlaneWithModelRow {
    plane_id: Uuid,
    model_id: Uuid,
    model_name: String,
    max_speed: f64,
    capacity: i32,
}

impl From<PlaneWithModelRow> for PlaneWithModel {
    fn from(row: PlaneWithModelRow) -> Self {
        PlaneWithModel {
            plane: Plane { id: row.plane_id, model_id: row.model_id },
            model: PlaneModel {
                id: row.model_id,
                name: row.model_name,
                max_speed: row.max_speed,
                capacity: row.capacity,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_name: String,
    take_off: DateTime<Utc>,
    landing: DateTime<Utc>,
    origin: String,
    destination: String,
    delay_seconds: Option<i64>,
    delay_reason: Option<String>,
    plane_id: Uuid,
    booking_closes_at: Option<DateTime<Utc>>,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            flight_name: row.flight_name,
            take_off: row.take_off,
            landing: row.landing,
            origin: row.origin,
            destination: row.destination,
            delay_seconds: row.delay_seconds,
            delay_reason: row.delay_reason,
            plane_id: row.plane_id,
            booking_closes_at: row.booking_closes_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: Uuid,
    name: String,
}

impl From<PassengerRow> for Passenger {
    fn from(row: PassengerRow) -> Self {
        Passenger { id: row.id, name: row.name }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    flight_id: Uuid,
    passenger_id: Uuid,
    issued_at: DateTime<Utc>,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Ticket {
            flight_id: row.flight_id,
            passenger_id: row.passenger_id,
            issued_at: row.issued_at,
        }
    }
}

fn storage_error(err: sqlx::Error) -> CoreError {
    error!("Database error: {}", err);
    CoreError::StorageError(err.to_string())
}

/// Maps a foreign-key violation to `NotFound` for the referenced row.
fn reference_error(err: sqlx::Error, entity: &'static str, id: Uuid) -> CoreError {
    match &err {
        sqlx::Error::Database(db) if matches!(db.kind(), ErrorKind::ForeignKeyViolation) => {
            CoreError::not_found(entity, id)
        }
        _ => storage_error(err),
    }
}

/// Classifies a constraint violation raised by `INSERT INTO tickets`.
/// Returns `None` for kinds that are plain storage failures.
fn ticket_violation(kind: ErrorKind, constraint: Option<&str>, ticket: &Ticket) -> Option<CoreError> {
    match kind {
        // Primary key (flight_id, passenger_id)
        ErrorKind::UniqueViolation => Some(CoreError::DuplicateBooking {
            flight_id: ticket.flight_id,
            passenger_id: ticket.passenger_id,
        }),
        ErrorKind::ForeignKeyViolation => match constraint {
            Some(PASSENGER_FK) => Some(CoreError::not_found("Passenger", ticket.passenger_id)),
            _ => Some(CoreError::not_found("Flight", ticket.flight_id)),
        },
        _ => None,
    }
}

fn ensure_updated(rows_affected: u64, flight_id: Uuid) -> CoreResult<()> {
    if rows_affected == 0 {
        return Err(CoreError::not_found("Flight", flight_id));
    }
    Ok(())
}

#[async_trait]
impl AirportRepository for PgAirportRepository {
    async fn insert_plane_model(&self, model: &PlaneModel) -> CoreResult<()> {
        sqlx::query("INSERT INTO plane_models (id, name, max_speed, capacity) VALUES ($1, $2, $3, $4)")
            .bind(model.id)
            .bind(&model.name)
            .bind(model.max_speed)
            .bind(model.capacity)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn get_plane_model(&self, id: Uuid) -> CoreResult<Option<PlaneModel>> {
        let row = sqlx::query_as::<_, PlaneModelRow>(
            "SELECT id, name, max_speed, capacity FROM plane_models WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(PlaneModel::from))
    }

    async fn insert_plane(&self, plane: &Plane) -> CoreResult<()> {
        sqlx::query("INSERT INTO planes (id, model_id) VALUES ($1, $2)")
            .bind(plane.id)
            .bind(plane.model_id)
            .execute(&self.pool)
            .await
            .map_err(|e| reference_error(e, "Plane model", plane.model_id))?;
        Ok(())
    }

    async fn get_plane_with_model(&self, plane_id: Uuid) -> CoreResult<Option<PlaneWithModel>> {
        let row = sqlx::query_as::<_, PlaneWithModelRow>(
            r#"
            SELECT p.id AS plane_id, m.id AS model_id, m.name AS model_name, m.max_speed, m.capacity
            FROM planes p
            JOIN plane_models m ON p.model_id = m.id
            WHERE p.id = $1
            "#,
        )
        .bind(plane_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(PlaneWithModel::from))
    }

    async fn insert_flight(&self, flight: &Flight) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO flights (id, flight_name, take_off, landing, origin, destination, delay_seconds, delay_reason, plane_id, booking_closes_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(flight.id)
        .bind(&flight.flight_name)
        .bind(flight.take_off)
        .bind(flight.landing)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.delay_seconds)
        .bind(&flight.delay_reason)
        .bind(flight.plane_id)
        .bind(flight.booking_closes_at)
        .execute(&self.pool)
        .await
        .map_err(|e| reference_error(e, "Plane", flight.plane_id))?;
        Ok(())
    }

    async fn get_flight(&self, id: Uuid) -> CoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {} FROM flights WHERE id = $1",
            FLIGHT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Flight::from))
    }

    async fn list_flights(&self) -> CoreResult<Vec<Flight>> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {} FROM flights ORDER BY take_off, id",
            FLIGHT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn update_flight_delay(
        &self,
        flight_id: Uuid,
        delay_seconds: Option<i64>,
        delay_reason: Option<&str>,
    ) -> CoreResult<()> {
        let result = sqlx::query("UPDATE flights SET delay_seconds = $1, delay_reason = $2 WHERE id = $3")
            .bind(delay_seconds)
            .bind(delay_reason)
            .bind(flight_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        ensure_updated(result.rows_affected(), flight_id)
    }

    async fn update_booking_deadline(
        &self,
        flight_id: Uuid,
        closes_at: Option<DateTime<Utc>>,
    ) -> CoreResult<()> {
        let result = sqlx::query("UPDATE flights SET booking_closes_at = $1 WHERE id = $2")
            .bind(closes_at)
            .bind(flight_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        ensure_updated(result.rows_affected(), flight_id)
    }

    async fn insert_passenger(&self, passenger: &Passenger) -> CoreResult<()> {
        sqlx::query("INSERT INTO passengers (id, name) VALUES ($1, $2)")
            .bind(passenger.id)
            .bind(&passenger.name)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn get_passenger(&self, id: Uuid) -> CoreResult<Option<Passenger>> {
        let row = sqlx::query_as::<_, PassengerRow>("SELECT id, name FROM passengers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(Passenger::from))
    }

    async fn list_passengers(&self) -> CoreResult<Vec<Passenger>> {
        let rows = sqlx::query_as::<_, PassengerRow>("SELECT id, name FROM passengers ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(rows.into_iter().map(Passenger::from).collect())
    }

    async fn tickets_for_flight(&self, flight_id: Uuid) -> CoreResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            "SELECT flight_id, passenger_id, issued_at FROM tickets WHERE flight_id = $1 ORDER BY issued_at",
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Ticket::from).collect())
    }

    async fn passengers_on_flight(&self, flight_id: Uuid) -> CoreResult<Vec<Passenger>> {
        let rows = sqlx::query_as::<_, PassengerRow>(
            r#"
            SELECT p.id, p.name
            FROM tickets t
            JOIN passengers p ON t.passenger_id = p.id
            WHERE t.flight_id = $1
            ORDER BY p.name, p.id
            "#,
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Passenger::from).collect())
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> CoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO tickets (flight_id, passenger_id, issued_at) VALUES ($1, $2, $3)",
        )
        .bind(ticket.flight_id)
        .bind(ticket.passenger_id)
        .bind(ticket.issued_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) => {
                match ticket_violation(db.kind(), db.constraint(), ticket) {
                    Some(err) => Err(err),
                    None => Err(storage_error(sqlx::Error::Database(db))),
                }
            }
            Err(e) => Err(storage_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeroport_core::models::FlightStatus;

    #[test]
    fn test_flight_row_conversion() {
        let now = Utc::now();
        let row = FlightRow {
            id: Uuid::new_v4(),
            flight_name: "PS301".to_string(),
            take_off: now,
            landing: now + chrono::Duration::hours(3),
            origin: "ODS".to_string(),
            destination: "IST".to_string(),
            delay_seconds: Some(900),
            delay_reason: Some("Storm".to_string()),
            plane_id: Uuid::new_v4(),
            booking_closes_at: None,
        };

        let flight = Flight::from(row);
        assert_eq!(flight.status(), FlightStatus::Delayed);
        assert_eq!(flight.delay().map(|d| d.num_minutes()), Some(15));
        assert_eq!(flight.delay_reason.as_deref(), Some("Storm"));
    }

    fn ticket() -> Ticket {
        Ticket {
            flight_id: Uuid::new_v4(),
            passenger_id: Uuid::new_v4(),
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn test_ticket_violations() {
        let t = ticket();

        let dup = ticket_violation(ErrorKind::UniqueViolation, Some("tickets_pkey"), &t);
        assert!(matches!(dup, Some(CoreError::DuplicateBooking { flight_id, .. }) if flight_id == t.flight_id));

        let missing_passenger =
            ticket_violation(ErrorKind::ForeignKeyViolation, Some("tickets_passenger_id_fkey"), &t);
        assert!(matches!(
            missing_passenger,
            Some(CoreError::NotFound { entity: "Passenger", id }) if id == t.passenger_id
        ));

        let missing_flight =
            ticket_violation(ErrorKind::ForeignKeyViolation, Some("tickets_flight_id_fkey"), &t);
        assert!(matches!(
            missing_flight,
            Some(CoreError::NotFound { entity: "Flight", id }) if id == t.flight_id
        ));

        assert!(ticket_violation(ErrorKind::CheckViolation, None, &t).is_none());
        assert!(ticket_violation(ErrorKind::Other, None, &t).is_none());
    }

    #[test]
    fn test_ensure_updated() {
        let id = Uuid::new_v4();
        assert!(ensure_updated(1, id).is_ok());

        let err = ensure_updated(0, id).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Flight", id: missing } if missing == id));
    }

    #[test]
    fn test_reference_error_without_database_error() {
        let err = reference_error(sqlx::Error::RowNotFound, "Plane", Uuid::new_v4());
        assert!(matches!(err, CoreError::StorageError(_)));
    }

    #[test]
    fn test_joined_plane_row_conversion() {
        let row = PlaneWithModelRow {
            plane_id: Uuid::new_v4(),
            model_id: Uuid::new_v4(),
            model_name: "Boeing 737-800".to_string(),
            max_speed: 842.0,
            capacity: 189,
        };
        let model_id = row.model_id;

        let joined = PlaneWithModel::from(row);
        assert_eq!(joined.plane.model_id, model_id);
        assert_eq!(joined.model.id, model_id);
        assert_eq!(joined.model.capacity, 189);
    }
}
