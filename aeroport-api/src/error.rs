use aeroport_core::CoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let msg = err.to_string();
        match err {
            CoreError::CapacityExceeded { .. }
            | CoreError::DuplicateBooking { .. }
            | CoreError::BookingClosed { .. } => AppError::ConflictError(msg),
            CoreError::NotFound { .. } => AppError::NotFoundError(msg),
            CoreError::ValidationError(_) => AppError::ValidationError(msg),
            CoreError::StorageError(_) => AppError::InternalServerError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_booking_errors_are_conflicts() {
        let flight_id = Uuid::new_v4();
        let full = AppError::from(CoreError::CapacityExceeded { flight_id, capacity: 2 });
        assert_eq!(full.into_response().status(), StatusCode::CONFLICT);

        let dup = AppError::from(CoreError::DuplicateBooking { flight_id, passenger_id: Uuid::new_v4() });
        assert_eq!(dup.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_storage_errors_are_redacted() {
        let err = AppError::from(CoreError::StorageError("connection refused".to_string()));
        assert!(matches!(&err, AppError::InternalServerError(m) if m.contains("connection refused")));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
