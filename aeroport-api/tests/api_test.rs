use std::sync::Arc;

use aeroport_api::{app, AppState};
use aeroport_core::{BookingService, InMemoryRepository};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    let service = BookingService::new(Arc::new(InMemoryRepository::new()));
    app(AppState { service })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Creates a model with the given capacity, a plane and one flight; returns the flight id.
async fn seed_flight(app: &Router, capacity: i32) -> String {
    let (status, model) = send(
        app,
        "POST",
        "/v1/plane-models",
        Some(json!({ "name": "ATR 72", "max_speed": 510.0, "capacity": capacity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, plane) = send(app, "POST", "/v1/planes", Some(json!({ "model_id": model["id"] }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, flight) = send(
        app,
        "POST",
        "/v1/flights",
        Some(json!({
            "flight_name": "PS505",
            "take_off": "2025-09-01T06:00:00Z",
            "landing": "2025-09-01T07:10:00Z",
            "origin": "KBP",
            "destination": "ODS",
            "plane_id": plane["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(flight["status"], "ON_TIME");

    flight["id"].as_str().unwrap().to_string()
}

async fn register(app: &Router, name: &str) -> String {
    let (status, passenger) = send(app, "POST", "/v1/passengers", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    passenger["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_booking_until_full() {
    let app = test_app();
    let flight_id = seed_flight(&app, 2).await;
    let bookings = format!("/v1/flights/{}/bookings", flight_id);

    for name in ["Iryna", "Maksym"] {
        let passenger_id = register(&app, name).await;
        let (status, ticket) = send(&app, "POST", &bookings, Some(json!({ "passenger_id": passenger_id }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(ticket["flight_id"], flight_id.as_str());
    }

    let late = register(&app, "Taras").await;
    let (status, body) = send(&app, "POST", &bookings, Some(json!({ "passenger_id": late }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Not enough space"));

    let (_, on_board) = send(&app, "GET", &format!("/v1/flights/{}/passengers", flight_id), None).await;
    let names: Vec<&str> = on_board
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Iryna", "Maksym"]);

    let (_, availability) = send(&app, "GET", &format!("/v1/flights/{}/availability", flight_id), None).await;
    assert_eq!(availability["remaining"], 0);
}

#[tokio::test]
async fn test_double_booking_conflicts() {
    let app = test_app();
    let flight_id = seed_flight(&app, 10).await;
    let passenger_id = register(&app, "Iryna").await;
    let bookings = format!("/v1/flights/{}/bookings", flight_id);

    let (status, _) = send(&app, "POST", &bookings, Some(json!({ "passenger_id": passenger_id }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", &bookings, Some(json!({ "passenger_id": passenger_id }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already holds a ticket"));
}

#[tokio::test]
async fn test_delay_keeps_reason() {
    let app = test_app();
    let flight_id = seed_flight(&app, 1).await;
    let delay = format!("/v1/flights/{}/delay", flight_id);

    let (status, flight) = send(
        &app,
        "PUT",
        &delay,
        Some(json!({ "delay_minutes": 40, "reason": "Icing" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flight["status"], "DELAYED");
    assert_eq!(flight["expected_take_off"], "2025-09-01T06:40:00Z");

    let (status, flight) = send(&app, "PUT", &delay, Some(json!({ "delay_minutes": 55 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flight["delay_seconds"], 55 * 60);
    assert_eq!(flight["delay_reason"], "Icing");

    let (status, _) = send(&app, "PUT", &delay, Some(json!({ "delay_minutes": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_delay_is_rejected() {
    let app = test_app();
    let flight_id = seed_flight(&app, 1).await;
    let delay = format!("/v1/flights/{}/delay", flight_id);

    let (status, body) = send(
        &app,
        "PUT",
        &delay,
        Some(json!({ "delay_minutes": 200_000_000_000_i64 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("out of range"));

    // Nothing was stored, so reads keep working
    let (status, flight) = send(&app, "GET", &format!("/v1/flights/{}", flight_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flight["status"], "ON_TIME");

    let (status, flights) = send(&app, "GET", "/v1/flights", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flights.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_closed_sales_conflict() {
    let app = test_app();
    let flight_id = seed_flight(&app, 10).await;
    let passenger_id = register(&app, "Iryna").await;

    let (status, flight) = send(
        &app,
        "PUT",
        &format!("/v1/flights/{}/booking-deadline", flight_id),
        Some(json!({ "closes_at": "2000-01-01T00:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flight["booking_closes_at"], "2000-01-01T00:00:00Z");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/flights/{}/bookings", flight_id),
        Some(json!({ "passenger_id": passenger_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_flight_is_not_found() {
    let app = test_app();
    let missing = uuid::Uuid::new_v4();

    let (status, body) = send(&app, "GET", &format!("/v1/flights/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Flight not found"));

    let (status, flights) = send(&app, "GET", "/v1/flights", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flights, json!([]));
}
