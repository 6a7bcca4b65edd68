//! BackendClient against an in-process fake backend.

use aerobook_core::{BookingRepository, CoreError, FlightRepository, FlightSearchParams, ReceiptDelivery};
use aerobook_shared::{BookingExtras, BookingStatus, NewBooking, Passenger, PassengerType};
use aerobook_store::app_config::BackendConfig;
use aerobook_store::{BackendClient, ClientError};
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;

async fn search(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let authorized = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        == Some("Bearer t0k3n");
    let airline = if authorized { "Emirates" } else { "Anonymous Air" };
    Json(json!({
        "flights": [
            {
                "id": "f1",
                "origin": query.get("origin"),
                "destination": query.get("destination"),
                "airline": airline,
                "price": 500,
                "stops": 0,
                "departureTime": "08:00"
            },
            {
                "id": "f2",
                "origin": query.get("origin"),
                "destination": query.get("destination"),
                "airline": "Qatar",
                "price": query.get("passengers").cloned().unwrap_or_default(),
                "stops": 2,
                "departureTime": "23:30"
            }
        ]
    }))
}

async fn flight_by_id(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if id == "f1" {
        Ok(Json(json!({ "data": { "id": "f1", "airline": "Emirates", "price": 500 } })))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn deals() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

async fn create_booking(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({
            "booking": {
                "_id": "b-77",
                "flightId": body["flightId"],
                "passengers": body["passengers"],
                "seats": body["seats"],
                "totalPrice": body["totalPrice"],
                "status": "pending"
            }
        })),
    )
}

fn stored_booking(id: &str, user_id: &str, status: &str) -> Value {
    json!({ "_id": id, "flightId": "f1", "userId": user_id, "totalPrice": 550, "status": status })
}

async fn booking_by_id(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if id == "b-77" {
        Ok(Json(json!({ "booking": stored_booking("b-77", "u-1", "confirmed") })))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// `b-77` answers with the cancelled booking, `b-78` with an empty 204.
async fn cancel(Path(id): Path<String>) -> axum::response::Response {
    use axum::response::IntoResponse;
    match id.as_str() {
        "b-77" => Json(stored_booking("b-77", "u-1", "cancelled")).into_response(),
        "b-78" => StatusCode::NO_CONTENT.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn user_bookings(Path(user_id): Path<String>) -> Json<Value> {
    Json(json!({
        "bookings": [
            stored_booking("b-77", &user_id, "confirmed"),
            stored_booking("b-78", &user_id, "paid"),
        ]
    }))
}

async fn receipt(Path(id): Path<String>) -> StatusCode {
    if id == "b-77" {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/flights", get(search))
        .route("/api/flights/deals", get(deals))
        .route("/api/flights/{id}", get(flight_by_id))
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/user/{user_id}", get(user_bookings))
        .route("/api/bookings/{id}", get(booking_by_id).delete(cancel))
        .route("/api/bookings/{id}/receipt", post(receipt));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(url: String) -> BackendClient {
    BackendClient::new(&BackendConfig { url, request_timeout_seconds: 5 }).unwrap()
}

#[tokio::test]
async fn test_search_forwards_params_and_token() {
    let backend = client(spawn_backend().await).with_token("t0k3n");
    let mut params = FlightSearchParams::new("LOS", "DXB", "2024-12-25");
    params.passengers = Some(2);

    let flights = backend.search_flights(&params).await.unwrap();
    assert_eq!(flights.len(), 2);
    assert_eq!(flights[0].airline, "Emirates");
    assert_eq!(flights[0].origin, "LOS");
    assert_eq!(flights[1].destination, "DXB");
    // The fake echoes the passenger count into the price field.
    assert_eq!(flights[1].price, 2.0);
}

#[tokio::test]
async fn test_search_requires_core_params() {
    let backend = client(spawn_backend().await);
    let params = FlightSearchParams::new("LOS", "", "2024-12-25");
    let err = backend.search(&params).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_missing_flight_is_not_found() {
    let backend = client(spawn_backend().await);

    let flight = backend.get_flight_by_id("f1").await.unwrap();
    assert_eq!(flight.airline, "Emirates");

    let err = backend.get_flight_by_id("nonexistent").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_non_success_status_is_backend_error() {
    let backend = client(spawn_backend().await);
    match backend.deals().await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected status error, got {:?}", other.map(|f| f.len())),
    }
    assert!(matches!(backend.get_special_deals().await, Err(CoreError::BackendError(_))));
}

#[tokio::test]
async fn test_unreachable_backend_is_backend_error() {
    let backend = client("http://127.0.0.1:9".to_string());
    let err = backend.get_special_deals().await.unwrap_err();
    assert!(matches!(err, CoreError::BackendError(_)));
}

#[tokio::test]
async fn test_create_booking_and_receipt() {
    let backend = client(spawn_backend().await);
    let booking = NewBooking {
        flight_id: "f1".to_string(),
        passengers: vec![Passenger::new("Ada", "Obi", PassengerType::Adult)],
        seats: vec!["1A".to_string()],
        extras: BookingExtras::default(),
        total_price: 550.0,
        currency: "USD".to_string(),
    };

    let created = backend.create_booking(&booking).await.unwrap();
    assert_eq!(created.id, "b-77");
    assert_eq!(created.total_price, 550.0);
    assert_eq!(created.passengers[0].first_name, "Ada");

    assert_eq!(backend.send_receipt_email("b-77", "ada@example.com").await, ReceiptDelivery::Sent);

    let failed = backend.send_receipt_email("b-1", "ada@example.com").await;
    assert!(!failed.is_sent());
    assert!(failed.message().starts_with("Could not send receipt"));
}

#[tokio::test]
async fn test_get_and_list_bookings() {
    let backend = client(spawn_backend().await);

    let booking = backend.get_booking("b-77").await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.user_id.as_deref(), Some("u-1"));

    assert!(matches!(backend.get_booking("b-404").await, Err(CoreError::NotFound(_))));

    let bookings = backend.list_user_bookings("u-9").await.unwrap();
    assert_eq!(bookings.len(), 2);
    assert!(bookings.iter().all(|b| b.user_id.as_deref() == Some("u-9")));
    assert_eq!(bookings[1].status, BookingStatus::Paid);
}

#[tokio::test]
async fn test_cancel_booking_with_and_without_body() {
    let backend = client(spawn_backend().await);

    let cancelled = backend.cancel_booking("b-77").await.unwrap();
    assert_eq!(cancelled.map(|b| b.status), Some(BookingStatus::Cancelled));

    assert_eq!(backend.cancel_booking("b-78").await.unwrap(), None);

    assert!(matches!(backend.cancel_booking("b-404").await, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_traversal_id_is_rejected_before_sending() {
    let backend = client(spawn_backend().await).with_token("t0k3n");

    let err = backend.get_flight_by_id("../bookings/b-77").await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));
    assert!(matches!(backend.cancel_booking("..").await, Err(CoreError::ValidationError(_))));
}
