use aerobook_api::{app, AppState};
use aerobook_core::PricingConfig;
use aerobook_store::app_config::{AiConfig, BackendConfig, Config, ServerConfig};
use axum::{
    body::Body,
    extract::{Path, Query},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tower::ServiceExt;

/// Nothing listens on the discard port.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

fn authorization(headers: &HeaderMap) -> Value {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| Value::String(v.to_string()))
        .unwrap_or(Value::Null)
}

fn flight(id: &str, is_deal: bool) -> Value {
    json!({
        "_id": id,
        "origin": "LHR",
        "destination": "DXB",
        "airline": "Emirates",
        "flightNumber": "EK2",
        "departureTime": "08:00",
        "arrivalTime": "19:00",
        "duration": "7h 0m",
        "price": 500,
        "stops": 0,
        "isDeal": is_deal,
    })
}

fn backend_router() -> Router {
    Router::new()
        .route(
            "/api/flights",
            get(|headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "flights": [flight("f1", false)],
                    "query": query,
                    "authorization": authorization(&headers),
                }))
            })
            .post(|Json(body): Json<Value>| async move { (StatusCode::CREATED, Json(body)) }),
        )
        .route("/api/flights/deals", get(|| async { Json(json!([flight("f9", true)])) }))
        .route(
            "/api/flights/{id}",
            get(|Path(id): Path<String>| async move {
                if id == "f1" {
                    Json(flight("f1", false)).into_response()
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({ "message": "Flight not found" }))).into_response()
                }
            }),
        )
        .route(
            "/api/bookings",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                (
                    StatusCode::CREATED,
                    Json(json!({ "booking": body, "authorization": authorization(&headers) })),
                )
            }),
        )
        .route(
            "/api/bookings/user/{user_id}",
            get(|headers: HeaderMap, Path(user_id): Path<String>| async move {
                Json(json!({
                    "bookings": [{ "_id": "b-1", "userId": user_id }],
                    "authorization": authorization(&headers),
                }))
            }),
        )
        .route(
            "/api/bookings/{id}",
            get(|Path(id): Path<String>| async move {
                if id == "b-1" {
                    Json(json!({ "_id": "b-1", "status": "confirmed" })).into_response()
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({ "message": "Booking not found" }))).into_response()
                }
            })
            .put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                Json(json!({ "_id": id, "update": body }))
            })
            .delete(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/api/bookings/{id}/receipt",
            post(|Path(id): Path<String>| async move {
                if id == "b-1" {
                    StatusCode::NO_CONTENT
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }),
        )
        .route(
            "/predict/price",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "predicted_price": 123.0, "received": body }))
            }),
        )
}

/// Serves the fake backend (which also answers `/predict/price`) and
/// returns its base URL.
pub async fn spawn_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend_router()).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn config(backend_url: &str, ai_url: &str, synthetic_fallback: bool) -> Config {
    Config {
        server: ServerConfig { port: 0 },
        backend: BackendConfig {
            url: backend_url.to_string(),
            request_timeout_seconds: 5,
        },
        ai: AiConfig {
            url: ai_url.to_string(),
            request_timeout_seconds: 2,
            synthetic_fallback,
        },
        pricing: PricingConfig::default(),
    }
}

pub fn test_app(config: &Config) -> Router {
    app(AppState::from_config(config).unwrap())
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
