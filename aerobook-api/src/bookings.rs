use aerobook_core::repository::BookingRepository;
use aerobook_store::is_path_segment;
use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, Method},
    routing::{get, post},
    Json, Router,
};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{BearerToken, ForwardedAuthorization};
use crate::error::AppError;
use crate::state::AppState;
use crate::upstream::Relayed;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    pub user_id: Option<String>,
    pub booking_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub sent: bool,
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/bookings",
            get(get_bookings)
                .post(create_booking)
                .put(update_booking)
                .delete(cancel_booking),
        )
        .route("/api/bookings/{id}/receipt", post(send_receipt))
}

// ============================================================================
// Handlers
// ============================================================================

fn segment(value: Option<String>, name: &str) -> Result<Option<String>, AppError> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) if is_path_segment(&v) => Ok(Some(v)),
        Some(_) => Err(AppError::ValidationError(format!("Invalid {}", name))),
        None => Ok(None),
    }
}

fn booking_id(query: BookingQuery) -> Result<String, AppError> {
    segment(query.booking_id, "bookingId")?
        .ok_or_else(|| AppError::ValidationError("bookingId is required".to_string()))
}

async fn forward(
    state: &AppState,
    request: RequestBuilder,
    authorization: ForwardedAuthorization,
    failure: &'static str,
) -> Result<Relayed, AppError> {
    let request = match authorization.0 {
        Some(value) => request.header(AUTHORIZATION, value),
        None => request,
    };
    state
        .backend
        .relay(request)
        .await
        .map_err(|e| AppError::upstream(failure, e))
}

async fn get_bookings(
    State(state): State<AppState>,
    authorization: ForwardedAuthorization,
    Query(query): Query<BookingQuery>,
) -> Result<Relayed, AppError> {
    let path = if let Some(id) = segment(query.booking_id, "bookingId")? {
        format!("/api/bookings/{}", id)
    } else if let Some(user_id) = segment(query.user_id, "userId")? {
        format!("/api/bookings/user/{}", user_id)
    } else {
        return Err(AppError::ValidationError("userId or bookingId is required".to_string()));
    };

    let request = state.backend.request(Method::GET, &path);
    forward(&state, request, authorization, "Failed to fetch bookings").await
}

async fn create_booking(
    State(state): State<AppState>,
    authorization: ForwardedAuthorization,
    Json(body): Json<Value>,
) -> Result<Relayed, AppError> {
    let request = state.backend.request(Method::POST, "/api/bookings").json(&body);
    forward(&state, request, authorization, "Failed to create booking").await
}

async fn update_booking(
    State(state): State<AppState>,
    authorization: ForwardedAuthorization,
    Query(query): Query<BookingQuery>,
    Json(body): Json<Value>,
) -> Result<Relayed, AppError> {
    let id = booking_id(query)?;
    let request = state
        .backend
        .request(Method::PUT, &format!("/api/bookings/{}", id))
        .json(&body);
    forward(&state, request, authorization, "Failed to update booking").await
}

async fn cancel_booking(
    State(state): State<AppState>,
    authorization: ForwardedAuthorization,
    Query(query): Query<BookingQuery>,
) -> Result<Relayed, AppError> {
    let id = booking_id(query)?;
    let request = state
        .backend
        .request(Method::DELETE, &format!("/api/bookings/{}", id));
    forward(&state, request, authorization, "Failed to cancel booking").await
}

/// Delivery problems are reported in the body, never as an error status.
async fn send_receipt(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<String>,
    Json(req): Json<ReceiptRequest>,
) -> Result<Json<ReceiptResponse>, AppError> {
    if !is_path_segment(&id) {
        return Err(AppError::ValidationError("Invalid booking id".to_string()));
    }
    if req.email.trim().is_empty() {
        return Err(AppError::ValidationError("email is required".to_string()));
    }

    let client = match token.0 {
        Some(token) => state.client.with_token(token),
        None => state.client.clone(),
    };
    let delivery = client.send_receipt_email(&id, req.email.trim()).await;

    Ok(Json(ReceiptResponse {
        sent: delivery.is_sent(),
        message: delivery.message(),
    }))
}
