use aerobook_core::FlightSearchParams;
use aerobook_shared::Flight;
use aerobook_store::{is_path_segment, BackendClient, ClientError};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header::AUTHORIZATION, Method},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::auth::BearerToken;
use crate::error::AppError;
use crate::state::AppState;
use crate::upstream::Relayed;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/flights", get(search_flights).post(create_flight))
        .route("/api/flights/deals", get(special_deals))
        .route("/api/flights/{id}", get(get_flight))
}

async fn search_flights(
    State(state): State<AppState>,
    token: BearerToken,
    params: Result<Query<FlightSearchParams>, QueryRejection>,
) -> Result<Relayed, AppError> {
    let Query(params) = params.map_err(|e| AppError::ValidationError(e.body_text()))?;
    params
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let mut request = state
        .backend
        .request(Method::GET, "/api/flights")
        .query(&params.query_pairs());
    if let Some(value) = token.header_value() {
        request = request.header(AUTHORIZATION, value);
    }

    state
        .backend
        .relay(request)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch flights", e))
}

async fn create_flight(
    State(state): State<AppState>,
    token: BearerToken,
    Json(body): Json<Value>,
) -> Result<Relayed, AppError> {
    let mut request = state.backend.request(Method::POST, "/api/flights").json(&body);
    if let Some(value) = token.header_value() {
        request = request.header(AUTHORIZATION, value);
    }

    state
        .backend
        .relay(request)
        .await
        .map_err(|e| AppError::upstream("Failed to create flight", e))
}

fn client_for(state: &AppState, token: BearerToken) -> BackendClient {
    match token.0 {
        Some(token) => state.client.with_token(token),
        None => state.client.clone(),
    }
}

async fn special_deals(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<Vec<Flight>>, AppError> {
    let deals = client_for(&state, token)
        .deals()
        .await
        .map_err(|e| AppError::upstream("Failed to fetch deals", e))?;
    Ok(Json(deals))
}

async fn get_flight(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<String>,
) -> Result<Json<Flight>, AppError> {
    if !is_path_segment(&id) {
        return Err(AppError::ValidationError("Invalid flight id".to_string()));
    }
    match client_for(&state, token).flight(&id).await {
        Ok(flight) => Ok(Json(flight)),
        Err(ClientError::NotFound(_)) => Err(AppError::NotFoundError("Flight not found".to_string())),
        Err(ClientError::Validation(msg)) => Err(AppError::ValidationError(msg)),
        Err(e) => Err(AppError::upstream("Failed to fetch flight", e)),
    }
}
