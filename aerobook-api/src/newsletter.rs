use aerobook_shared::Masked;
use axum::{routing::post, Json, Router};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: Option<Masked<String>>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/newsletter", post(subscribe))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Nothing is stored; a valid address is acknowledged and logged masked.
async fn subscribe(Json(req): Json<SubscribeRequest>) -> Result<Json<Value>, AppError> {
    let email = req
        .email
        .filter(|email| is_valid_email(email.expose()))
        .ok_or_else(|| AppError::ValidationError("Invalid email address".to_string()))?;

    info!(email = %email, "Newsletter subscription accepted");
    Ok(Json(json!({ "message": "Successfully subscribed to newsletter" })))
}
