use aerobook_core::prediction::{synthetic_response, AiAction};
use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Set on responses produced locally instead of by the AI service.
pub const FALLBACK_HEADER: HeaderName = HeaderName::from_static("x-ai-fallback");

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/ai", post(predict))
}

/// Splits `{action, ...data}` into the action and the remaining fields.
fn split_action(body: Value) -> Result<(AiAction, Value), AppError> {
    let Value::Object(mut data) = body else {
        return Err(AppError::ValidationError("Request body must be a JSON object".to_string()));
    };
    let action = match data.remove("action") {
        Some(Value::String(action)) => action,
        _ => return Err(AppError::ValidationError("Invalid action".to_string())),
    };
    let action = action
        .parse::<AiAction>()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    Ok((action, Value::Object(data)))
}

fn fallback(action: AiAction, data: &Value) -> Response {
    let body = synthetic_response(action, data, &mut rand::thread_rng());
    (
        [(FALLBACK_HEADER, HeaderValue::from_static("synthetic"))],
        Json(body),
    )
        .into_response()
}

async fn predict(State(state): State<AppState>, Json(body): Json<Value>) -> Result<Response, AppError> {
    let (action, data) = split_action(body)?;

    let request = state.ai.request(Method::POST, action.service_path()).json(&data);
    let failure = match state.ai.relay(request).await {
        Ok(relayed) if relayed.status.is_success() => return Ok(relayed.into_response()),
        Ok(relayed) => format!("AI service returned {}", relayed.status),
        Err(e) => e.to_string(),
    };

    if !state.ai_fallback {
        tracing::error!(action = action.as_str(), error = %failure, "AI service request failed");
        return Err(AppError::ServiceUnavailable("AI service unavailable".to_string()));
    }

    warn!(
        action = action.as_str(),
        error = %failure,
        "AI service unavailable, answering with synthetic data"
    );
    Ok(fallback(action, &data))
}
