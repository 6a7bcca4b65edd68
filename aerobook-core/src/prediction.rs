//! AI prediction actions and the locally generated stand-in responses used
//! when the AI service cannot be reached.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::CoreError;

pub const DEFAULT_BASE_PRICE: f64 = 300.0;
pub const PRICE_MULTIPLIER_RANGE: (f64, f64) = (0.8, 1.2);
pub const MAX_DELAY_PROBABILITY: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AiAction {
    PredictPrice,
    PredictDelay,
    GetRecommendations,
}

impl AiAction {
    /// Endpoint on the AI service handling this action
    pub fn service_path(&self) -> &'static str {
        match self {
            AiAction::PredictPrice => "/predict/price",
            AiAction::PredictDelay => "/predict/delay",
            AiAction::GetRecommendations => "/recommendations",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AiAction::PredictPrice => "predict-price",
            AiAction::PredictDelay => "predict-delay",
            AiAction::GetRecommendations => "get-recommendations",
        }
    }
}

impl FromStr for AiAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "predict-price" => Ok(AiAction::PredictPrice),
            "predict-delay" => Ok(AiAction::PredictDelay),
            "get-recommendations" => Ok(AiAction::GetRecommendations),
            other => Err(CoreError::ValidationError(format!("Invalid action: {}", other))),
        }
    }
}

const DESTINATIONS: [(&str, &str); 6] = [
    ("LHR", "London"),
    ("DXB", "Dubai"),
    ("JFK", "New York"),
    ("CDG", "Paris"),
    ("ACC", "Accra"),
    ("JNB", "Johannesburg"),
];

/// Builds a plausible response for `action` without calling the AI service.
pub fn synthetic_response<R: Rng + ?Sized>(action: AiAction, data: &Value, rng: &mut R) -> Value {
    match action {
        AiAction::PredictPrice => synthetic_price(data, rng),
        AiAction::PredictDelay => synthetic_delay(data, rng),
        AiAction::GetRecommendations => synthetic_recommendations(data, rng),
    }
}

fn number_field(data: &Value, key: &str) -> Option<f64> {
    match data.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn synthetic_price<R: Rng + ?Sized>(data: &Value, rng: &mut R) -> Value {
    let base_price = number_field(data, "basePrice")
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(DEFAULT_BASE_PRICE);
    let (low, high) = PRICE_MULTIPLIER_RANGE;
    let multiplier = rng.gen_range(low..=high);
    let predicted = round2(base_price * multiplier).clamp(base_price * low, base_price * high);

    let trend = if multiplier > 1.05 {
        "increasing"
    } else if multiplier < 0.95 {
        "decreasing"
    } else {
        "stable"
    };

    json!({
        "predicted_price": predicted,
        "base_price": base_price,
        "price_multiplier": round2(multiplier),
        "price_trend": trend,
        "recommendation": if trend == "increasing" { "book_now" } else { "wait" },
        "confidence": round2(rng.gen_range(0.7..=0.95)),
        "dynamic_pricing_applied": true,
    })
}

fn synthetic_delay<R: Rng + ?Sized>(data: &Value, rng: &mut R) -> Value {
    let probability = round2(rng.gen_range(0.0..=MAX_DELAY_PROBABILITY));
    let risk = if probability < 0.15 {
        "low"
    } else if probability < 0.3 {
        "medium"
    } else {
        "high"
    };

    json!({
        "flight_id": data.get("flightId").cloned().unwrap_or(Value::Null),
        "delay_probability": probability,
        "expected_delay_minutes": (probability * 150.0).round() as u32,
        "risk_level": risk,
        "factors": ["weather", "air_traffic", "historical_performance"],
        "confidence": round2(rng.gen_range(0.6..=0.9)),
    })
}

fn synthetic_recommendations<R: Rng + ?Sized>(data: &Value, rng: &mut R) -> Value {
    let origin = data.get("origin").and_then(Value::as_str).unwrap_or_default();

    let mut picks: Vec<_> = DESTINATIONS
        .iter()
        .filter(|(code, _)| !code.eq_ignore_ascii_case(origin))
        .collect();
    picks.shuffle(rng);

    let mut recommendations: Vec<Value> = picks
        .into_iter()
        .take(3)
        .map(|(code, city)| {
            json!({
                "destination": code,
                "city": city,
                "score": round2(rng.gen_range(0.6..=0.98)),
                "estimated_price": rng.gen_range(200..=1200),
                "reason": "Popular with travellers on similar routes",
            })
        })
        .collect();

    recommendations.sort_by(|a, b| {
        let sa = a["score"].as_f64().unwrap_or(0.0);
        let sb = b["score"].as_f64().unwrap_or(0.0);
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });

    json!({ "recommendations": recommendations })
}
