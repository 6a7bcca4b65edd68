//! Pass-through calls to the backend and AI services.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::info;

/// A remote service reached by base URL.
#[derive(Clone)]
pub struct Upstream {
    name: &'static str,
    http: Client,
    base_url: String,
}

/// Status and body of an upstream response, handed back to the caller as is.
#[derive(Debug)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        if self.body.is_null() {
            return self.status.into_response();
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl Upstream {
    pub fn new(name: &'static str, base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            name,
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Sends `request` once. Only transport failures are errors; any HTTP
    /// status comes back as a `Relayed`.
    pub async fn relay(&self, request: RequestBuilder) -> Result<Relayed, reqwest::Error> {
        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let bytes = response.bytes().await?;

        info!(
            upstream = self.name,
            url = %url,
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "Upstream request relayed"
        );

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| json!({ "message": String::from_utf8_lossy(&bytes) }))
        };

        Ok(Relayed { status, body })
    }
}
