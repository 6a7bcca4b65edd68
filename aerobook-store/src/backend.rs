//! HTTP client for the external flights and bookings backend.

use aerobook_core::repository::{BookingRepository, FlightRepository, ReceiptDelivery};
use aerobook_core::{CoreError, CoreResult, FlightSearchParams};
use aerobook_shared::{Booking, Flight, NewBooking};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::app_config::BackendConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Could not decode backend response: {0}")]
    Decode(String),
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(what) => CoreError::NotFound(what),
            ClientError::Validation(msg) => CoreError::ValidationError(msg),
            other => CoreError::BackendError(other.to_string()),
        }
    }
}

/// Whether `id` can be spliced into a backend path as a single segment.
pub fn is_path_segment(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn segment<'a>(id: &'a str, what: &str) -> Result<&'a str, ClientError> {
    if is_path_segment(id) {
        Ok(id)
    } else {
        warn!(what, "Rejected identifier that is not a single path segment");
        Err(ClientError::Validation(format!("Invalid {}", what)))
    }
}

/// Responses arrive either bare or wrapped in a one-key envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Data { data: T },
    Flights { flights: T },
    Flight { flight: T },
    Booking { booking: T },
    Bookings { bookings: T },
    Bare(T),
}

impl<T> Payload<T> {
    fn into_inner(self) -> T {
        match self {
            Payload::Data { data } => data,
            Payload::Flights { flights } => flights,
            Payload::Flight { flight } => flight,
            Payload::Booking { booking } => booking,
            Payload::Bookings { bookings } => bookings,
            Payload::Bare(value) => value,
        }
    }
}

/// One attempt per call: no retry, no backoff.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        debug!(base_url = %config.url, "Backend client created");
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Same client, authenticating as the holder of `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<reqwest::Response, ClientError> {
        let start = Instant::now();
        let response = self.authorize(request).send().await?;
        let status = response.status();

        info!(
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            endpoint = what,
            "Backend request completed"
        );

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, endpoint = what, "Backend request failed");
            return Err(ClientError::Status { status: status.as_u16(), body });
        }
        Ok(response)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, ClientError> {
        let bytes = self.send(request, what).await?.bytes().await?;
        decode(&bytes, what)
    }

    /// Like `execute`, but an empty success body is `None`.
    async fn execute_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<Option<T>, ClientError> {
        let bytes = self.send(request, what).await?.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        decode(&bytes, what).map(Some)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn search(&self, params: &FlightSearchParams) -> Result<Vec<Flight>, ClientError> {
        params
            .validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let request = self.http.get(self.url("/api/flights")).query(&params.query_pairs());
        let flights: Vec<Flight> = self.execute(request, "flights").await?;
        info!(flights_found = flights.len(), "Flight search completed");
        Ok(flights)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn flight(&self, id: &str) -> Result<Flight, ClientError> {
        let id = segment(id, "flight id")?;
        let request = self.http.get(self.url(&format!("/api/flights/{}", id)));
        self.execute(request, &format!("flight {}", id)).await
    }

    pub async fn deals(&self) -> Result<Vec<Flight>, ClientError> {
        let request = self.http.get(self.url("/api/flights/deals"));
        self.execute(request, "deals").await
    }

    #[instrument(level = "info", skip(self, booking), fields(flight_id = %booking.flight_id))]
    pub async fn post_booking(&self, booking: &NewBooking) -> Result<Booking, ClientError> {
        let request = self.http.post(self.url("/api/bookings")).json(booking);
        let created: Booking = self.execute(request, "bookings").await?;
        info!(booking_id = %created.id, "Booking created");
        Ok(created)
    }

    pub async fn booking(&self, id: &str) -> Result<Booking, ClientError> {
        let id = segment(id, "booking id")?;
        let request = self.http.get(self.url(&format!("/api/bookings/{}", id)));
        self.execute(request, &format!("booking {}", id)).await
    }

    pub async fn user_bookings(&self, user_id: &str) -> Result<Vec<Booking>, ClientError> {
        let user_id = segment(user_id, "user id")?;
        let request = self.http.get(self.url(&format!("/api/bookings/user/{}", user_id)));
        self.execute(request, &format!("bookings of user {}", user_id)).await
    }

    /// A 204 or otherwise empty answer yields `None`.
    pub async fn delete_booking(&self, id: &str) -> Result<Option<Booking>, ClientError> {
        let id = segment(id, "booking id")?;
        let request = self.http.delete(self.url(&format!("/api/bookings/{}", id)));
        let cancelled = self.execute_optional(request, &format!("booking {}", id)).await?;
        info!(booking_id = id, "Booking cancelled");
        Ok(cancelled)
    }

    pub async fn receipt(&self, booking_id: &str, email: &str) -> Result<(), ClientError> {
        let booking_id = segment(booking_id, "booking id")?;
        let request = self
            .http
            .post(self.url(&format!("/api/bookings/{}/receipt", booking_id)))
            .json(&serde_json::json!({ "email": email }));
        self.send(request, "receipt").await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T, ClientError> {
    serde_json::from_slice::<Payload<T>>(bytes)
        .map(Payload::into_inner)
        .map_err(|e| {
            error!(endpoint = what, error = %e, "Backend response did not match the expected shape");
            ClientError::Decode(e.to_string())
        })
}

#[async_trait]
impl FlightRepository for BackendClient {
    async fn search_flights(&self, params: &FlightSearchParams) -> CoreResult<Vec<Flight>> {
        Ok(self.search(params).await?)
    }

    async fn get_flight_by_id(&self, id: &str) -> CoreResult<Flight> {
        Ok(self.flight(id).await?)
    }

    async fn get_special_deals(&self) -> CoreResult<Vec<Flight>> {
        Ok(self.deals().await?)
    }
}

#[async_trait]
impl BookingRepository for BackendClient {
    async fn create_booking(&self, booking: &NewBooking) -> CoreResult<Booking> {
        Ok(self.post_booking(booking).await?)
    }

    async fn get_booking(&self, id: &str) -> CoreResult<Booking> {
        Ok(self.booking(id).await?)
    }

    async fn list_user_bookings(&self, user_id: &str) -> CoreResult<Vec<Booking>> {
        Ok(self.user_bookings(user_id).await?)
    }

    async fn cancel_booking(&self, id: &str) -> CoreResult<Option<Booking>> {
        Ok(self.delete_booking(id).await?)
    }

    async fn send_receipt_email(&self, booking_id: &str, email: &str) -> ReceiptDelivery {
        match self.receipt(booking_id, email).await {
            Ok(()) => ReceiptDelivery::Sent,
            Err(e) => {
                warn!(booking_id, error = %e, "Receipt email request failed");
                ReceiptDelivery::Failed(e.to_string())
            }
        }
    }
}
