use aerobook_shared::{Booking, Flight, NewBooking};
use async_trait::async_trait;

use crate::search::FlightSearchParams;
use crate::CoreResult;

/// Read access to the external flights backend
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn search_flights(&self, params: &FlightSearchParams) -> CoreResult<Vec<Flight>>;

    /// `CoreError::NotFound` when the backend has no such flight.
    async fn get_flight_by_id(&self, id: &str) -> CoreResult<Flight>;

    /// Whatever the backend currently flags as a deal.
    async fn get_special_deals(&self) -> CoreResult<Vec<Flight>>;
}

/// Booking endpoints of the external backend
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Single POST. No retry and no idempotency key: a resubmission after a
    /// timeout may create a second booking.
    async fn create_booking(&self, booking: &NewBooking) -> CoreResult<Booking>;

    async fn get_booking(&self, id: &str) -> CoreResult<Booking>;

    async fn list_user_bookings(&self, user_id: &str) -> CoreResult<Vec<Booking>>;

    /// The cancelled booking, or `None` when the backend answers without a body.
    async fn cancel_booking(&self, id: &str) -> CoreResult<Option<Booking>>;

    /// Fire-and-forget; failures come back as a notification, never an error.
    async fn send_receipt_email(&self, booking_id: &str, email: &str) -> ReceiptDelivery;
}

/// Outcome of a receipt email request, shown to the user as a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptDelivery {
    Sent,
    Failed(String),
}

impl ReceiptDelivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, ReceiptDelivery::Sent)
    }

    pub fn message(&self) -> String {
        match self {
            ReceiptDelivery::Sent => "Receipt sent to your email".to_string(),
            ReceiptDelivery::Failed(reason) => format!("Could not send receipt: {}", reason),
        }
    }
}
