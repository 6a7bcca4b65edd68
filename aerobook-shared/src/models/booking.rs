use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::passenger::Passenger;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Paid,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Paid => "paid",
        };
        write!(f, "{}", s)
    }
}

/// Add-ons chosen after seat selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingExtras {
    #[serde(default)]
    pub checked_bags: u32,
    #[serde(default)]
    pub insurance: bool,
}

/// The authoritative booking persisted by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
    pub flight_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
    #[serde(default)]
    pub seats: Vec<String>,
    #[serde(default)]
    pub extras: BookingExtras,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Submission payload built from a completed draft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub flight_id: String,
    pub passengers: Vec<Passenger>,
    pub seats: Vec<String>,
    pub extras: BookingExtras,
    pub total_price: f64,
    pub currency: String,
}

pub fn default_currency() -> String {
    "USD".to_string()
}
