use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::lenient;

/// Operational status reported by the backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlightStatus {
    #[default]
    Scheduled,
    Boarding,
    Delayed,
    Departed,
    Landed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    #[default]
    Available,
    Occupied,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: String,
    #[serde(default)]
    pub row: u32,
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub status: SeatStatus,
}

impl Seat {
    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }
}

/// A flight as returned by the flights backend. The backend owns it; the
/// client never mutates a fetched flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub airline: String,
    #[serde(default)]
    pub flight_number: String,
    /// `HH:MM` or an RFC 3339 timestamp, whichever the backend sends.
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub duration: String,
    /// Base fare per passenger.
    #[serde(default = "missing_price", deserialize_with = "lenient::f64_or_nan")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub stops: u32,
    #[serde(default)]
    pub seats: Vec<Seat>,
    #[serde(default)]
    pub aircraft: String,
    #[serde(default)]
    pub status: FlightStatus,
    #[serde(default)]
    pub is_deal: bool,
}

fn missing_price() -> f64 {
    f64::NAN
}

impl Flight {
    /// Local hour of departure, if the departure time can be read at all.
    pub fn departure_hour(&self) -> Option<u32> {
        parse_hour(&self.departure_time)
    }

    pub fn seat(&self, seat_id: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id == seat_id)
    }

    pub fn available_seats(&self) -> usize {
        self.seats.iter().filter(|s| s.is_available()).count()
    }

    /// Duration in minutes parsed from strings like `"7h 30m"`, `"45m"` or `"2h"`.
    pub fn duration_minutes(&self) -> Option<u32> {
        let mut total = 0u32;
        let mut seen = false;
        for part in self.duration.split_whitespace() {
            let (digits, unit) = part.split_at(part.find(|c: char| !c.is_ascii_digit())?);
            let value: u32 = digits.parse().ok()?;
            let minutes = match unit {
                "h" => value.checked_mul(60)?,
                "m" => value,
                _ => return None,
            };
            total = total.checked_add(minutes)?;
            seen = true;
        }
        seen.then_some(total)
    }
}

fn parse_hour(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(t) = NaiveTime::parse_from_str(raw, "%H:%M") {
        return Some(t.hour());
    }
    if let Ok(t) = NaiveTime::parse_from_str(raw, "%H:%M:%S") {
        return Some(t.hour());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.hour());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.hour())
}
