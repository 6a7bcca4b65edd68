use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Search criteria forwarded verbatim to the flights backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchParams {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub departure_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    /// Left out of the backend query when the caller gave none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passengers: Option<u32>,
}

impl FlightSearchParams {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, departure_date: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date: departure_date.into(),
            return_date: None,
            passengers: None,
        }
    }

    pub fn with_passengers(mut self, passengers: u32) -> Self {
        self.passengers = Some(passengers);
        self
    }

    /// Number of travellers, one when unspecified.
    pub fn passenger_count(&self) -> u32 {
        self.passengers.unwrap_or(1)
    }

    /// Presence checks only; the backend owns every other rule.
    pub fn validate(&self) -> CoreResult<()> {
        let missing: Vec<&str> = [
            ("origin", &self.origin),
            ("destination", &self.destination),
            ("departureDate", &self.departure_date),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ValidationError(format!("Missing required parameters: {}", missing.join(", "))))
        }
    }

    /// Query string pairs in the backend's naming.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("origin", self.origin.clone()),
            ("destination", self.destination.clone()),
            ("departureDate", self.departure_date.clone()),
        ];
        if let Some(return_date) = self.return_date.as_ref().filter(|d| !d.is_empty()) {
            pairs.push(("returnDate", return_date.clone()));
        }
        if let Some(passengers) = self.passengers {
            pairs.push(("passengers", passengers.to_string()));
        }
        pairs
    }
}
