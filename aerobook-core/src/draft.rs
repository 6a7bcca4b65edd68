//! In-progress booking accumulated across the wizard steps.
//!
//! Each step's data only exists in the states that follow it, so a seat
//! assignment without passengers (or passengers without a flight) cannot be
//! represented. Transitions from the wrong state are rejected and leave the
//! draft untouched.

use aerobook_shared::{Booking, BookingExtras, Flight, NewBooking, Passenger};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::pricing::{PriceBreakdown, PricingEngine};
use crate::repository::{BookingRepository, FlightRepository};
use crate::CoreError;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum BookingDraft {
    #[default]
    Empty,
    FlightSelected {
        flight: Flight,
    },
    PassengersEntered {
        flight: Flight,
        passengers: Vec<Passenger>,
        total_price: f64,
    },
    SeatsAssigned {
        flight: Flight,
        passengers: Vec<Passenger>,
        seats: Vec<String>,
        total_price: f64,
    },
    PaymentReady {
        flight: Flight,
        passengers: Vec<Passenger>,
        seats: Vec<String>,
        extras: BookingExtras,
        quote: PriceBreakdown,
        currency: String,
    },
    Submitted {
        booking: Booking,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("Cannot {action} while the draft is {from}")]
    InvalidTransition { from: &'static str, action: &'static str },
    #[error("Invalid draft data: {0}")]
    Validation(String),
    #[error("Seat {0} is not available on this flight")]
    SeatUnavailable(String),
    #[error(transparent)]
    Backend(#[from] CoreError),
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::Empty
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            BookingDraft::Empty => "empty",
            BookingDraft::FlightSelected { .. } => "flight_selected",
            BookingDraft::PassengersEntered { .. } => "passengers_entered",
            BookingDraft::SeatsAssigned { .. } => "seats_assigned",
            BookingDraft::PaymentReady { .. } => "payment_ready",
            BookingDraft::Submitted { .. } => "submitted",
        }
    }

    fn reject(&self, action: &'static str) -> DraftError {
        DraftError::InvalidTransition { from: self.state_name(), action }
    }

    /// Binds the draft to a flight. Rebinding discards every later step.
    pub fn set_flight(&mut self, flight: Flight) -> Result<(), DraftError> {
        if let BookingDraft::Submitted { .. } = self {
            return Err(self.reject("select a flight"));
        }
        debug!(flight_id = %flight.id, "Draft bound to flight");
        *self = BookingDraft::FlightSelected { flight };
        Ok(())
    }

    /// Replaces the passenger list and the total computed for it.
    pub fn update_passengers(&mut self, passengers: Vec<Passenger>, total_price: f64) -> Result<(), DraftError> {
        let flight = match self {
            BookingDraft::FlightSelected { flight } | BookingDraft::PassengersEntered { flight, .. } => flight.clone(),
            _ => return Err(self.reject("update passengers")),
        };
        if passengers.is_empty() {
            return Err(DraftError::Validation("At least one passenger is required".to_string()));
        }

        debug!(passengers = passengers.len(), total_price, "Draft passengers updated");
        *self = BookingDraft::PassengersEntered { flight, passengers, total_price };
        Ok(())
    }

    /// One seat per passenger, in passenger order.
    pub fn assign_seats(&mut self, seat_ids: Vec<String>) -> Result<(), DraftError> {
        let (flight, passengers, total_price) = match self {
            BookingDraft::PassengersEntered { flight, passengers, total_price }
            | BookingDraft::SeatsAssigned { flight, passengers, total_price, .. } => {
                (flight.clone(), passengers.clone(), *total_price)
            }
            _ => return Err(self.reject("assign seats")),
        };

        if seat_ids.len() != passengers.len() {
            return Err(DraftError::Validation(format!(
                "Expected {} seats, got {}",
                passengers.len(),
                seat_ids.len()
            )));
        }

        let mut seen = HashSet::new();
        for id in &seat_ids {
            if !seen.insert(id.as_str()) {
                return Err(DraftError::Validation(format!("Seat {} selected twice", id)));
            }
            match flight.seat(id) {
                Some(seat) if seat.is_available() => {}
                _ => return Err(DraftError::SeatUnavailable(id.clone())),
            }
        }

        let passengers = passengers
            .into_iter()
            .zip(seat_ids.iter())
            .map(|(mut p, seat)| {
                p.seat = Some(seat.clone());
                p
            })
            .collect();

        *self = BookingDraft::SeatsAssigned { flight, passengers, seats: seat_ids, total_price };
        Ok(())
    }

    /// Chooses baggage and insurance and prices the whole draft.
    pub fn add_extras(&mut self, extras: BookingExtras, pricing: &PricingEngine) -> Result<(), DraftError> {
        let (flight, passengers, seats) = match self {
            BookingDraft::SeatsAssigned { flight, passengers, seats, .. }
            | BookingDraft::PaymentReady { flight, passengers, seats, .. } => {
                (flight.clone(), passengers.clone(), seats.clone())
            }
            _ => return Err(self.reject("choose extras")),
        };

        if !flight.price.is_finite() {
            return Err(DraftError::Validation(format!("Flight {} has no usable fare", flight.id)));
        }

        let quote = pricing.quote(flight.price, &passengers, &extras);
        debug!(total = quote.total, "Draft priced");
        *self = BookingDraft::PaymentReady {
            flight,
            passengers,
            seats,
            extras,
            quote,
            currency: pricing.currency().to_string(),
        };
        Ok(())
    }

    /// Payload for the backend, available once the draft is payment-ready.
    pub fn new_booking(&self) -> Option<NewBooking> {
        match self {
            BookingDraft::PaymentReady { flight, passengers, seats, extras, quote, currency } => Some(NewBooking {
                flight_id: flight.id.clone(),
                passengers: passengers.clone(),
                seats: seats.clone(),
                extras: *extras,
                total_price: quote.total,
                currency: currency.clone(),
            }),
            _ => None,
        }
    }

    /// The only step that talks to the backend: one POST, no retry. On
    /// failure the draft stays payment-ready.
    pub async fn submit(&mut self, bookings: &dyn BookingRepository) -> Result<&Booking, DraftError> {
        let payload = self.new_booking().ok_or_else(|| self.reject("submit"))?;

        let booking = bookings.create_booking(&payload).await.map_err(|e| {
            warn!(flight_id = %payload.flight_id, error = %e, "Booking submission failed");
            DraftError::Backend(e)
        })?;

        info!(booking_id = %booking.id, "Booking submitted");
        *self = BookingDraft::Submitted { booking };
        self.booking().ok_or_else(|| self.reject("submit"))
    }

    pub fn reset(&mut self) {
        *self = BookingDraft::Empty;
    }

    pub fn flight(&self) -> Option<&Flight> {
        match self {
            BookingDraft::FlightSelected { flight }
            | BookingDraft::PassengersEntered { flight, .. }
            | BookingDraft::SeatsAssigned { flight, .. }
            | BookingDraft::PaymentReady { flight, .. } => Some(flight),
            _ => None,
        }
    }

    pub fn passengers(&self) -> &[Passenger] {
        match self {
            BookingDraft::PassengersEntered { passengers, .. }
            | BookingDraft::SeatsAssigned { passengers, .. }
            | BookingDraft::PaymentReady { passengers, .. } => passengers,
            BookingDraft::Submitted { booking } => &booking.passengers,
            _ => &[],
        }
    }

    pub fn seats(&self) -> &[String] {
        match self {
            BookingDraft::SeatsAssigned { seats, .. } | BookingDraft::PaymentReady { seats, .. } => seats,
            BookingDraft::Submitted { booking } => &booking.seats,
            _ => &[],
        }
    }

    pub fn total_price(&self) -> Option<f64> {
        match self {
            BookingDraft::PassengersEntered { total_price, .. } | BookingDraft::SeatsAssigned { total_price, .. } => {
                Some(*total_price)
            }
            BookingDraft::PaymentReady { quote, .. } => Some(quote.total),
            BookingDraft::Submitted { booking } => Some(booking.total_price),
            _ => None,
        }
    }

    pub fn booking(&self) -> Option<&Booking> {
        match self {
            BookingDraft::Submitted { booking } => Some(booking),
            _ => None,
        }
    }
}

/// A draft bound to the flights backend, with a cache of flights the user
/// has already seen in search results.
pub struct BookingSession {
    flights: Arc<dyn FlightRepository>,
    cache: HashMap<String, Flight>,
    draft: BookingDraft,
}

impl BookingSession {
    pub fn new(flights: Arc<dyn FlightRepository>) -> Self {
        Self {
            flights,
            cache: HashMap::new(),
            draft: BookingDraft::Empty,
        }
    }

    pub fn remember(&mut self, flights: &[Flight]) {
        for flight in flights {
            self.cache.insert(flight.id.clone(), flight.clone());
        }
    }

    /// Binds the draft to `flight_id`, fetching the flight only on a cache miss.
    pub async fn select_flight(&mut self, flight_id: &str) -> Result<(), DraftError> {
        let flight = match self.cache.get(flight_id) {
            Some(flight) => flight.clone(),
            None => {
                let flight = self.flights.get_flight_by_id(flight_id).await?;
                self.cache.insert(flight_id.to_string(), flight.clone());
                flight
            }
        };
        self.draft.set_flight(flight)
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut BookingDraft {
        &mut self.draft
    }

    pub async fn submit(&mut self, bookings: &dyn BookingRepository) -> Result<Booking, DraftError> {
        self.draft.submit(bookings).await.cloned()
    }

    pub fn clear(&mut self) {
        self.draft.reset();
        self.cache.clear();
    }
}
