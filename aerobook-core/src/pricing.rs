use aerobook_shared::{BookingExtras, Passenger, PassengerType};
use serde::{Deserialize, Serialize};

/// Fare rules applied to a draft booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingConfig {
    /// Share of the base fare charged per passenger type
    #[serde(default = "default_adult_multiplier")]
    pub adult_multiplier: f64,
    #[serde(default = "default_child_multiplier")]
    pub child_multiplier: f64,
    #[serde(default = "default_infant_multiplier")]
    pub infant_multiplier: f64,

    /// Fee per checked bag
    #[serde(default = "default_bag_fee")]
    pub checked_bag_fee: f64,

    /// Travel insurance, charged per passenger
    #[serde(default = "default_insurance_fee")]
    pub insurance_per_passenger: f64,

    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,

    #[serde(default = "aerobook_shared::models::booking::default_currency")]
    pub currency: String,
}

fn default_adult_multiplier() -> f64 { 1.0 }
fn default_child_multiplier() -> f64 { 0.75 }
fn default_infant_multiplier() -> f64 { 0.10 }
fn default_bag_fee() -> f64 { 35.0 }
fn default_insurance_fee() -> f64 { 25.0 }
fn default_tax_rate() -> f64 { 0.10 }

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            adult_multiplier: default_adult_multiplier(),
            child_multiplier: default_child_multiplier(),
            infant_multiplier: default_infant_multiplier(),
            checked_bag_fee: default_bag_fee(),
            insurance_per_passenger: default_insurance_fee(),
            tax_rate: default_tax_rate(),
            currency: aerobook_shared::models::booking::default_currency(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_fare: f64,
    pub baggage: f64,
    pub insurance: f64,
    pub taxes: f64,
    pub total: f64,
}

pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    fn multiplier(&self, passenger_type: PassengerType) -> f64 {
        match passenger_type {
            PassengerType::Adult => self.config.adult_multiplier,
            PassengerType::Child => self.config.child_multiplier,
            PassengerType::Infant => self.config.infant_multiplier,
        }
    }

    /// Fare for the passenger list before any add-ons
    pub fn base_fare(&self, fare_per_passenger: f64, passengers: &[Passenger]) -> f64 {
        round_cents(
            passengers
                .iter()
                .map(|p| fare_per_passenger * self.multiplier(p.passenger_type))
                .sum(),
        )
    }

    /// Full quote. Bags are counted from the extras plus any per-passenger bags.
    pub fn quote(&self, fare_per_passenger: f64, passengers: &[Passenger], extras: &BookingExtras) -> PriceBreakdown {
        let base_fare = self.base_fare(fare_per_passenger, passengers);

        let bags: u32 = extras.checked_bags + passengers.iter().map(|p| p.checked_bags).sum::<u32>();
        let baggage = round_cents(bags as f64 * self.config.checked_bag_fee);

        let insurance = if extras.insurance {
            round_cents(passengers.len() as f64 * self.config.insurance_per_passenger)
        } else {
            0.0
        };

        let taxes = round_cents(base_fare * self.config.tax_rate);
        let total = round_cents(base_fare + baggage + insurance + taxes);

        PriceBreakdown { base_fare, baggage, insurance, taxes, total }
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
