//! Client-side filtering of an already fetched flight list.
//!
//! Filtering is a pure function of `(flights, filters)`: the result is always
//! a subsequence of the input, and an empty selection on any dimension means
//! no restriction on that dimension.

use aerobook_shared::Flight;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Departure time bucket derived from the departure hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Morning,
        TimeWindow::Afternoon,
        TimeWindow::Evening,
        TimeWindow::Night,
    ];

    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            0..=5 => Some(TimeWindow::Night),
            6..=11 => Some(TimeWindow::Morning),
            12..=17 => Some(TimeWindow::Afternoon),
            18..=23 => Some(TimeWindow::Evening),
            _ => None,
        }
    }

    /// Bucket of a flight's departure; `None` when the time is unreadable.
    pub fn of(flight: &Flight) -> Option<Self> {
        flight.departure_hour().and_then(Self::from_hour)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Night => "night",
            TimeWindow::Morning => "morning",
            TimeWindow::Afternoon => "afternoon",
            TimeWindow::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "night" => Ok(TimeWindow::Night),
            "morning" => Ok(TimeWindow::Morning),
            "afternoon" => Ok(TimeWindow::Afternoon),
            "evening" => Ok(TimeWindow::Evening),
            other => Err(CoreError::ValidationError(format!("Unknown time window: {}", other))),
        }
    }
}

/// Inclusive `[min, max]` price bounds, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange(pub f64, pub f64);

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self(min, max)
    }

    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }

    /// NaN never matches.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.0 && price <= self.1
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self(0.0, f64::MAX)
    }
}

/// Transient filter selection held by a result view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightFilters {
    pub airlines: BTreeSet<String>,
    pub price_range: PriceRange,
    pub stops: BTreeSet<u32>,
    pub times: BTreeSet<TimeWindow>,
}

impl FlightFilters {
    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = PriceRange::new(min, max);
        self
    }

    pub fn with_airline(mut self, airline: impl Into<String>) -> Self {
        self.airlines.insert(airline.into());
        self
    }

    pub fn with_stops(mut self, stops: u32) -> Self {
        self.stops.insert(stops);
        self
    }

    pub fn with_time(mut self, window: TimeWindow) -> Self {
        self.times.insert(window);
        self
    }

    /// Conjunction of every predicate, cheap numeric checks first.
    pub fn matches(&self, flight: &Flight) -> bool {
        Predicate::DEFAULT_ORDER.iter().all(|p| p.test(self, flight))
    }

    pub fn is_unrestricted(&self) -> bool {
        self.airlines.is_empty()
            && self.stops.is_empty()
            && self.times.is_empty()
            && self.price_range == PriceRange::default()
    }
}

/// One filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Price,
    Stops,
    Airline,
    Time,
}

impl Predicate {
    pub const DEFAULT_ORDER: [Predicate; 4] = [
        Predicate::Price,
        Predicate::Stops,
        Predicate::Airline,
        Predicate::Time,
    ];

    pub fn test(self, filters: &FlightFilters, flight: &Flight) -> bool {
        match self {
            Predicate::Price => filters.price_range.contains(flight.price),
            Predicate::Stops => filters.stops.is_empty() || filters.stops.contains(&flight.stops),
            Predicate::Airline => filters.airlines.is_empty() || filters.airlines.contains(&flight.airline),
            Predicate::Time => {
                filters.times.is_empty()
                    || TimeWindow::of(flight).is_some_and(|w| filters.times.contains(&w))
            }
        }
    }
}

/// Subset of `flights` matching `filters`, in source order.
pub fn apply_filters(flights: &[Flight], filters: &FlightFilters) -> Vec<Flight> {
    flights.iter().filter(|f| filters.matches(f)).cloned().collect()
}

/// Same as [`apply_filters`] with an explicit predicate order.
pub fn apply_filters_ordered(flights: &[Flight], filters: &FlightFilters, order: &[Predicate]) -> Vec<Flight> {
    flights
        .iter()
        .filter(|f| order.iter().all(|p| p.test(filters, f)))
        .cloned()
        .collect()
}

/// Distinct airlines present in a result list, sorted.
pub fn available_airlines(flights: &[Flight]) -> Vec<String> {
    flights
        .iter()
        .filter(|f| !f.airline.is_empty())
        .map(|f| f.airline.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Smallest range covering every well-formed price, if any.
pub fn price_bounds(flights: &[Flight]) -> Option<PriceRange> {
    flights
        .iter()
        .map(|f| f.price)
        .filter(|p| p.is_finite())
        .fold(None, |acc: Option<PriceRange>, p| match acc {
            None => Some(PriceRange(p, p)),
            Some(r) => Some(PriceRange(r.0.min(p), r.1.max(p))),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Price,
    Departure,
    Duration,
}

/// Stable sort; flights with unreadable sort fields go last.
pub fn sort_flights(flights: &mut [Flight], key: SortKey) {
    fn last_if_none<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    match key {
        SortKey::Price => flights.sort_by(|a, b| {
            let pa = Some(a.price).filter(|p| !p.is_nan());
            let pb = Some(b.price).filter(|p| !p.is_nan());
            last_if_none(pa, pb)
        }),
        SortKey::Departure => flights.sort_by(|a, b| last_if_none(a.departure_hour(), b.departure_hour())),
        SortKey::Duration => flights.sort_by(|a, b| last_if_none(a.duration_minutes(), b.duration_minutes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(id: &str, airline: &str, price: f64, stops: u32, departure: &str) -> Flight {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "airline": airline,
            "price": price,
            "stops": stops,
            "departureTime": departure,
        }))
        .unwrap()
    }

    fn sample() -> Vec<Flight> {
        vec![
            flight("1", "Emirates", 500.0, 0, "08:00"),
            flight("2", "Qatar", 1500.0, 2, "23:30"),
            flight("3", "Emirates", 1000.0, 1, "13:15"),
            flight("4", "Air Peace", 0.0, 0, "03:40"),
            flight("5", "Qatar", 750.0, 1, "2024-12-25T18:00:00Z"),
            flight("6", "Lufthansa", 620.0, 0, "tbd"),
        ]
    }

    fn ids(flights: &[Flight]) -> Vec<&str> {
        flights.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_price_range_scenario() {
        let flights = vec![
            flight("ek", "Emirates", 500.0, 0, "08:00"),
            flight("qr", "Qatar", 1500.0, 2, "23:30"),
        ];
        let filters = FlightFilters::default().with_price_range(0.0, 1000.0);
        assert_eq!(ids(&apply_filters(&flights, &filters)), vec!["ek"]);
    }

    #[test]
    fn test_default_filters_keep_everything() {
        let flights = sample();
        let filters = FlightFilters::default();
        assert!(filters.is_unrestricted());
        assert_eq!(apply_filters(&flights, &filters), flights);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let flights = sample();
        let filters = FlightFilters::default().with_price_range(500.0, 1000.0);
        assert_eq!(ids(&apply_filters(&flights, &filters)), vec!["1", "3", "5", "6"]);

        let filters = FlightFilters::default().with_price_range(0.0, 0.0);
        assert_eq!(ids(&apply_filters(&flights, &filters)), vec!["4"]);
    }

    #[test]
    fn test_time_windows() {
        assert_eq!(TimeWindow::from_hour(0), Some(TimeWindow::Night));
        assert_eq!(TimeWindow::from_hour(5), Some(TimeWindow::Night));
        assert_eq!(TimeWindow::from_hour(6), Some(TimeWindow::Morning));
        assert_eq!(TimeWindow::from_hour(11), Some(TimeWindow::Morning));
        assert_eq!(TimeWindow::from_hour(12), Some(TimeWindow::Afternoon));
        assert_eq!(TimeWindow::from_hour(17), Some(TimeWindow::Afternoon));
        assert_eq!(TimeWindow::from_hour(18), Some(TimeWindow::Evening));
        assert_eq!(TimeWindow::from_hour(23), Some(TimeWindow::Evening));
        assert_eq!(TimeWindow::from_hour(24), None);

        let flights = sample();
        let filters = FlightFilters::default()
            .with_time(TimeWindow::Evening)
            .with_time(TimeWindow::Night);
        assert_eq!(ids(&apply_filters(&flights, &filters)), vec!["2", "4", "5"]);
    }

    #[test]
    fn test_unreadable_departure_only_passes_without_time_filter() {
        let flights = sample();
        let everything = apply_filters(&flights, &FlightFilters::default());
        assert!(ids(&everything).contains(&"6"));

        let all_windows = TimeWindow::ALL
            .iter()
            .fold(FlightFilters::default(), |f, w| f.with_time(*w));
        assert!(!ids(&apply_filters(&flights, &all_windows)).contains(&"6"));
    }

    #[test]
    fn test_airline_and_stops_sets() {
        let flights = sample();
        let filters = FlightFilters::default().with_airline("Qatar").with_stops(1).with_stops(0);
        assert_eq!(ids(&apply_filters(&flights, &filters)), vec!["5"]);

        let filters = FlightFilters::default().with_airline("Emirates").with_airline("Air Peace");
        assert_eq!(ids(&apply_filters(&flights, &filters)), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_nan_price_is_excluded() {
        let mut flights = sample();
        flights[0].price = f64::NAN;
        let result = apply_filters(&flights, &FlightFilters::default());
        assert!(!ids(&result).contains(&"1"));
    }

    #[test]
    fn test_result_is_subset_for_many_filter_states() {
        let flights = sample();
        let airline_choices: [&[&str]; 3] = [&[], &["Qatar"], &["Emirates", "Lufthansa"]];
        let stop_choices: [&[u32]; 3] = [&[], &[0], &[1, 2]];
        let time_choices: [&[TimeWindow]; 3] = [&[], &[TimeWindow::Morning], &[TimeWindow::Night, TimeWindow::Evening]];
        let price_choices = [(0.0, f64::MAX), (500.0, 1000.0), (2000.0, 3000.0)];

        for airlines in airline_choices {
            for stops in stop_choices {
                for times in time_choices {
                    for (min, max) in price_choices {
                        let filters = FlightFilters {
                            airlines: airlines.iter().map(|s| s.to_string()).collect(),
                            price_range: PriceRange(min, max),
                            stops: stops.iter().copied().collect(),
                            times: times.iter().copied().collect(),
                        };
                        let result = apply_filters(&flights, &filters);
                        assert!(result.iter().all(|r| flights.contains(r)));
                        assert!(result.iter().all(|r| filters.matches(r)));
                        assert!(result.len() <= flights.len());
                    }
                }
            }
        }
    }

    #[test]
    fn test_predicate_order_does_not_matter() {
        let flights = sample();
        let filters = FlightFilters::default()
            .with_price_range(400.0, 1600.0)
            .with_airline("Qatar")
            .with_airline("Emirates")
            .with_stops(1)
            .with_stops(2)
            .with_time(TimeWindow::Evening)
            .with_time(TimeWindow::Afternoon);
        let expected = apply_filters(&flights, &filters);

        let orders: [[Predicate; 4]; 4] = [
            [Predicate::Time, Predicate::Airline, Predicate::Stops, Predicate::Price],
            [Predicate::Airline, Predicate::Price, Predicate::Time, Predicate::Stops],
            [Predicate::Stops, Predicate::Time, Predicate::Price, Predicate::Airline],
            Predicate::DEFAULT_ORDER,
        ];
        for order in orders {
            assert_eq!(apply_filters_ordered(&flights, &filters, &order), expected);
        }
        assert_eq!(ids(&expected), vec!["2", "3", "5"]);
    }

    #[test]
    fn test_filter_state_wire_format() {
        let filters: FlightFilters = serde_json::from_str(
            r#"{ "airlines": ["Emirates"], "priceRange": [0, 1000], "times": ["morning", "night"] }"#,
        )
        .unwrap();
        assert_eq!(filters.price_range, PriceRange(0.0, 1000.0));
        assert!(filters.stops.is_empty());
        assert!(filters.times.contains(&TimeWindow::Night));
        assert_eq!("Evening".parse::<TimeWindow>().unwrap(), TimeWindow::Evening);
        assert!("dawn".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn test_facets_and_sorting() {
        let mut flights = sample();
        assert_eq!(available_airlines(&flights), vec!["Air Peace", "Emirates", "Lufthansa", "Qatar"]);
        assert_eq!(price_bounds(&flights), Some(PriceRange(0.0, 1500.0)));
        assert_eq!(price_bounds(&[]), None);

        sort_flights(&mut flights, SortKey::Price);
        assert_eq!(ids(&flights), vec!["4", "1", "6", "5", "3", "2"]);

        sort_flights(&mut flights, SortKey::Departure);
        assert_eq!(ids(&flights).last(), Some(&"6"));
        assert_eq!(ids(&flights).first(), Some(&"4"));
    }

    #[test]
    fn test_duration_sort_puts_oversized_last() {
        let timed = |id: &str, duration: &str| -> Flight {
            serde_json::from_value(serde_json::json!({ "id": id, "duration": duration })).unwrap()
        };
        let mut flights = vec![timed("huge", "99999999h"), timed("long", "9h"), timed("short", "1h 10m")];
        sort_flights(&mut flights, SortKey::Duration);
        assert_eq!(ids(&flights), vec!["short", "long", "huge"]);
    }
}
