use aerobook_shared::Flight;
use tracing::debug;

use crate::filter::{apply_filters, FlightFilters};
use crate::CoreResult;

/// Identifies one search request; only the newest ticket may apply results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Result-list state behind a search page: the fetched flights, the current
/// filters and the derived visible subset.
#[derive(Debug, Default)]
pub struct FlightListState {
    source: Vec<Flight>,
    filters: FlightFilters,
    visible: Vec<Flight>,
    loading: bool,
    error: Option<String>,
    latest: u64,
}

impl FlightListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a search as in flight and supersedes any earlier one.
    pub fn begin_search(&mut self) -> SearchTicket {
        self.latest += 1;
        self.loading = true;
        self.error = None;
        SearchTicket(self.latest)
    }

    /// Applies a search outcome unless a newer search has started since.
    /// Returns whether the outcome was applied.
    pub fn apply_results(&mut self, ticket: SearchTicket, outcome: CoreResult<Vec<Flight>>) -> bool {
        if ticket.0 != self.latest {
            debug!(ticket = ticket.0, latest = self.latest, "Discarding stale search response");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(flights) => {
                self.source = flights;
                self.error = None;
            }
            Err(e) => {
                self.source.clear();
                self.error = Some(e.to_string());
            }
        }
        self.recompute();
        true
    }

    pub fn set_filters(&mut self, filters: FlightFilters) {
        self.filters = filters;
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.set_filters(FlightFilters::default());
    }

    fn recompute(&mut self) {
        self.visible = apply_filters(&self.source, &self.filters);
    }

    pub fn source(&self) -> &[Flight] {
        &self.source
    }

    pub fn visible(&self) -> &[Flight] {
        &self.visible
    }

    pub fn filters(&self) -> &FlightFilters {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
