pub mod draft;
pub mod filter;
pub mod listing;
pub mod prediction;
pub mod pricing;
pub mod repository;
pub mod search;

pub use draft::{BookingDraft, BookingSession, DraftError};
pub use filter::{apply_filters, FlightFilters, PriceRange, TimeWindow};
pub use listing::FlightListState;
pub use pricing::{PriceBreakdown, PricingConfig, PricingEngine};
pub use repository::{BookingRepository, FlightRepository, ReceiptDelivery};
pub use search::FlightSearchParams;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Backend request failed: {0}")]
    BackendError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
