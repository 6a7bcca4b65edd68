pub mod models;
pub mod pii;

pub use models::booking::{Booking, BookingExtras, BookingStatus, NewBooking};
pub use models::flight::{Flight, FlightStatus, Seat, SeatStatus};
pub use models::passenger::{Passenger, PassengerType};
pub use models::user::UserProfile;
pub use pii::Masked;
