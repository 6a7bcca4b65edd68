pub mod booking;
pub mod flight;
pub mod passenger;
pub mod user;

mod lenient;
