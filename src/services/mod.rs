pub mod availability;
pub mod bookings;
pub mod export;
pub mod weather;
