pub mod availability;
pub mod booking;
pub mod favorite;
pub mod field;
pub mod stats;
pub mod user;
pub mod weather;

pub use availability::{AvailabilityDay, SlotGrid, SlotSelection, TimeSlot};
pub use booking::{
    Booking, BookingQuery, BookingStatus, NewBooking, PaymentType, StatusCounts, StatusFilter,
    TransitionError,
};
pub use favorite::{Favorite, FavoriteSet};
pub use field::{Field, FieldPatch, NewField};
pub use stats::Stats;
pub use user::{Identity, Role, User};
pub use weather::Weather;
