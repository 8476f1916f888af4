pub mod fixture;
pub mod live;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{Booking, BookingStatus, Field, FieldPatch, Identity, NewBooking, NewField};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Everything the service needs from the hosted backend.
///
/// Chosen once at startup from configuration; see [`BackendMode`].
#[async_trait]
pub trait Repository: Send + Sync {
    // identity
    async fn sign_in(&self, email: &str, password: &str) -> RepoResult<Identity>;
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> RepoResult<Identity>;
    async fn sign_out(&self, backend_token: Option<&str>) -> RepoResult<()>;

    // fields
    async fn list_fields(&self) -> RepoResult<Vec<Field>>;
    async fn get_field(&self, id: &str) -> RepoResult<Option<Field>>;
    async fn create_field(&self, field: NewField) -> RepoResult<Field>;
    async fn update_field(&self, id: &str, patch: FieldPatch) -> RepoResult<Option<Field>>;
    async fn delete_field(&self, id: &str) -> RepoResult<bool>;

    // bookings
    /// Bookings with their field embedded. `viewer` restricts the list to
    /// one user and fills in that user's favorite flags.
    async fn list_bookings(&self, viewer: Option<&str>) -> RepoResult<Vec<Booking>>;
    async fn get_booking(&self, id: &str) -> RepoResult<Option<Booking>>;
    async fn insert_booking(&self, booking: NewBooking) -> RepoResult<Booking>;
    /// Writes `status` only if the stored booking is still pending.
    /// `None` when no pending booking with that id exists.
    async fn set_booking_status(&self, id: &str, status: BookingStatus)
        -> RepoResult<Option<Booking>>;
    /// (date, hour) pairs held by non-rejected bookings in `from..=to`.
    async fn booked_slots(
        &self,
        field_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<(NaiveDate, u8)>>;

    // favorites
    async fn toggle_favorite(&self, user_id: &str, booking_id: &str) -> RepoResult<bool>;
    async fn list_favorites(&self, user_id: &str) -> RepoResult<Vec<Booking>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Fixture,
    Live,
}

impl BackendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendMode::Fixture => "fixture",
            BackendMode::Live => "live",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fixture" => Some(BackendMode::Fixture),
            "live" => Some(BackendMode::Live),
            _ => None,
        }
    }
}
