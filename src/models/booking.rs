use chrono::{DateTime, NaiveDate, Utc};
use rand::RngExt;
use serde::{Deserialize, Serialize};

use super::Field;

pub const REFERENCE_PREFIX: &str = "SA3A";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub field_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    pub date: NaiveDate,
    pub hour: u8,
    pub payment_type: PaymentType,
    pub status: BookingStatus,
    pub reference: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Row sent to the backend when a booking is placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub user_id: String,
    pub field_id: String,
    pub date: NaiveDate,
    pub hour: u8,
    pub payment_type: PaymentType,
    pub status: BookingStatus,
    pub reference: String,
}

impl NewBooking {
    pub fn pending(
        user_id: &str,
        field_id: &str,
        date: NaiveDate,
        hour: u8,
        payment_type: PaymentType,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            field_id: field_id.to_string(),
            date,
            hour,
            payment_type,
            status: BookingStatus::Pending,
            reference: generate_reference(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    BankTransfer,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::BankTransfer => "bank_transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentType::Cash),
            "bank_transfer" => Some(PaymentType::BankTransfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move booking from {from} to {to}")]
pub struct TransitionError {
    pub from: &'static str,
    pub to: &'static str,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "approved" => Some(BookingStatus::Approved),
            "rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }

    /// Approved and rejected are terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }

    pub fn transition(self, next: BookingStatus) -> Result<BookingStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Booking {
    pub fn approve(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.transition(BookingStatus::Approved)?;
        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.transition(BookingStatus::Rejected)?;
        Ok(())
    }

    /// `"18:00-19:00"`
    pub fn time_range(&self) -> String {
        format!("{}:00-{}:00", self.hour, u32::from(self.hour) + 1)
    }

    /// Non-rejected bookings hold their slot.
    pub fn holds_slot(&self) -> bool {
        self.status != BookingStatus::Rejected
    }
}

/// Reference codes look like `SA3A-48213`: five digits, never a leading zero.
pub fn generate_reference() -> String {
    let digits: u32 = rand::rng().random_range(10_000..100_000);
    format!("{REFERENCE_PREFIX}-{digits}")
}

pub fn is_reference(s: &str) -> bool {
    match s.strip_prefix(REFERENCE_PREFIX).and_then(|r| r.strip_prefix('-')) {
        Some(digits) => digits.len() == 5 && digits.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

// ── Filters ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BookingStatus),
}

impl StatusFilter {
    /// `None`, empty and `"all"` select everything.
    pub fn parse(s: Option<&str>) -> Option<Self> {
        match s.map(str::trim) {
            None | Some("") | Some("all") => Some(StatusFilter::All),
            Some(other) => BookingStatus::parse(other).map(StatusFilter::Only),
        }
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => booking.status == *status,
        }
    }
}

/// Combined predicate for booking views. Every criterion must hold.
#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    pub status: StatusFilter,
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
}

impl BookingQuery {
    pub fn matches(&self, booking: &Booking) -> bool {
        if !self.status.matches(booking) {
            return false;
        }
        if let Some(date) = self.date {
            if booking.date != date {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => matches_booking_text(booking, &q.to_lowercase()),
        }
    }

    pub fn apply(&self, bookings: &[Booking]) -> Vec<Booking> {
        bookings
            .iter()
            .filter(|b| self.matches(b))
            .cloned()
            .collect()
    }
}

fn matches_booking_text(booking: &Booking, needle: &str) -> bool {
    let in_field = booking.field.as_ref().is_some_and(|f| {
        f.name.to_lowercase().contains(needle) || f.address.to_lowercase().contains(needle)
    });
    in_field || booking.reference.to_lowercase().contains(needle)
}

pub fn filter_by_status(bookings: &[Booking], filter: StatusFilter) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| filter.matches(b))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn tally(bookings: &[Booking]) -> Self {
        bookings.iter().fold(Self::default(), |mut acc, b| {
            acc.total += 1;
            match b.status {
                BookingStatus::Pending => acc.pending += 1,
                BookingStatus::Approved => acc.approved += 1,
                BookingStatus::Rejected => acc.rejected += 1,
            }
            acc
        })
    }
}
