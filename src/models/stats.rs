use chrono::Datelike;
use serde::Serialize;

use super::{Booking, BookingStatus, Field, StatusCounts};

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const POPULAR_HOURS_LIMIT: usize = 4;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HourCount {
    pub hour: u8,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldRevenue {
    pub field_id: String,
    pub field_name: String,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DayCount {
    pub day: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_bookings: usize,
    pub approved_bookings: usize,
    pub pending_bookings: usize,
    pub rejected_bookings: usize,
    pub popular_hours: Vec<HourCount>,
    pub revenue_by_field: Vec<FieldRevenue>,
    pub bookings_by_day: Vec<DayCount>,
}

impl Stats {
    pub fn compute(bookings: &[Booking], fields: &[Field]) -> Self {
        let counts = StatusCounts::tally(bookings);
        Self {
            total_bookings: counts.total,
            approved_bookings: counts.approved,
            pending_bookings: counts.pending,
            rejected_bookings: counts.rejected,
            popular_hours: popular_hours(bookings),
            revenue_by_field: revenue_by_field(bookings, fields),
            bookings_by_day: bookings_by_weekday(bookings),
        }
    }
}

/// Top hours by booking count. Equal counts keep first-seen order.
pub fn popular_hours(bookings: &[Booking]) -> Vec<HourCount> {
    let mut counts: Vec<HourCount> = Vec::new();
    for b in bookings {
        match counts.iter_mut().find(|c| c.hour == b.hour) {
            Some(c) => c.count += 1,
            None => counts.push(HourCount {
                hour: b.hour,
                count: 1,
            }),
        }
    }
    // stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(POPULAR_HOURS_LIMIT);
    counts
}

/// Sum of the booked field's hourly price over approved bookings.
///
/// Known fields come first in list order, including those that earned
/// nothing. Bookings for fields missing from `fields` are appended in the
/// order they are first seen, priced from their embedded field.
pub fn revenue_by_field(bookings: &[Booking], fields: &[Field]) -> Vec<FieldRevenue> {
    let mut rows: Vec<FieldRevenue> = fields
        .iter()
        .map(|f| FieldRevenue {
            field_id: f.id.clone(),
            field_name: f.name.clone(),
            revenue: 0,
        })
        .collect();

    for b in bookings.iter().filter(|b| b.status == BookingStatus::Approved) {
        let listed = fields.iter().find(|f| f.id == b.field_id);
        let Some(price) = b
            .field
            .as_ref()
            .or(listed)
            .map(|f| f.price_per_hour)
        else {
            tracing::warn!(booking_id = %b.id, field_id = %b.field_id, "approved booking without a known field price");
            continue;
        };

        match rows.iter_mut().find(|r| r.field_id == b.field_id) {
            Some(row) => row.revenue += price,
            None => rows.push(FieldRevenue {
                field_id: b.field_id.clone(),
                field_name: b
                    .field
                    .as_ref()
                    .map(|f| f.name.clone())
                    .unwrap_or_default(),
                revenue: price,
            }),
        }
    }

    rows
}

pub fn bookings_by_weekday(bookings: &[Booking]) -> Vec<DayCount> {
    let mut counts = [0usize; 7];
    for b in bookings {
        counts[b.date.weekday().num_days_from_monday() as usize] += 1;
    }
    WEEKDAYS
        .into_iter()
        .zip(counts)
        .map(|(day, count)| DayCount { day, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::tests::booking;
    use crate::models::field::tests::field;

    #[test]
    fn test_popular_hours_example() {
        let bookings = vec![
            booking("a", BookingStatus::Pending, "2025-09-15", 18),
            booking("b", BookingStatus::Pending, "2025-09-15", 18),
            booking("c", BookingStatus::Pending, "2025-09-15", 19),
        ];
        assert_eq!(
            popular_hours(&bookings),
            vec![
                HourCount { hour: 18, count: 2 },
                HourCount { hour: 19, count: 1 }
            ]
        );
    }

    #[test]
    fn test_popular_hours_top_four_stable() {
        let hours = [10, 11, 12, 13, 14, 14];
        let bookings: Vec<_> = hours
            .iter()
            .enumerate()
            .map(|(i, h)| booking(&i.to_string(), BookingStatus::Pending, "2025-09-15", *h))
            .collect();
        let top: Vec<u8> = popular_hours(&bookings).iter().map(|c| c.hour).collect();
        assert_eq!(top, vec![14, 10, 11, 12]);
    }

    #[test]
    fn test_revenue_excludes_non_approved() {
        let fields = vec![field("1", "Stadium Khouribga", 150)];
        let mut approved = booking("a", BookingStatus::Approved, "2025-09-15", 18);
        approved.field = Some(field("1", "Stadium Khouribga", 150));
        let mut pending = booking("b", BookingStatus::Pending, "2025-09-15", 19);
        pending.field = Some(field("1", "Stadium Khouribga", 200));

        let revenue = revenue_by_field(&[approved, pending], &fields);
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].revenue, 150);
    }

    #[test]
    fn test_revenue_lists_every_field() {
        let fields = vec![field("1", "A", 100), field("2", "B", 120)];
        let mut b = booking("a", BookingStatus::Approved, "2025-09-15", 18);
        b.field_id = "2".to_string();
        let revenue = revenue_by_field(&[b.clone(), b], &fields);
        assert_eq!(revenue[0].revenue, 0);
        assert_eq!(revenue[1].field_name, "B");
        assert_eq!(revenue[1].revenue, 240);
    }

    #[test]
    fn test_revenue_appends_unlisted_fields() {
        let mut b = booking("a", BookingStatus::Approved, "2025-09-15", 18);
        b.field_id = "9".to_string();
        b.field = Some(field("9", "Gone", 90));
        let revenue = revenue_by_field(&[b], &[]);
        assert_eq!(revenue, vec![FieldRevenue {
            field_id: "9".to_string(),
            field_name: "Gone".to_string(),
            revenue: 90,
        }]);
    }

    #[test]
    fn test_weekday_counts_monday_first() {
        // 2025-09-15 is a Monday, 2025-09-21 a Sunday
        let bookings = vec![
            booking("a", BookingStatus::Pending, "2025-09-15", 18),
            booking("b", BookingStatus::Approved, "2025-09-21", 18),
            booking("c", BookingStatus::Rejected, "2025-09-21", 19),
        ];
        let days = bookings_by_weekday(&bookings);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], DayCount { day: "Monday", count: 1 });
        assert_eq!(days[2], DayCount { day: "Wednesday", count: 0 });
        assert_eq!(days[6], DayCount { day: "Sunday", count: 2 });
    }

    #[test]
    fn test_compute_counts() {
        let bookings = vec![
            booking("a", BookingStatus::Pending, "2025-09-15", 18),
            booking("b", BookingStatus::Approved, "2025-09-16", 18),
            booking("c", BookingStatus::Rejected, "2025-09-17", 19),
        ];
        let stats = Stats::compute(&bookings, &[]);
        assert_eq!(stats.total_bookings, 3);
        assert_eq!(stats.approved_bookings, 1);
        assert_eq!(stats.pending_bookings, 1);
        assert_eq!(stats.rejected_bookings, 1);
    }
}
