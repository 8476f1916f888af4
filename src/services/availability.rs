use std::collections::HashSet;

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::{AvailabilityDay, SlotGrid};
use crate::repository::Repository;

/// Builds the bookable grid for `field_id` starting at `start`.
///
/// With `demo_fallback` set, a backend failure yields a random demonstration
/// grid instead of an error.
pub async fn field_availability(
    repo: &dyn Repository,
    grid: &SlotGrid,
    field_id: &str,
    start: NaiveDate,
    demo_fallback: bool,
) -> Result<Vec<AvailabilityDay>, AppError> {
    match repo
        .booked_slots(field_id, start, grid.last_date(start))
        .await
    {
        Ok(held) => {
            let held: HashSet<_> = held.into_iter().collect();
            Ok(grid.derive(start, &held))
        }
        Err(e) if demo_fallback => {
            tracing::warn!(error = %e, field_id = %field_id, "availability unavailable, serving demo grid");
            Ok(grid.demo(start))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewBooking, PaymentType};
    use crate::repository::fixture::FixtureRepository;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_window_marks_booked_slots() {
        let repo = FixtureRepository::seeded();
        repo.insert_booking(NewBooking::pending(
            "u",
            "2",
            d("2025-09-16"),
            9,
            PaymentType::Cash,
        ))
        .await
        .unwrap();

        let days = field_availability(&repo, &SlotGrid::default(), "2", d("2025-09-15"), false)
            .await
            .unwrap();
        assert_eq!(days.len(), 7);
        assert!(days[1].select(9).is_none());
        assert!(days[1].select(10).is_some());
        // seeded pending booking on 2025-09-20 at 20:00
        assert!(days[5].select(20).is_none());
    }
}
