use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use rand::RngExt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    pub hour: u8,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityDay {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

/// A chosen slot. Only ever produced from an available [`TimeSlot`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SlotSelection {
    pub date: NaiveDate,
    pub hour: u8,
}

impl AvailabilityDay {
    /// Unavailable or unknown hours select nothing.
    pub fn select(&self, hour: u8) -> Option<SlotSelection> {
        self.slots
            .iter()
            .find(|s| s.hour == hour && s.is_available)
            .map(|s| SlotSelection {
                date: self.date,
                hour: s.hour,
            })
    }

    pub fn available_hours(&self) -> Vec<u8> {
        self.slots
            .iter()
            .filter(|s| s.is_available)
            .map(|s| s.hour)
            .collect()
    }
}

/// Shape of the bookable grid: `days` consecutive dates, hours
/// `open_hour..=close_hour` on each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub days: u32,
    pub open_hour: u8,
    pub close_hour: u8,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            days: 7,
            open_hour: 8,
            close_hour: 21,
        }
    }
}

impl SlotGrid {
    pub fn new(days: u32, open_hour: u8, close_hour: u8) -> anyhow::Result<Self> {
        if close_hour > 23 || open_hour > close_hour {
            return Err(anyhow::anyhow!(
                "invalid opening hours: {open_hour}-{close_hour}"
            ));
        }
        if days == 0 {
            return Err(anyhow::anyhow!("availability window must be at least one day"));
        }
        Ok(Self {
            days,
            open_hour,
            close_hour,
        })
    }

    pub fn hours(&self) -> std::ops::RangeInclusive<u8> {
        self.open_hour..=self.close_hour
    }

    pub fn dates(&self, start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        let days = self.days;
        (0..days).map(move |i| start + Duration::days(i64::from(i)))
    }

    pub fn last_date(&self, start: NaiveDate) -> NaiveDate {
        start + Duration::days(i64::from(self.days) - 1)
    }

    /// A slot is open unless `held` contains its (date, hour).
    pub fn derive(&self, start: NaiveDate, held: &HashSet<(NaiveDate, u8)>) -> Vec<AvailabilityDay> {
        self.build(start, |date, hour| !held.contains(&(date, hour)))
    }

    /// Demonstration grid with roughly 70% of slots open. Not real availability.
    pub fn demo(&self, start: NaiveDate) -> Vec<AvailabilityDay> {
        let mut rng = rand::rng();
        self.build(start, |_, _| rng.random_bool(0.7))
    }

    fn build(
        &self,
        start: NaiveDate,
        mut open: impl FnMut(NaiveDate, u8) -> bool,
    ) -> Vec<AvailabilityDay> {
        self.dates(start)
            .map(|date| AvailabilityDay {
                date,
                slots: self
                    .hours()
                    .map(|hour| TimeSlot {
                        hour,
                        is_available: open(date, hour),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_default_grid_shape() {
        let grid = SlotGrid::default();
        let days = grid.derive(d("2025-09-15"), &HashSet::new());
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, d("2025-09-15"));
        assert_eq!(days[6].date, d("2025-09-21"));
        for day in &days {
            let hours: Vec<u8> = day.slots.iter().map(|s| s.hour).collect();
            assert_eq!(hours, (8..=21).collect::<Vec<u8>>());
            assert!(day.slots.iter().all(|s| s.is_available));
        }
    }

    #[test]
    fn test_held_slots_are_unavailable() {
        let grid = SlotGrid::default();
        let held: HashSet<_> = [(d("2025-09-16"), 18)].into_iter().collect();
        let days = grid.derive(d("2025-09-15"), &held);
        let tuesday = &days[1];
        assert!(!tuesday.slots.iter().find(|s| s.hour == 18).unwrap().is_available);
        assert!(days[0].slots.iter().find(|s| s.hour == 18).unwrap().is_available);
        assert_eq!(tuesday.available_hours().len(), 13);
    }

    #[test]
    fn test_select_available_slot() {
        let grid = SlotGrid::default();
        let days = grid.derive(d("2025-09-15"), &HashSet::new());
        let sel = days[0].select(10).unwrap();
        assert_eq!(sel, SlotSelection { date: d("2025-09-15"), hour: 10 });
    }

    #[test]
    fn test_select_unavailable_slot_is_noop() {
        let grid = SlotGrid::default();
        let held: HashSet<_> = [(d("2025-09-15"), 10)].into_iter().collect();
        let days = grid.derive(d("2025-09-15"), &held);
        assert!(days[0].select(10).is_none());
        // outside opening hours
        assert!(days[0].select(3).is_none());
    }

    #[test]
    fn test_invalid_grid() {
        assert!(SlotGrid::new(7, 22, 8).is_err());
        assert!(SlotGrid::new(7, 8, 24).is_err());
        assert!(SlotGrid::new(0, 8, 21).is_err());
        assert!(SlotGrid::new(3, 0, 23).is_ok());
    }

    #[test]
    fn test_demo_grid_has_full_shape() {
        let grid = SlotGrid::new(2, 8, 9).unwrap();
        let days = grid.demo(d("2025-09-15"));
        assert_eq!(days.len(), 2);
        assert!(days.iter().all(|day| day.slots.len() == 2));
    }

    #[test]
    fn test_last_date() {
        let grid = SlotGrid::default();
        assert_eq!(grid.last_date(d("2025-12-29")), d("2026-01-04"));
    }
}
