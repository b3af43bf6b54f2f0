//! Fiscal year boundaries.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fiscal calendar defined by the month the fiscal year starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalCalendar {
    start_month: u32,
}

impl Default for FiscalCalendar {
    fn default() -> Self {
        Self { start_month: 1 }
    }
}

impl FiscalCalendar {
    /// Creates a calendar. Returns `None` unless `start_month` is 1..=12.
    #[must_use]
    pub fn new(start_month: u32) -> Option<Self> {
        (1..=12)
            .contains(&start_month)
            .then_some(Self { start_month })
    }

    /// Month the fiscal year starts in.
    #[must_use]
    pub fn start_month(self) -> u32 {
        self.start_month
    }

    /// First day of the fiscal year containing `date`.
    #[must_use]
    pub fn year_start(self, date: NaiveDate) -> NaiveDate {
        let year = if date.month() >= self.start_month {
            date.year()
        } else {
            date.year() - 1
        };
        NaiveDate::from_ymd_opt(year, self.start_month, 1).unwrap_or(date)
    }

    /// Last day of the fiscal year containing `date`.
    #[must_use]
    pub fn year_end(self, date: NaiveDate) -> NaiveDate {
        let start = self.year_start(date);
        start
            .with_year(start.year() + 1)
            .and_then(|next| next.pred_opt())
            .unwrap_or(date)
    }

    /// Fiscal year label, named after the calendar year it ends in.
    #[must_use]
    pub fn fiscal_year(self, date: NaiveDate) -> i32 {
        self.year_end(date).year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    #[case(1, d(2026, 3, 15), d(2026, 1, 1), d(2026, 12, 31))]
    #[case(4, d(2026, 3, 15), d(2025, 4, 1), d(2026, 3, 31))]
    #[case(4, d(2026, 4, 1), d(2026, 4, 1), d(2027, 3, 31))]
    #[case(7, d(2026, 12, 31), d(2026, 7, 1), d(2027, 6, 30))]
    fn test_year_bounds(
        #[case] start_month: u32,
        #[case] date: NaiveDate,
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
    ) {
        let calendar = FiscalCalendar::new(start_month).unwrap();
        assert_eq!(calendar.year_start(date), start);
        assert_eq!(calendar.year_end(date), end);
        assert_eq!(calendar.fiscal_year(date), end.year());
    }

    #[test]
    fn test_invalid_start_month() {
        assert!(FiscalCalendar::new(0).is_none());
        assert!(FiscalCalendar::new(13).is_none());
        assert_eq!(FiscalCalendar::default().start_month(), 1);
    }
}
