use chrono::{Datelike, Duration, Weekday};
use itertools::Itertools;

use super::datetime::{DateKey, MonthIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    date: DateKey,
    day_of_month: u32,
    in_current_month: bool,
    is_weekend_start: bool,
    is_weekend_end: bool,
}

impl CalendarCell {
    fn new(date: DateKey, month: &MonthIndex) -> Self {
        CalendarCell {
            date,
            day_of_month: date.date().day(),
            in_current_month: month.contains(&date),
            is_weekend_start: date.weekday() == Weekday::Sun,
            is_weekend_end: date.weekday() == Weekday::Sat,
        }
    }

    pub fn date(&self) -> DateKey {
        self.date
    }

    pub fn day_of_month(&self) -> u32 {
        self.day_of_month
    }

    pub fn in_current_month(&self) -> bool {
        self.in_current_month
    }

    pub fn is_weekend_start(&self) -> bool {
        self.is_weekend_start
    }

    pub fn is_weekend_end(&self) -> bool {
        self.is_weekend_end
    }
}

/// All cells shown for `month`, from the Sunday on or before the first
/// through the Saturday on or after the last day, in ascending order.
pub fn compute_grid(month: MonthIndex) -> Vec<CalendarCell> {
    let first = month.first_day();
    let last = month.last_day();

    let start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);
    let end = last + Duration::days(6 - last.weekday().num_days_from_sunday() as i64);

    start
        .iter_days()
        .take_while(|date| date <= &end)
        .map(|date| CalendarCell::new(DateKey::new(date), &month))
        .collect()
}

/// Splits a grid into rows of seven cells, Sunday first.
pub fn weeks(cells: &[CalendarCell]) -> Vec<Vec<CalendarCell>> {
    cells
        .iter()
        .chunks(7)
        .into_iter()
        .map(|week| week.copied().collect())
        .collect()
}
