use chrono::{Datelike, Duration, Local, Month, NaiveDate, Weekday};
use num_traits::FromPrimitive;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn days_of_month(month: &Month, year: i32) -> u32 {
    match month {
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

/// Canonical identity of a calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        DateKey(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DateKey)
    }

    pub fn today() -> Self {
        DateKey(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(DateKey)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            Error::new(
                ErrorKind::DateParse,
                &format!("'{}' is not of the form YYYY-MM-DD", s),
            )
        };

        // years outside 0..=9999 carry a sign, as chrono writes them
        let (sign, unsigned) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => (1, s),
        };

        let mut fields = unsigned.splitn(3, '-');
        let (year, month, day) = match (fields.next(), fields.next(), fields.next()) {
            (Some(y), Some(m), Some(d)) => (y, m, d),
            _ => return Err(invalid()),
        };

        let digits = |field: &str| !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit());
        let well_formed = digits(year) && [month, day].iter().all(|f| f.len() == 2 && digits(f));
        if !well_formed {
            return Err(invalid());
        }

        let year = year.parse::<i32>().map_err(|_| invalid())? * sign;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        let day = day.parse::<u32>().map_err(|_| invalid())?;

        let key = DateKey::from_ymd(year, month, day).ok_or_else(invalid)?;

        // only the exact rendering of a key parses back, e.g. no "+2024"
        if key.to_string() != s {
            return Err(invalid());
        }

        Ok(key)
    }
}

/// A displayed month. Always holds the first day of that month and is
/// restricted to years whose adjacent-month cells are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthIndex {
    first: NaiveDate,
}

impl MonthIndex {
    pub fn new(month: Month, year: i32) -> Option<Self> {
        if year <= NaiveDate::MIN.year() || year >= NaiveDate::MAX.year() {
            return None;
        }

        NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)
            .map(|first| MonthIndex { first })
    }

    /// Accepts a zero-based month number (January = 0).
    pub fn from_zero_based(year: i32, month: u32) -> Option<Self> {
        month
            .checked_add(1)
            .and_then(Month::from_u32)
            .and_then(|m| MonthIndex::new(m, year))
    }

    pub fn current() -> Self {
        MonthIndex::from(DateKey::today())
    }

    pub fn month(&self) -> Month {
        Month::from_u32(self.first.month()).unwrap_or(Month::January)
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first + Duration::days(days_of_month(&self.month(), self.year()) as i64 - 1)
    }

    pub fn num_days(&self) -> u32 {
        days_of_month(&self.month(), self.year())
    }

    pub fn contains(&self, date: &DateKey) -> bool {
        date.date().year() == self.year() && date.date().month() == self.first.month()
    }

    pub fn next(&self) -> Self {
        let next_month = self.month().succ();
        let year = if next_month == Month::January {
            self.year() + 1
        } else {
            self.year()
        };

        MonthIndex::new(next_month, year).unwrap_or(*self)
    }

    pub fn prev(&self) -> Self {
        let prev_month = self.month().pred();
        let year = if prev_month == Month::December {
            self.year() - 1
        } else {
            self.year()
        };

        MonthIndex::new(prev_month, year).unwrap_or(*self)
    }
}

impl Default for MonthIndex {
    fn default() -> Self {
        MonthIndex::current()
    }
}

impl From<DateKey> for MonthIndex {
    fn from(date: DateKey) -> Self {
        let first = date.date().with_day(1).unwrap_or_else(|| date.date());
        MonthIndex { first }
    }
}

impl FromStr for MonthIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            Error::new(
                ErrorKind::DateParse,
                &format!("'{}' is not of the form YYYY-MM", s),
            )
        };

        let (year, month) = s.rsplit_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month
            .parse::<u32>()
            .ok()
            .and_then(Month::from_u32)
            .ok_or_else(invalid)?;

        MonthIndex::new(month, year).ok_or_else(invalid)
    }
}

impl PartialOrd for MonthIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MonthIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.first.cmp(&other.first)
    }
}
