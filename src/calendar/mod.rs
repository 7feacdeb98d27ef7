pub mod datetime;
pub mod grid;

pub use datetime::{days_of_month, DateKey, MonthIndex};
pub use grid::{compute_grid, weeks, CalendarCell};
