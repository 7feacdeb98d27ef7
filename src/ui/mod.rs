pub mod app;
pub mod command;
pub mod month_pane;

pub use app::App;
pub use month_pane::{DayCell, MonthPane};
