pub mod calendar;
pub mod config;
pub mod error;
pub mod events;
pub mod memo;
pub mod selection;
pub mod ui;
