use std::fmt::{self, Display, Write};

use crate::config::Theme;
use crate::selection::{DayView, MonthView};

pub struct DayCell<'a> {
    day: &'a DayView,
    theme: &'a Theme,
}

impl<'a> DayCell<'a> {
    pub const CELL_WIDTH: usize = 5;

    pub fn new(day: &'a DayView, theme: &'a Theme) -> Self {
        DayCell { day, theme }
    }
}

impl Display for DayCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arg_focus = if self.day.selected {
            self.theme.selected_char
        } else {
            ' '
        };

        let arg_today = if self.day.is_today {
            self.theme.today_char
        } else if !self.day.cell.in_current_month() {
            self.theme.other_month_char
        } else {
            ' '
        };

        let arg_memo = if self.day.has_memo {
            self.theme.memo_char
        } else {
            ' '
        };

        write!(
            f,
            "{}{}{:>2}{}",
            arg_focus,
            arg_today,
            self.day.cell.day_of_month(),
            arg_memo
        )
    }
}

/// Plain-text rendering of a month: heading, weekday labels, the grid and,
/// for a selected day, its memo and draft.
pub struct MonthPane<'a> {
    view: &'a MonthView,
    theme: &'a Theme,
}

impl<'a> MonthPane<'a> {
    const COLUMNS: usize = 7;

    const HEADER: &'static [&'static str] = &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

    pub fn new(view: &'a MonthView, theme: &'a Theme) -> Self {
        MonthPane { view, theme }
    }
}

impl Display for MonthPane<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = Self::COLUMNS * DayCell::CELL_WIDTH;
        let mut title = String::new();
        write!(
            title,
            "{}",
            self.view.month.first_day().format(&self.theme.month_format)
        )?;

        writeln!(f, "{:^width$}", title, width = width)?;

        for &head in Self::HEADER {
            write!(f, "{:>width$} ", head, width = DayCell::CELL_WIDTH - 1)?;
        }
        writeln!(f)?;

        for week in self.view.days.chunks(Self::COLUMNS) {
            for day in week {
                write!(f, "{}", DayCell::new(day, self.theme))?;
            }
            writeln!(f)?;
        }

        if let Some(selection) = &self.view.selection {
            writeln!(f)?;
            writeln!(
                f,
                "{}",
                selection.date.date().format(&self.theme.date_format)
            )?;
            if let Some(memo) = &selection.memo {
                writeln!(f, "  memo:  {}", memo)?;
            }
            writeln!(f, "  draft: {}", selection.draft)?;
        }

        Ok(())
    }
}
