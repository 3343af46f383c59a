//! Consultation slot picker.
//!
//! A small state machine for booking a consultation: month navigation
//! bounded below by the current real-world month, day selection within
//! the visible month, and a fixed list of time slots. Confirming a
//! selection validates it against today's date and echoes the
//! `{day, time, month, year}` payload back to the UI shell.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Bookable time slots offered on every available day.
pub const TIME_SLOTS: &[&str] = &[
    "09:00 AM",
    "10:00 AM",
    "11:00 AM",
    "02:00 PM",
    "03:00 PM",
    "04:00 PM",
];

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("cannot navigate before the current month")]
    PastMonth,
    #[error("invalid month: {0}")]
    InvalidMonth(u32),
    #[error("day {0} does not exist in that month")]
    InvalidDay(u32),
    #[error("day {0} is already past")]
    PastDay(u32),
    #[error("unknown time slot: {0}")]
    UnknownSlot(String),
}

/// Which month the picker is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, ScheduleError> {
        if !(1..=12).contains(&month) {
            return Err(ScheduleError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The month containing `today`.
    pub fn current(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Navigate one month back. The picker never shows months before
    /// the current real-world month.
    pub fn prev(self, today: NaiveDate) -> Result<Self, ScheduleError> {
        let target = if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        };
        if target.is_before(MonthCursor::current(today)) {
            return Err(ScheduleError::PastMonth);
        }
        Ok(target)
    }

    fn is_before(self, other: MonthCursor) -> bool {
        (self.year, self.month) < (other.year, other.month)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next_first {
        Some(d) => d.pred_opt().map(|p| p.day()).unwrap_or(31),
        None => 31,
    }
}

/// One selectable day in the month view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySlot {
    pub day: u32,
    pub available: bool,
}

/// Everything the UI shell needs to render one month of the picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub can_go_prev: bool,
    pub days: Vec<DaySlot>,
    pub time_slots: Vec<String>,
}

/// Build the month view for a cursor.
///
/// Days already past are unavailable; months before the current one are
/// rejected outright.
pub fn month_view(cursor: MonthCursor, today: NaiveDate) -> Result<MonthView, ScheduleError> {
    if cursor.is_before(MonthCursor::current(today)) {
        return Err(ScheduleError::PastMonth);
    }

    let first = NaiveDate::from_ymd_opt(cursor.year, cursor.month, 1)
        .ok_or(ScheduleError::InvalidMonth(cursor.month))?;

    let days = (1..=days_in_month(cursor.year, cursor.month))
        .map(|day| {
            let date = NaiveDate::from_ymd_opt(cursor.year, cursor.month, day);
            DaySlot {
                day,
                available: date.map(|d| d >= today).unwrap_or(false),
            }
        })
        .collect();

    Ok(MonthView {
        year: cursor.year,
        month: cursor.month,
        month_name: first.format("%B").to_string(),
        can_go_prev: cursor.prev(today).is_ok(),
        days,
        time_slots: TIME_SLOTS.iter().map(|s| s.to_string()).collect(),
    })
}

/// A day/time pick awaiting confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSelection {
    pub day: u32,
    pub time: String,
    pub month: u32,
    pub year: i32,
}

/// Confirmed booking payload handed to the UI shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub day: u32,
    pub time: String,
    pub month: u32,
    pub year: i32,
    pub scheduled_for: String,
}

/// Validate a selection against today's date and the slot list.
pub fn confirm(
    selection: &SlotSelection,
    today: NaiveDate,
) -> Result<BookingConfirmation, ScheduleError> {
    let cursor = MonthCursor::new(selection.year, selection.month)?;
    if cursor.is_before(MonthCursor::current(today)) {
        return Err(ScheduleError::PastMonth);
    }

    if selection.day < 1 || selection.day > days_in_month(selection.year, selection.month) {
        return Err(ScheduleError::InvalidDay(selection.day));
    }

    let date = NaiveDate::from_ymd_opt(selection.year, selection.month, selection.day)
        .ok_or(ScheduleError::InvalidDay(selection.day))?;
    if date < today {
        return Err(ScheduleError::PastDay(selection.day));
    }

    if !TIME_SLOTS.contains(&selection.time.as_str()) {
        return Err(ScheduleError::UnknownSlot(selection.time.clone()));
    }

    Ok(BookingConfirmation {
        day: selection.day,
        time: selection.time.clone(),
        month: selection.month,
        year: selection.year,
        scheduled_for: format!("{} at {}", date.format("%A, %B %-d, %Y"), selection.time),
    })
}
