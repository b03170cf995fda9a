//! Exam calendar: a date index across several exam dates plus month grids.

use std::collections::BTreeMap;

use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Month};

use super::{Exam, ExamError, TBA};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub exam_id: String,
    pub exam_name: String,
    pub label: &'static str,
}

pub type EventIndex = BTreeMap<Date, Vec<CalendarEvent>>;

/// Parse a `YYYY-MM-DD` exam date. `TBA`, blanks and malformed values yield
/// `None`.
#[must_use]
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(TBA) {
        return None;
    }
    Date::parse(raw, DATE_FORMAT).ok()
}

/// `YYYY-MM-DD` for a date.
#[must_use]
pub fn format_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Index every known date of every exam. Within a day, events keep catalog
/// order, then field order.
#[must_use]
pub fn events_by_date(exams: &[Exam]) -> EventIndex {
    let mut index = EventIndex::new();
    for exam in exams {
        let fields = [
            ("Exam Date", &exam.dates.exam_date),
            ("Reg. End", &exam.dates.registration_end),
            ("Admit Card", &exam.dates.admit_card_date),
            ("Result", &exam.dates.result_date),
        ];
        for (label, raw) in fields {
            let Some(date) = parse_date(raw) else {
                continue;
            };
            index.entry(date).or_default().push(CalendarEvent {
                exam_id: exam.id.clone(),
                exam_name: exam.name.clone(),
                label,
            });
        }
    }
    index
}

#[must_use]
pub fn events_on(index: &EventIndex, date: Date) -> &[CalendarEvent] {
    index.get(&date).map(Vec::as_slice).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u8,
    pub days_in_month: u8,
    /// Weekday of day 1, Sunday = 0.
    pub first_weekday: u8,
}

/// # Errors
///
/// Returns [`ExamError::InvalidMonth`] for a month outside 1..=12 or a year
/// outside the supported range.
pub fn month_grid(year: i32, month: u8) -> Result<MonthGrid, ExamError> {
    let invalid = || ExamError::InvalidMonth { year, month };
    let m = Month::try_from(month).map_err(|_| invalid())?;
    let first = Date::from_calendar_date(year, m, 1).map_err(|_| invalid())?;
    Ok(MonthGrid {
        year,
        month,
        days_in_month: m.length(year),
        first_weekday: first.weekday().number_days_from_sunday(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: String,
    pub day: u8,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    #[serde(flatten)]
    pub grid: MonthGrid,
    pub days: Vec<CalendarDay>,
}

/// Grid plus each day's events.
///
/// # Errors
///
/// Same as [`month_grid`].
pub fn month(index: &EventIndex, year: i32, month: u8) -> Result<CalendarMonth, ExamError> {
    let grid = month_grid(year, month)?;
    let m = Month::try_from(month).map_err(|_| ExamError::InvalidMonth { year, month })?;
    let days = (1..=grid.days_in_month)
        .filter_map(|day| Date::from_calendar_date(year, m, day).ok())
        .map(|date| CalendarDay { date: format_date(date), day: date.day(), events: events_on(index, date).to_vec() })
        .collect();
    Ok(CalendarMonth { grid, days })
}
