//! Tests for climatology span matching

pub mod config_tests;

use super::{MonthDay, Span, TimeWindow};
use crate::app::models::ValueSpan;
use chrono::{DateTime, TimeZone, Utc};

/// Midnight UTC on the given date
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn md(month: u32, day: u32) -> MonthDay {
    MonthDay::new(month, day).unwrap()
}

/// Recurring window between two calendar days
pub fn doy(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    TimeWindow::day_of_year(md(start.0, start.1), md(end.0, end.1))
}

pub fn span(min: f64, max: f64) -> ValueSpan {
    ValueSpan::new(min, max).unwrap()
}

/// Span over all depths with suspect bounds only
pub fn simple_span(window: TimeWindow, min: f64, max: f64) -> Span {
    Span::new(window, span(min, max))
}
