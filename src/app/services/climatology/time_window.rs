//! Time windows for climatology spans
//!
//! A window is either a recurring day-of-year range, compared on
//! `(month, day)` so that leap years need no special casing, or a
//! year-specific date range.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use std::str::FromStr;

/// Longest day of each month, Feb 29 included (index 0 unused)
const MAX_DAYS_PER_MONTH: [u32; 13] = [0, 31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Calendar day without a year
///
/// Ordered by month then day, so `Jan 1 < Feb 29 < Dec 31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Create a month/day pair.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `month` is not in 1..=12 or `day` is
    /// not valid for that month in a leap year.
    pub fn new(month: u32, day: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::configuration(format!(
                "Invalid month {}: must be between 1 and 12",
                month
            )));
        }
        let max_day = MAX_DAYS_PER_MONTH[month as usize];
        if !(1..=max_day).contains(&day) {
            return Err(Error::configuration(format!(
                "Invalid day {} for month {}: must be between 1 and {}",
                day, month, max_day
            )));
        }
        Ok(Self { month, day })
    }

    /// Month/day of a timestamp (UTC)
    pub fn of(time: &DateTime<Utc>) -> Self {
        Self {
            month: time.month(),
            day: time.day(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl FromStr for MonthDay {
    type Err = Error;

    /// Parse `"MM-DD"`
    fn from_str(s: &str) -> Result<Self> {
        let (month, day) = s.trim().split_once('-').ok_or_else(|| {
            Error::configuration(format!("Invalid month-day '{}': expected MM-DD", s))
        })?;
        let parse = |part: &str| {
            part.parse::<u32>().map_err(|_| {
                Error::configuration(format!("Invalid month-day '{}': expected MM-DD", s))
            })
        };
        MonthDay::new(parse(month)?, parse(day)?)
    }
}

impl TryFrom<String> for MonthDay {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl std::fmt::Display for MonthDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// When a climatology span applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "TimeWindowSetting")]
pub enum TimeWindow {
    /// Recurring range of calendar days, both ends included. When `start`
    /// falls after `end` the range wraps across the new year.
    DayOfYear { start: MonthDay, end: MonthDay },
    /// Year-specific range `[start, end)`
    Dates {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Serialized form of [`TimeWindow`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindowSetting {
    DayOfYear { start: MonthDay, end: MonthDay },
    Dates {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl TimeWindow {
    /// Recurring day-of-year window
    pub fn day_of_year(start: MonthDay, end: MonthDay) -> Self {
        TimeWindow::DayOfYear { start, end }
    }

    /// Year-specific window `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `start < end`.
    pub fn dates(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(Error::configuration(format!(
                "Date window start {} must precede end {}",
                start, end
            )));
        }
        Ok(TimeWindow::Dates { start, end })
    }

    /// True for a day-of-year window crossing the year boundary
    pub fn wraps(&self) -> bool {
        matches!(self, TimeWindow::DayOfYear { start, end } if start > end)
    }

    /// Check if `time` falls inside the window
    pub fn contains(&self, time: &DateTime<Utc>) -> bool {
        match self {
            TimeWindow::DayOfYear { start, end } => {
                let day = MonthDay::of(time);
                if start <= end {
                    *start <= day && day <= *end
                } else {
                    day >= *start || day <= *end
                }
            }
            TimeWindow::Dates { start, end } => start <= time && time < end,
        }
    }
}

impl TryFrom<TimeWindowSetting> for TimeWindow {
    type Error = Error;

    fn try_from(setting: TimeWindowSetting) -> Result<Self> {
        match setting {
            TimeWindowSetting::DayOfYear { start, end } => Ok(TimeWindow::day_of_year(start, end)),
            TimeWindowSetting::Dates { start, end } => TimeWindow::dates(start, end),
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeWindow::DayOfYear { start, end } => write!(f, "{} to {}", start, end),
            TimeWindow::Dates { start, end } => {
                write!(f, "{} to {}", start.to_rfc3339(), end.to_rfc3339())
            }
        }
    }
}
