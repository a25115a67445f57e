//! Weekly calendar grid.
//!
//! Working hours are hour granular: every hour from the day's start to its end
//! becomes one bookable slot unless it starts inside the lunch window. The
//! same slot sequence is used for every working day.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::data::OptimizationParams;

pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A wall-clock time, stored as minutes since midnight.
///
/// Serialized as `"HH:MM"`. Parsing also accepts a trailing `:SS`, which is
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid clock time '{0}', expected HH:MM")]
pub struct ParseClockTimeError(String);

impl ClockTime {
    pub fn new(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }

    pub fn from_hour(hour: u16) -> Self {
        Self::new(hour, 0)
    }

    #[inline]
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    #[inline]
    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    #[inline]
    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseClockTimeError(s.to_string());
        let mut parts = s.trim().split(':');
        let hour: u16 = parts.next().and_then(|h| h.parse().ok()).ok_or_else(err)?;
        let minute: u16 = parts.next().and_then(|m| m.parse().ok()).ok_or_else(err)?;
        if let Some(seconds) = parts.next() {
            seconds.parse::<u16>().map_err(|_| err())?;
        }
        if parts.next().is_some() || minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(err());
        }
        Ok(Self::new(hour, minute))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ParseClockTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// A day reference as stored by the catalog: either a zero-based index
/// (0 = Monday) or an English day name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayRef {
    Index(usize),
    Name(String),
}

/// Half-open interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl TimeSlot {
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_time < other.end_time && self.end_time > other.start_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    slots: Vec<TimeSlot>,
    working_days: usize,
}

impl CalendarGrid {
    /// Builds the grid from hour bounds. An empty or inverted day produces no
    /// slots rather than an error; callers that want a hard failure validate
    /// the parameters first.
    pub fn new(
        start_hour: u16,
        end_hour: u16,
        lunch_start_hour: u16,
        lunch_end_hour: u16,
        working_days: usize,
    ) -> Self {
        let slots = (start_hour..end_hour)
            .filter(|hour| !(lunch_start_hour..lunch_end_hour).contains(hour))
            .map(|hour| TimeSlot {
                start_time: ClockTime::from_hour(hour),
                end_time: ClockTime::from_hour(hour + 1),
            })
            .collect();

        Self {
            slots,
            working_days: working_days.min(DAY_NAMES.len()),
        }
    }

    pub fn from_params(params: &OptimizationParams) -> Self {
        Self::new(
            params.start_time.hour(),
            params.end_time.hour(),
            params.lunch_break_start.hour(),
            params.lunch_break_end.hour(),
            params.working_days,
        )
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn working_days(&self) -> usize {
        self.working_days
    }

    pub fn slot(&self, index: usize) -> Option<&TimeSlot> {
        self.slots.get(index)
    }

    pub fn day_name(&self, day: usize) -> Option<&'static str> {
        (day < self.working_days).then(|| DAY_NAMES[day])
    }

    /// Resolves a catalog day reference to a working-day index.
    pub fn day_index(&self, day: &DayRef) -> Option<usize> {
        let index = match day {
            DayRef::Index(i) => *i,
            DayRef::Name(name) => DAY_NAMES
                .iter()
                .position(|d| d.eq_ignore_ascii_case(name.trim()))?,
        };
        (index < self.working_days).then_some(index)
    }

    /// Index of the slot starting exactly at `time`.
    pub fn slot_index(&self, time: ClockTime) -> Option<usize> {
        self.slots.iter().position(|s| s.start_time == time)
    }
}
