// SPDX-License-Identifier: GPL-3.0-or-later

//! Time-of-day handling for `YYYY-MM-DDTHH:MM:SS`-style timestamps.
//!
//! Only fixed character offsets are used, the date part and seconds are never interpreted.

use std::{cmp::Ordering, fmt, ops::Range, str::FromStr};

use crate::error::FormatError;

/// Minimum length of a full timestamp (`YYYY-MM-DDTHH:MM`).
pub const TIMESTAMP_MIN_LEN: usize = 16;

const YEAR: Range<usize> = 0..4;
const MONTH: Range<usize> = 5..7;
const DAY: Range<usize> = 8..10;
const HOUR: Range<usize> = 11..13;
const MINUTE: Range<usize> = 14..16;
const TIME_OF_DAY: Range<usize> = 11..16;

/// Hour and minute of a day. `24:00` is allowed as an end-of-day bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, FormatError> {
        if minute > 59 || hour > 24 || (hour == 24 && minute > 0) {
            return Err(FormatError::InvalidTimeOfDay {
                value: format!("{hour:02}:{minute:02}"),
            });
        }
        Ok(Self { hour, minute })
    }

    /// Extracts the `HH:MM` part of a full timestamp.
    pub fn of_timestamp(timestamp: &str) -> Result<Self, FormatError> {
        field(timestamp, TIME_OF_DAY)?.parse()
    }
}

impl FromStr for TimeOfDay {
    type Err = FormatError;

    /// Parses `HH:MM`. Anything after the minutes (e.g. `:SS`) is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FormatError::InvalidTimeOfDay {
            value: s.to_string(),
        };
        if s.len() < 5 {
            return Err(invalid());
        }
        let hour = s.get(0..2).and_then(|h| h.parse().ok()).ok_or_else(invalid)?;
        let minute = s.get(3..5).and_then(|m| m.parse().ok()).ok_or_else(invalid)?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Compares two `HH:MM` strings by hour and minute.
///
/// `Greater` means `a` is later in the day than `b`.
pub fn compare_times(a: &str, b: &str) -> Result<Ordering, FormatError> {
    Ok(a.parse::<TimeOfDay>()?.cmp(&b.parse::<TimeOfDay>()?))
}

/// An inclusive `start`..=`end` time-of-day range.
///
/// A window with `start == end` accepts everything. A window with `start > end` (crossing
/// midnight) accepts nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        if start > end {
            log::warn!(
                "Time window {start}-{end} crosses midnight, no rows will be accepted"
            );
        }
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, FormatError> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }

    pub fn is_unbounded(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, t: TimeOfDay) -> bool {
        if self.is_unbounded() {
            return true;
        }
        !(self.start > t || self.end < t)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            start: TimeOfDay { hour: 0, minute: 0 },
            end: TimeOfDay {
                hour: 24,
                minute: 0,
            },
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SS` -> `YYYY-MM-DD HH:MM`
pub fn shorten_timestamp(timestamp: &str) -> Result<String, FormatError> {
    Ok(format!(
        "{}-{}-{} {}:{}",
        field(timestamp, YEAR)?,
        field(timestamp, MONTH)?,
        field(timestamp, DAY)?,
        field(timestamp, HOUR)?,
        field(timestamp, MINUTE)?
    ))
}

fn field(timestamp: &str, range: Range<usize>) -> Result<&str, FormatError> {
    if timestamp.len() < TIMESTAMP_MIN_LEN {
        return Err(FormatError::TooShort {
            value: timestamp.to_string(),
            expected: TIMESTAMP_MIN_LEN,
        });
    }
    timestamp
        .get(range.clone())
        .ok_or_else(|| FormatError::Misaligned {
            value: timestamp.to_string(),
            range,
        })
}
