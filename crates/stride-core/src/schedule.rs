//! The scheduling calendar.
//!
//! [`schedule_date`] is the one place "today" is derived. The eligibility
//! query, the claim predicate, the processed-date write and every
//! date-keyed record go through it, always with the same configured zone.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::Timestamp;

use crate::error::CoreError;

/// The scheduling date of `now` in the reference time zone.
pub fn schedule_date(now: Timestamp, tz: &TimeZone) -> Date {
    now.to_zoned(tz.clone()).date()
}

/// Local hour of `now` in the reference time zone (0..=23).
pub fn schedule_hour(now: Timestamp, tz: &TimeZone) -> u8 {
    now.to_zoned(tz.clone()).hour() as u8
}

/// Local-hour range during which unforced runs may deliver.
///
/// `start..end` in hours, end exclusive. `start > end` wraps midnight
/// (`22-2` covers 22:00 through 01:59). `0-24` is always open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl DeliveryWindow {
    pub const ALWAYS: DeliveryWindow = DeliveryWindow {
        start_hour: 0,
        end_hour: 24,
    };

    pub fn contains_hour(&self, hour: u8) -> bool {
        if self.start_hour == self.end_hour {
            return false;
        }
        if self.start_hour < self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    pub fn is_open(&self, now: Timestamp, tz: &TimeZone) -> bool {
        self.contains_hour(schedule_hour(now, tz))
    }
}

impl Default for DeliveryWindow {
    fn default() -> Self {
        Self::ALWAYS
    }
}

impl fmt::Display for DeliveryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_hour, self.end_hour)
    }
}

impl FromStr for DeliveryWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| CoreError::InvalidWindow(format!("expected `start-end`, got `{s}`")))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u8>()
                .map_err(|e| CoreError::InvalidWindow(format!("`{part}`: {e}")))
        };
        let window = DeliveryWindow {
            start_hour: parse(start)?,
            end_hour: parse(end)?,
        };
        if window.start_hour > 23 || window.end_hour > 24 {
            return Err(CoreError::InvalidWindow(format!(
                "hours out of range in `{s}`"
            )));
        }
        Ok(window)
    }
}
