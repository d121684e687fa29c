//! Parsing of per-weekday operating-hours strings.
//!
//! The business export encodes one day's hours as `"HH:MM-HH:MM"` or the
//! literal `"Closed"`. Intervals may cross midnight: `"22:00-02:00"` means
//! the place is open for four hours.

use crate::error::{EngineError, Result};
use chrono::{NaiveTime, Timelike};

/// Marker used by the export for a day without opening hours.
pub const CLOSED_TOKEN: &str = "Closed";

const TIME_FORMAT: &str = "%H:%M";

/// One day's operating interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoursInterval {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

/// The content of one hours cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayHours {
    Open(HoursInterval),
    Closed,
}

/// Reads an hours cell, accepting the closed marker.
pub fn parse_day_hours(s: &str) -> Result<DayHours> {
    let s = s.trim();
    if s == CLOSED_TOKEN {
        return Ok(DayHours::Closed);
    }
    parse_interval(s).map(DayHours::Open)
}

/// Parses an `"HH:MM-HH:MM"` interval.
pub fn parse_interval(s: &str) -> Result<HoursInterval> {
    let malformed = || EngineError::MalformedInterval {
        value: s.to_string(),
    };

    let (open_part, close_part) = s.split_once('-').ok_or_else(malformed)?;
    let open = NaiveTime::parse_from_str(open_part.trim(), TIME_FORMAT).map_err(|_| malformed())?;
    let close =
        NaiveTime::parse_from_str(close_part.trim(), TIME_FORMAT).map_err(|_| malformed())?;

    Ok(HoursInterval { open, close })
}

impl HoursInterval {
    /// Opening time as a fractional hour, e.g. `"09:30"` gives 9.5.
    pub fn opening_hour(&self) -> f64 {
        f64::from(self.open.hour()) + f64::from(self.open.minute()) / 60.0
    }

    /// Closing time as a fractional hour.
    pub fn closing_hour(&self) -> f64 {
        f64::from(self.close.hour()) + f64::from(self.close.minute()) / 60.0
    }

    /// Open duration in hours, always non-negative. An end time at or
    /// before the start is taken to cross midnight and gets 24 hours added
    /// before differencing.
    pub fn duration_hours(&self) -> f64 {
        let start = i64::from(self.open.hour()) * 60 + i64::from(self.open.minute());
        let mut end = i64::from(self.close.hour()) * 60 + i64::from(self.close.minute());
        if end <= start {
            end += 24 * 60;
        }
        (end - start) as f64 / 60.0
    }
}
