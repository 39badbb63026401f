//! Query ranges on the command line

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use cf_core::{Error, Result};

/// Longest range a single replay or selection may cover
pub const MAX_RANGE_SECS: i64 = 24 * 60 * 60;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Half-open range `[start, end)` in epoch seconds, at most one day long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if end <= start {
            return Err(Error::Configuration(format!(
                "range end {end} must be after start {start}"
            )));
        }
        if end - start > MAX_RANGE_SECS {
            return Err(Error::Configuration(format!(
                "range of {}s exceeds the limit of {MAX_RANGE_SECS}s",
                end - start
            )));
        }
        Ok(Self { start, end })
    }

    /// The day leading up to `now`
    pub fn last_day(now: i64) -> Self {
        Self {
            start: now - MAX_RANGE_SECS,
            end: now,
        }
    }

    /// Parse `YYYY-MM-DD HH:MM` bounds given in local time at `utc_offset_hours`
    pub fn parse(start: &str, end: &str, utc_offset_hours: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
            Error::out_of_range("utc offset", utc_offset_hours, "within ±23 hours")
        })?;
        Self::new(
            parse_time(start, offset)?.timestamp(),
            parse_time(end, offset)?.timestamp(),
        )
    }

    pub fn duration_secs(&self) -> i64 {
        self.end - self.start
    }
}

/// Parse `YYYY-MM-DD HH:MM` as a local time at `offset`
pub fn parse_time(s: &str, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|e| Error::Configuration(format!("invalid time {s:?}: {e}")))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| Error::Configuration(format!("ambiguous time {s:?}")))
}
