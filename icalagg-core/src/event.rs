//! Schedule events and their timestamp codec.
//!
//! An event is assembled field by field as the parser walks a VEVENT block
//! (`EventDraft`) and frozen into an `Event` once the block closes and the
//! draft validates.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::config::AggregatorConfig;
use crate::error::{AggError, AggResult};

/// DTSTART/DTEND format. Feeds are expected to publish UTC times only.
pub const ICS_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A validated schedule entry.
///
/// Events compare and order by `start` only; two events starting at the same
/// instant are equal as far as sorting is concerned.
#[derive(Debug, Clone)]
pub struct Event {
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Room name, filled in by the aggregator
    pub location: Option<String>,
}

impl Event {
    /// Start time in calendar format
    pub fn start_ics(&self) -> String {
        format_timestamp(&self.start)
    }

    /// End time in calendar format
    pub fn end_ics(&self) -> String {
        format_timestamp(&self.end)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start.cmp(&other.start)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}: {}", self.start, self.end, self.summary)
    }
}

/// An event still being read from a feed.
#[derive(Debug, Clone)]
pub struct EventDraft {
    config: AggregatorConfig,
    summary: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl EventDraft {
    pub fn new(config: AggregatorConfig) -> Self {
        EventDraft {
            config,
            summary: None,
            start: None,
            end: None,
        }
    }

    pub fn set_start(&mut self, value: &str) -> AggResult<()> {
        self.start = Some(parse_timestamp(value, self.config.adjust_hours)?);
        Ok(())
    }

    pub fn set_end(&mut self, value: &str) -> AggResult<()> {
        self.end = Some(parse_timestamp(value, self.config.adjust_hours)?);
        Ok(())
    }

    /// Set the summary from its raw property value, un-escaping `\,`.
    pub fn set_summary(&mut self, value: &str) {
        self.summary = Some(value.replace("\\,", ","));
    }

    /// Check required fields and the same-day rule, and freeze the event.
    ///
    /// The grid can't draw events crossing midnight, so start and end must
    /// fall on the same date in the display timezone.
    pub fn validate(self) -> AggResult<Event> {
        let summary = self
            .summary
            .filter(|s| !s.is_empty())
            .ok_or(AggError::MissingField("Summary"))?;
        let start = self.start.ok_or(AggError::MissingField("Start"))?;
        let end = self.end.ok_or(AggError::MissingField("End"))?;

        let tz = self.config.display_tz;
        if start.with_timezone(&tz).date_naive() != end.with_timezone(&tz).date_naive() {
            return Err(AggError::CrossDayEvent {
                summary,
                start: start.with_timezone(&tz).to_string(),
                end: end.with_timezone(&tz).to_string(),
            });
        }

        Ok(Event {
            summary,
            start,
            end,
            location: None,
        })
    }
}

/// Parse a calendar UTC timestamp and shift it by `adjust_hours`.
///
/// A shift that leaves chrono's representable range is reported as an invalid timestamp.
pub fn parse_timestamp(value: &str, adjust_hours: i64) -> AggResult<DateTime<Utc>> {
    let invalid = || AggError::InvalidTimestamp(value.to_string());
    let naive =
        NaiveDateTime::parse_from_str(value, ICS_TIMESTAMP_FORMAT).map_err(|_| invalid())?;
    TimeDelta::try_hours(adjust_hours)
        .and_then(|shift| naive.and_utc().checked_add_signed(shift))
        .ok_or_else(invalid)
}

/// Format a UTC instant as a calendar timestamp. The adjustment is not undone.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(ICS_TIMESTAMP_FORMAT).to_string()
}
