//! Error types for icalagg.

use thiserror::Error;

/// Errors that abort an aggregation run.
///
/// None of these are recoverable: a single bad feed or event stops the
/// whole run, and no partial output is produced.
#[derive(Error, Debug)]
pub enum AggError {
    #[error("{0} not set")]
    MissingField(&'static str),

    #[error("Can't deal with cross-day events: {summary} ({start} - {end})")]
    CrossDayEvent {
        summary: String,
        start: String,
        end: String,
    },

    #[error("Nested events are not supported")]
    NestedEvent,

    #[error("END:VEVENT without a matching BEGIN:VEVENT")]
    UnbalancedEnd,

    #[error("Unexpected end of stream (missing END:VCALENDAR)")]
    UnexpectedEof,

    #[error("Invalid timestamp '{0}', expected YYYYMMDDTHHMMSSZ")]
    InvalidTimestamp(String),

    #[error("Room '{0}' is not a registered feed")]
    UnknownRoom(String),

    #[error("Failed to fetch feed '{feed}': {message}")]
    Fetch { feed: String, message: String },

    #[error("Error in feed '{feed}': {source}")]
    Feed {
        feed: String,
        #[source]
        source: Box<AggError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for icalagg operations.
pub type AggResult<T> = Result<T, AggError>;
