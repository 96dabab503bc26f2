//! Calendar text parsing.
//!
//! Only the handful of properties the schedule needs are interpreted; every
//! other line is skipped so feeds can carry whatever else they like.

use std::io::{self, BufRead};

use tracing::debug;

use super::unfold::Unfolder;
use crate::config::AggregatorConfig;
use crate::error::{AggError, AggResult};
use crate::event::{Event, EventDraft};

/// A logical line, classified by what the parser cares about.
#[derive(Debug, PartialEq, Eq)]
enum Property<'a> {
    BeginEvent,
    EndEvent,
    EndCalendar,
    DtStart(&'a str),
    DtEnd(&'a str),
    Summary(&'a str),
    Other,
}

impl<'a> Property<'a> {
    fn classify(line: &'a str) -> Self {
        match line {
            "BEGIN:VEVENT" => Property::BeginEvent,
            "END:VEVENT" => Property::EndEvent,
            "END:VCALENDAR" => Property::EndCalendar,
            _ => {
                if let Some(v) = line.strip_prefix("DTSTART:") {
                    Property::DtStart(v)
                } else if let Some(v) = line.strip_prefix("DTEND:") {
                    Property::DtEnd(v)
                } else if let Some(v) = line.strip_prefix("SUMMARY:") {
                    Property::Summary(v)
                } else {
                    Property::Other
                }
            }
        }
    }
}

enum State {
    Idle,
    InEvent(EventDraft),
    /// END:VCALENDAR seen or an error returned; nothing more is read
    Done,
}

/// Iterator over the validated events of one calendar stream, in document order.
///
/// Yields an error and stops on the first structural problem. The stream
/// must be terminated by END:VCALENDAR; running out of input before that is
/// an error rather than a silently truncated feed.
pub struct CalendarParser<I> {
    lines: I,
    config: AggregatorConfig,
    state: State,
}

impl<I> CalendarParser<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I, config: AggregatorConfig) -> Self {
        CalendarParser {
            lines,
            config,
            state: State::Idle,
        }
    }

    fn step(&mut self) -> AggResult<Option<Event>> {
        loop {
            let Some(line) = self.lines.next() else {
                return Err(AggError::UnexpectedEof);
            };
            let line = line?;

            match Property::classify(&line) {
                Property::EndCalendar => {
                    self.state = State::Done;
                    return Ok(None);
                }
                Property::BeginEvent => {
                    if !matches!(self.state, State::Idle) {
                        return Err(AggError::NestedEvent);
                    }
                    self.state = State::InEvent(EventDraft::new(self.config));
                }
                Property::EndEvent => {
                    let State::InEvent(draft) = std::mem::replace(&mut self.state, State::Idle)
                    else {
                        return Err(AggError::UnbalancedEnd);
                    };
                    let event = draft.validate()?;
                    debug!(summary = %event.summary, start = %event.start, "parsed event");
                    return Ok(Some(event));
                }
                Property::DtStart(v) => {
                    if let State::InEvent(draft) = &mut self.state {
                        draft.set_start(v)?;
                    }
                }
                Property::DtEnd(v) => {
                    if let State::InEvent(draft) = &mut self.state {
                        draft.set_end(v)?;
                    }
                }
                Property::Summary(v) => {
                    if let State::InEvent(draft) = &mut self.state {
                        draft.set_summary(v);
                    }
                }
                Property::Other => {}
            }
        }
    }
}

impl<I> Iterator for CalendarParser<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = AggResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, State::Done) {
            return None;
        }
        match self.step() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => None,
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}

/// Unfold and parse a calendar stream.
pub fn parse_calendar<R: BufRead>(
    reader: R,
    config: AggregatorConfig,
) -> CalendarParser<Unfolder<R>> {
    CalendarParser::new(Unfolder::new(reader), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn parse(ics: &str) -> AggResult<Vec<Event>> {
        parse_calendar(ics.as_bytes(), AggregatorConfig::default()).collect()
    }

    #[test]
    fn classifies_known_properties() {
        assert_eq!(Property::classify("BEGIN:VEVENT"), Property::BeginEvent);
        assert_eq!(Property::classify("END:VEVENT"), Property::EndEvent);
        assert_eq!(Property::classify("END:VCALENDAR"), Property::EndCalendar);
        assert_eq!(
            Property::classify("DTSTART:20250320T090000Z"),
            Property::DtStart("20250320T090000Z")
        );
        assert_eq!(Property::classify("SUMMARY:"), Property::Summary(""));
        assert_eq!(
            Property::classify("DTSTART;TZID=Europe/Stockholm:20250320T090000"),
            Property::Other
        );
        assert_eq!(Property::classify("BEGIN:VCALENDAR"), Property::Other);
    }

    #[test]
    fn parses_events_in_document_order() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:b@test\r\n\
DTSTART:20250320T110000Z\r\n\
DTEND:20250320T120000Z\r\n\
SUMMARY:Second\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:First\r\n\
DTSTART:20250320T090000Z\r\n\
DTEND:20250320T100000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse(ics).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary, "Second");
        assert_eq!(events[1].summary, "First");
        assert_eq!(
            events[1].start,
            Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn unescapes_folded_summary() {
        let ics = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
DTSTART:20250320T120000Z\r\n\
DTEND:20250320T130000Z\r\n\
SUMMARY:Lunch\\,\r\n  with sponsors\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse(ics).unwrap();
        assert_eq!(events[0].summary, "Lunch, with sponsors");
    }

    #[test]
    fn ignores_unknown_properties_and_blank_lines() {
        let ics = "BEGIN:VCALENDAR\n\
X-WR-CALNAME:Room A\n\
\n\
BEGIN:VEVENT\n\
DTSTART:20250320T090000Z\n\
DTEND:20250320T100000Z\n\
SUMMARY:Keynote\n\
DESCRIPTION:Opening talk\n\
BEGIN:VALARM\n\
TRIGGER:-PT15M\n\
END:VALARM\n\
END:VEVENT\n\
END:VCALENDAR\n";

        let events = parse(ics).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Keynote");
    }

    #[test]
    fn latin1_byte_in_ignored_property_is_harmless() {
        let ics: &[u8] = b"BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
DTSTART:20250320T090000Z\r\n\
DTEND:20250320T100000Z\r\n\
SUMMARY:Keynote\r\n\
DESCRIPTION:Caf\xE9\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events: Vec<Event> = parse_calendar(ics, AggregatorConfig::default())
            .collect::<AggResult<_>>()
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Keynote");
    }

    #[test]
    fn applies_timezone_adjustment() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
DTSTART:20250320T090000Z\n\
DTEND:20250320T100000Z\n\
SUMMARY:Keynote\n\
END:VEVENT\n\
END:VCALENDAR\n";

        let config = AggregatorConfig::new(chrono_tz::UTC, 1);
        let events: Vec<Event> = parse_calendar(ics.as_bytes(), config)
            .collect::<AggResult<_>>()
            .unwrap();
        assert_eq!(events[0].start_ics(), "20250320T100000Z");
        assert_eq!(events[0].end_ics(), "20250320T110000Z");
    }

    #[test]
    fn missing_end_calendar_is_an_error() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
DTSTART:20250320T090000Z\n\
DTEND:20250320T100000Z\n\
SUMMARY:Keynote\n\
END:VEVENT\n";

        let mut parser = parse_calendar(ics.as_bytes(), AggregatorConfig::default());
        assert!(parser.next().unwrap().is_ok());
        assert!(matches!(parser.next(), Some(Err(AggError::UnexpectedEof))));
        assert!(parser.next().is_none());
    }

    #[test]
    fn end_calendar_stops_even_inside_event() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
SUMMARY:Never closed\n\
END:VCALENDAR\n\
garbage after the end\n";

        assert!(parse(ics).unwrap().is_empty());
    }

    #[test]
    fn nested_event_is_an_error() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
BEGIN:VEVENT\n\
END:VEVENT\n\
END:VEVENT\n\
END:VCALENDAR\n";

        assert!(matches!(parse(ics), Err(AggError::NestedEvent)));
    }

    #[test]
    fn end_without_begin_is_an_error() {
        let ics = "BEGIN:VCALENDAR\nEND:VEVENT\nEND:VCALENDAR\n";
        assert!(matches!(parse(ics), Err(AggError::UnbalancedEnd)));
    }

    #[test]
    fn invalid_event_fails_at_close() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
DTSTART:20250320T090000Z\n\
SUMMARY:No end\n\
END:VEVENT\n\
END:VCALENDAR\n";

        assert!(matches!(parse(ics), Err(AggError::MissingField("End"))));
    }

    #[test]
    fn cross_day_event_is_rejected() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
DTSTART:20250320T233000Z\n\
DTEND:20250321T003000Z\n\
SUMMARY:Late\n\
END:VEVENT\n\
END:VCALENDAR\n";

        assert!(matches!(parse(ics), Err(AggError::CrossDayEvent { .. })));
    }

    #[test]
    fn malformed_timestamp_is_an_error() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
DTSTART:20250320T0900\n\
END:VEVENT\n\
END:VCALENDAR\n";

        assert!(matches!(parse(ics), Err(AggError::InvalidTimestamp(_))));
    }
}
