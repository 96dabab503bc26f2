//! Merged calendar generation.

use crate::event::Event;

const PRODID: &str = "-//hagander/icalaggregator//NONSGML v1.0//EN";

/// Generate calendar text for the given events, in the order given.
///
/// Lines are not folded and values are written verbatim: a summary that
/// contained an escaped comma on input comes out with a bare comma.
pub fn generate_ics(events: &[Event]) -> String {
    let mut out = String::new();

    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{PRODID}"));

    for event in events {
        push_line(&mut out, "BEGIN:VEVENT");
        push_line(&mut out, &format!("DTSTART:{}", event.start_ics()));
        push_line(&mut out, &format!("DTEND:{}", event.end_ics()));
        push_line(&mut out, &format!("SUMMARY:{}", event.summary));
        push_line(
            &mut out,
            &format!("LOCATION:{}", event.location.as_deref().unwrap_or("")),
        );
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str("\r\n");
}
