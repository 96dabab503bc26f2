//! Calendar text reading and writing.
//!
//! Parsing tolerates folded lines and unknown properties; generation writes a
//! minimal unfolded feed with only the fields the schedule carries.

mod generate;
mod parse;
mod unfold;

pub use generate::generate_ics;
pub use parse::{CalendarParser, parse_calendar};
pub use unfold::Unfolder;
