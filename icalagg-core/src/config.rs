//! Settings threaded from the aggregator into every parsed event.

use chrono_tz::Tz;

/// Display timezone and incoming timestamp correction for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Timezone used for rendered times and for the same-day check.
    /// Calendar output is always UTC regardless of this value.
    pub display_tz: Tz,

    /// Hours added to every parsed DTSTART/DTEND, for feeds that publish
    /// wrong absolute times.
    pub adjust_hours: i64,
}

impl AggregatorConfig {
    pub fn new(display_tz: Tz, adjust_hours: i64) -> Self {
        AggregatorConfig {
            display_tz,
            adjust_hours,
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfig::new(Tz::UTC, 0)
    }
}
