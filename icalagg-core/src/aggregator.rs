//! Merging a set of room feeds into one schedule.

use tracing::{debug, info};

use crate::config::AggregatorConfig;
use crate::error::{AggError, AggResult};
use crate::event::Event;
use crate::feed::{Feed, FeedSource};
use crate::grid;
use crate::ics;

/// One set of room feeds being merged into a single schedule.
///
/// Feeds are registered up front, then read in one go by `collect_all`.
/// Registration order is also column order in the HTML grid.
#[derive(Debug)]
pub struct Aggregator {
    config: AggregatorConfig,
    feeds: Vec<Feed>,
    events: Vec<Event>,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Aggregator {
            config,
            feeds: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Add a room feed. Nothing is fetched until `collect_all`.
    pub fn register(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.feeds.push(Feed::new(name, source));
    }

    /// Read and parse every registered feed, then sort all events by start.
    ///
    /// Feeds are processed one at a time in registration order. The first
    /// feed that can't be fetched or parsed aborts the whole run.
    pub fn collect_all<S: FeedSource + ?Sized>(&mut self, source: &S) -> AggResult<()> {
        for feed in &self.feeds {
            let reader = source.open(feed)?;

            let mut count = 0;
            for event in ics::parse_calendar(reader, self.config) {
                let mut event = event.map_err(|e| AggError::Feed {
                    feed: feed.name.clone(),
                    source: Box::new(e),
                })?;
                event.location = Some(feed.name.clone());
                self.events.push(event);
                count += 1;
            }
            debug!(feed = %feed.name, events = count, "collected feed");
        }

        // Stable: equal starts keep feed order, then document order
        self.events.sort();

        info!(
            feeds = self.feeds.len(),
            events = self.events.len(),
            "collected all feeds"
        );
        Ok(())
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    /// All collected events, sorted by start once `collect_all` has run.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Merged calendar feed of all collected events.
    pub fn to_ics(&self) -> String {
        ics::generate_ics(&self.events)
    }

    /// HTML grid fragment of all collected events.
    pub fn to_html(&self) -> AggResult<String> {
        grid::generate_html(&self.feeds, &self.events, self.config.display_tz)
    }
}
