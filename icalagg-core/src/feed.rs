//! Registered feeds and the seam for retrieving their contents.

use std::io::BufRead;

use crate::error::AggResult;

/// One room's calendar feed, as registered with the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Room name, used as event location and grid column header
    pub name: String,
    /// Where to read the feed from (URL, path, ...). Interpreted by the `FeedSource`.
    pub source: String,
}

impl Feed {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Feed {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Retrieves the raw calendar text of a feed.
///
/// Retrieval is synchronous and called once per feed, in registration order.
/// Timeouts, if any, are up to the implementation.
pub trait FeedSource {
    fn open(&self, feed: &Feed) -> AggResult<Box<dyn BufRead + '_>>;
}
