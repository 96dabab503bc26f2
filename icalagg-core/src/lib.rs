//! Core types for icalagg.
//!
//! This crate merges one calendar feed per room into a single schedule:
//! - `ics` reads folded calendar text into validated `Event`s and writes the merged feed back out
//! - `grid` lays the merged schedule out as a day-by-day, room-by-room HTML grid
//! - `aggregator` ties the two together for a list of registered feeds

pub mod aggregator;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod grid;
pub mod ics;

pub use aggregator::Aggregator;
pub use config::AggregatorConfig;
pub use error::{AggError, AggResult};
pub use event::Event;
pub use feed::{Feed, FeedSource};
