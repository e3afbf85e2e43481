//! Per-feed update tracking.
//!
//! The tracker remembers, for each feed URL, the marker of the entry that was
//! last successfully notified. It is the single source of truth for the
//! "is this update new" decision.

use std::collections::HashMap;

/// In-memory mapping from feed URL to last-notified update marker.
///
/// State lives for the process lifetime only; after a restart every feed
/// counts as never-notified and its current head entry fires again.
#[derive(Debug, Default)]
pub struct UpdateTracker {
    last_markers: HashMap<String, String>,
}

impl UpdateTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `marker` is new for the given feed.
    ///
    /// Returns true iff no marker is recorded for the feed, or the recorded
    /// marker differs from `marker`. Comparison is exact string inequality;
    /// markers are opaque and never interpreted as timestamps.
    pub fn is_new_update(&self, feed_url: &str, marker: &str) -> bool {
        match self.last_markers.get(feed_url) {
            None => true,
            Some(last) => last != marker,
        }
    }

    /// Record `marker` as the last-notified marker for the feed,
    /// overwriting any previous value.
    pub fn record(&mut self, feed_url: &str, marker: &str) {
        self.last_markers
            .insert(feed_url.to_string(), marker.to_string());
    }

    /// Last recorded marker for a feed, if any.
    pub fn last_marker(&self, feed_url: &str) -> Option<&str> {
        self.last_markers.get(feed_url).map(String::as_str)
    }

    /// Number of feeds with a recorded marker.
    pub fn len(&self) -> usize {
        self.last_markers.len()
    }

    /// Whether no feed has been notified yet.
    pub fn is_empty(&self) -> bool {
        self.last_markers.is_empty()
    }
}
