//! The poll-diff-notify loop.
//!
//! One watcher task drives everything: each cycle it walks the configured
//! feed list in order, fetches every feed, asks the tracker whether the head
//! entry is new, and notifies when it is. A feed's failure never affects the
//! other feeds or the cycle itself.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::feed::FeedSource;
use crate::notify::{compose_message, Notifier};
use crate::tracker::UpdateTracker;

/// Poll loop orchestrator.
///
/// Owns the update tracker exclusively; nothing else reads or writes it.
/// Feed source and notifier are injected so tests can substitute in-memory
/// doubles.
pub struct FeedWatcher<S, N> {
    source: S,
    notifier: N,
    tracker: UpdateTracker,
    config: Arc<ArcSwap<Config>>,
}

impl<S: FeedSource, N: Notifier> FeedWatcher<S, N> {
    /// Create a watcher with an empty tracker.
    pub fn new(source: S, notifier: N, config: Arc<ArcSwap<Config>>) -> Self {
        Self {
            source,
            notifier,
            tracker: UpdateTracker::new(),
            config,
        }
    }

    /// Current tracker state.
    pub fn tracker(&self) -> &UpdateTracker {
        &self.tracker
    }

    /// Run the watch loop forever.
    ///
    /// The configuration snapshot is re-read at each cycle boundary, so a
    /// reload takes effect on the next pass. The sleep happens after a full
    /// pass; actual cadence is pass duration plus the interval.
    pub async fn run(mut self) {
        loop {
            let config = self.config.load_full();
            self.run_pass(&config.feed_urls).await;

            debug!("pass complete, sleeping {} minute(s)", config.check_interval);
            sleep(Duration::from_secs(config.check_interval * 60)).await;
        }
    }

    /// Run one pass over the given feed URLs, strictly sequentially.
    pub async fn run_pass(&mut self, feed_urls: &[String]) {
        for feed_url in feed_urls {
            self.check_feed(feed_url).await;
        }
    }

    /// Fetch one feed, decide whether its head entry is new, and notify.
    async fn check_feed(&mut self, feed_url: &str) {
        let entries = match self.source.fetch(feed_url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("failed to fetch feed {feed_url}: {e}");
                return;
            }
        };

        let Some(head) = entries.first() else {
            debug!("feed {feed_url} has no entries");
            return;
        };

        if !self.tracker.is_new_update(feed_url, &head.marker) {
            debug!("feed {feed_url} unchanged (marker {})", head.marker);
            return;
        }

        let message = compose_message(&head.title, head.link.as_deref().unwrap_or(""));

        match self.notifier.send(&message).await {
            Ok(()) => {
                // Record only after successful delivery, so a failed send is
                // retried with the same marker on the next cycle.
                self.tracker.record(feed_url, &head.marker);
                info!("update message sent for feed {feed_url}");
            }
            Err(e) => {
                error!("failed to send notification for feed {feed_url}: {e}");
            }
        }
    }
}
