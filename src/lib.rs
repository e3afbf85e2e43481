//! mxrss - RSS/Atom feed watcher that posts new-entry notifications to a
//! Matrix room.
//!
//! A single watcher task polls the configured feeds on a fixed interval,
//! compares each feed's head entry against the last-notified marker, and
//! posts a formatted message to the configured room when it changed.

pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod notify;
pub mod reload;
pub mod tracker;
pub mod watcher;

pub use config::{Config, LoggingConfig, DEFAULT_CONFIG_PATH};
pub use error::{MxrssError, Result};
pub use feed::{parse_entries, FeedClient, FeedEntry, FeedSource};
pub use notify::{compose_message, MatrixNotifier, Notifier};
pub use reload::spawn_reload_handler;
pub use tracker::UpdateTracker;
pub use watcher::FeedWatcher;
