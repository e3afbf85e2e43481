//! Signal-triggered configuration reload.
//!
//! On SIGHUP the configuration file is re-read, validated, and swapped in
//! atomically. The watcher picks up the new snapshot at its next cycle
//! boundary; the update tracker is never touched by a reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{error, info, warn};

use crate::config::Config;

/// Spawn the reload handler task.
///
/// On non-Unix targets this is a no-op and the task exits immediately.
pub fn spawn_reload_handler(path: PathBuf, config: Arc<ArcSwap<Config>>) {
    tokio::spawn(reload_loop(path, config));
}

#[cfg(unix)]
async fn reload_loop(path: PathBuf, config: Arc<ArcSwap<Config>>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("failed to install SIGHUP handler: {e}");
            return;
        }
    };

    info!("send SIGHUP to reload {}", path.display());

    while hangup.recv().await.is_some() {
        apply_reload(&path, &config);
    }
}

#[cfg(not(unix))]
async fn reload_loop(_path: PathBuf, _config: Arc<ArcSwap<Config>>) {}

/// Reload the configuration from `path` and swap it in if valid.
///
/// An unreadable or invalid file leaves the previous snapshot in place.
fn apply_reload(path: &Path, config: &ArcSwap<Config>) {
    match Config::load(path).and_then(|c| c.validate().map(|()| c)) {
        Ok(new_config) => {
            info!(
                "configuration reloaded: {} feed(s), check interval {} min",
                new_config.feed_urls.len(),
                new_config.check_interval
            );
            config.store(Arc::new(new_config));
        }
        Err(e) => {
            warn!("config reload failed, keeping previous configuration: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_json(interval: u64) -> String {
        format!(
            r#"{{
                "feed_urls": ["https://example.org/feed.xml"],
                "matrix_server": "https://matrix.example.org",
                "matrix_room_id": "!room:example.org",
                "matrix_token": "secret",
                "check_interval": {interval}
            }}"#
        )
    }

    #[test]
    fn test_apply_reload_swaps_valid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(valid_json(7).as_bytes()).unwrap();

        let config = ArcSwap::from_pointee(Config::default());
        apply_reload(file.path(), &config);

        let snapshot = config.load();
        assert_eq!(snapshot.check_interval, 7);
        assert_eq!(snapshot.feed_urls, vec!["https://example.org/feed.xml"]);
    }

    #[test]
    fn test_apply_reload_keeps_old_on_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // check_interval 0 fails validation
        file.write_all(valid_json(0).as_bytes()).unwrap();

        let config = ArcSwap::from_pointee(Config::default());
        apply_reload(file.path(), &config);

        assert_eq!(config.load().check_interval, 30);
    }

    #[test]
    fn test_apply_reload_keeps_old_on_missing_file() {
        let config = ArcSwap::from_pointee(Config::default());
        apply_reload(Path::new("/nonexistent/mxrss.json"), &config);

        assert!(config.load().is_placeholder());
    }
}
