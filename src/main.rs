use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use mxrss::{Config, FeedClient, FeedWatcher, MatrixNotifier, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration; on a missing file, write a template and exit so
    // the operator can fill it in.
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(mxrss::MxrssError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("Config not found, creating template...");
            if let Err(e) = Config::write_template(&config_path) {
                eprintln!("Error creating template config: {e}");
                std::process::exit(1);
            }
            eprintln!(
                "Template config created at {config_path}. Please edit it and restart."
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    };

    if config.is_placeholder() {
        eprintln!(
            "Template values detected. Please edit the config file at {config_path} and restart."
        );
        std::process::exit(1);
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = mxrss::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        mxrss::logging::init_console_only(&config.logging.level);
    }

    info!(
        "mxrss starting: {} feed(s), check interval {} minute(s)",
        config.feed_urls.len(),
        config.check_interval
    );

    let fetcher = match FeedClient::new() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create feed client: {e}");
            std::process::exit(1);
        }
    };
    let notifier = MatrixNotifier::new(
        &config.matrix_server,
        &config.matrix_room_id,
        &config.matrix_token,
    );

    let config = Arc::new(ArcSwap::from_pointee(config));
    mxrss::spawn_reload_handler(PathBuf::from(&config_path), Arc::clone(&config));

    FeedWatcher::new(fetcher, notifier, config).run().await;
}
