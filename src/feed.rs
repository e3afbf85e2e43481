//! Feed fetching and parsing.
//!
//! Fetches an RSS/Atom document over HTTP and reduces it to the ordered list
//! of entries the watcher cares about: title, link, and an opaque update
//! marker per entry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;

use crate::error::{MxrssError, Result};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout in seconds.
const READ_TIMEOUT_SECS: u64 = 20;

/// Total timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Maximum feed size in bytes (5MB).
const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// User agent string for feed fetching.
const USER_AGENT: &str = "mxrss/0.1 (RSS notifier)";

/// A single feed entry, newest-first in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry title.
    pub title: String,
    /// Link to the entry, if the feed provides one.
    pub link: Option<String>,
    /// Opaque update marker for change detection.
    ///
    /// Taken from the entry's `updated` timestamp (RFC 3339), falling back
    /// to `published` and finally to the entry id.
    pub marker: String,
}

/// Source of feed snapshots, substitutable in tests.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`.
    ///
    /// A feed with zero entries is `Ok(vec![])`, not an error.
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>>;
}

/// HTTP feed client with timeouts and size limits.
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Create a new client with default settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MxrssError::Fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Create a client around an existing reqwest Client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>> {
        tracing::debug!("fetching feed from {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MxrssError::Fetch(format!("failed to fetch feed: {e}")))?;

        if !response.status().is_success() {
            return Err(MxrssError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_FEED_SIZE {
                return Err(MxrssError::Fetch(format!(
                    "feed too large: {content_length} bytes (max {MAX_FEED_SIZE} bytes)"
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MxrssError::Fetch(format!("failed to read response: {e}")))?;

        if bytes.len() as u64 > MAX_FEED_SIZE {
            return Err(MxrssError::Fetch(format!(
                "feed too large: {} bytes (max {MAX_FEED_SIZE} bytes)",
                bytes.len()
            )));
        }

        let entries = parse_entries(&bytes)?;
        tracing::debug!("parsed {} entries from {url}", entries.len());
        Ok(entries)
    }
}

/// Parse feed bytes into entries, preserving document order.
pub fn parse_entries(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = parser::parse(bytes)
        .map_err(|e| MxrssError::Fetch(format!("failed to parse feed: {e}")))?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());
            let link = entry.links.first().map(|l| l.href.clone());
            let marker = entry_marker(entry.updated, entry.published, &entry.id);

            FeedEntry {
                title,
                link,
                marker,
            }
        })
        .collect();

    Ok(entries)
}

/// Derive an entry's update marker.
fn entry_marker(
    updated: Option<DateTime<Utc>>,
    published: Option<DateTime<Utc>>,
    id: &str,
) -> String {
    updated
        .or(published)
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM_TWO_ENTRIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Blog</title>
  <entry>
    <id>urn:uuid:2</id>
    <title>Second Post</title>
    <link href="https://example.org/2"/>
    <updated>2024-02-01T12:00:00Z</updated>
  </entry>
  <entry>
    <id>urn:uuid:1</id>
    <title>First Post</title>
    <link href="https://example.org/1"/>
    <updated>2024-01-01T12:00:00Z</updated>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_atom_preserves_document_order() {
        let entries = parse_entries(ATOM_TWO_ENTRIES.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Second Post");
        assert_eq!(entries[0].link, Some("https://example.org/2".to_string()));
        assert_eq!(entries[0].marker, "2024-02-01T12:00:00+00:00");
        assert_eq!(entries[1].title, "First Post");
    }

    #[test]
    fn test_parse_rss_item() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <item>
      <title>Release Notes</title>
      <link>https://example.org/release</link>
      <guid>release-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

        let entries = parse_entries(rss.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Release Notes");
        assert_eq!(entries[0].link, Some("https://example.org/release".to_string()));
        // No <updated>, so the marker falls back to pubDate.
        assert_eq!(entries[0].marker, "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_empty_feed_is_ok() {
        let atom = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Empty Feed</title>
</feed>"#;

        let entries = parse_entries(atom.as_bytes()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_parse_invalid_document() {
        let result = parse_entries(b"this is not XML");
        assert!(matches!(result, Err(MxrssError::Fetch(_))));
    }

    #[test]
    fn test_missing_title_defaults() {
        let atom = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Feed</title>
  <entry>
    <id>urn:uuid:1</id>
    <updated>2024-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;

        let entries = parse_entries(atom.as_bytes()).unwrap();
        assert_eq!(entries[0].title, "Untitled");
        assert_eq!(entries[0].link, None);
    }

    #[test]
    fn test_entry_marker_prefers_updated() {
        let updated = "2024-02-01T00:00:00Z".parse::<DateTime<Utc>>().ok();
        let published = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().ok();
        assert_eq!(
            entry_marker(updated, published, "id-1"),
            "2024-02-01T00:00:00+00:00"
        );
        assert_eq!(
            entry_marker(None, published, "id-1"),
            "2024-01-01T00:00:00+00:00"
        );
        assert_eq!(entry_marker(None, None, "id-1"), "id-1");
    }
}
