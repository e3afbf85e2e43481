//! Notification delivery to a Matrix room.
//!
//! Composes the outbound message for a feed update and delivers it via the
//! Matrix client-server API. The message is sent in two representations:
//! the markdown source as `body`, and an HTML rendering as `formatted_body`,
//! so the receiving client can pick either.

use async_trait::async_trait;
use pulldown_cmark::{html, Parser};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::error::{MxrssError, Result};

/// Fixed label prefixed to every notification message.
const MESSAGE_PREFIX: &str = "IT-News";

/// Sink for outbound notifications, substitutable in tests.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message. No retries; the caller decides how to react.
    async fn send(&self, message: &str) -> Result<()>;
}

/// Compose the notification text for a feed entry.
///
/// Renders as a markdown hyperlink with the fixed label prefix, e.g.
/// `IT-News: [Big Release](https://x.io/a)`.
pub fn compose_message(title: &str, link: &str) -> String {
    format!("{MESSAGE_PREFIX}: [{title}]({link})")
}

/// Render a markdown message to HTML.
fn markdown_to_html(message: &str) -> String {
    let mut out = String::with_capacity(message.len() * 2);
    html::push_html(&mut out, Parser::new(message));
    out
}

/// `m.room.message` event body.
#[derive(Debug, Serialize)]
struct RoomMessage<'a> {
    msgtype: &'static str,
    body: &'a str,
    format: &'static str,
    formatted_body: &'a str,
}

impl<'a> RoomMessage<'a> {
    fn text(body: &'a str, formatted_body: &'a str) -> Self {
        Self {
            msgtype: "m.text",
            body,
            format: "org.matrix.custom.html",
            formatted_body,
        }
    }
}

/// Notifier posting to a single Matrix room.
pub struct MatrixNotifier {
    client: Client,
    server: String,
    room_id: String,
    token: String,
}

impl MatrixNotifier {
    /// Create a notifier for the given homeserver, room, and access token.
    pub fn new(
        server: impl Into<String>,
        room_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            server: server.into(),
            room_id: room_id.into(),
            token: token.into(),
        }
    }

    /// Create a notifier around an existing reqwest Client.
    pub fn with_client(
        client: Client,
        server: impl Into<String>,
        room_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            server: server.into(),
            room_id: room_id.into(),
            token: token.into(),
        }
    }

    /// Room-message endpoint URL with the room ID percent-encoded.
    fn endpoint(&self) -> String {
        format!(
            "{}/_matrix/client/r0/rooms/{}/send/m.room.message?access_token={}",
            self.server.trim_end_matches('/'),
            urlencoding::encode(&self.room_id),
            urlencoding::encode(&self.token)
        )
    }
}

#[async_trait]
impl Notifier for MatrixNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let formatted = markdown_to_html(message);
        let payload = RoomMessage::text(message, &formatted);

        debug!(room = %self.room_id, "sending room message");

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| MxrssError::Delivery(format!("failed to send message: {e}")))?;

        // The room-send endpoint answers 200 on success; treat anything
        // else, including other 2xx, as a delivery failure.
        if response.status() != StatusCode::OK {
            return Err(MxrssError::Delivery(format!(
                "failed to send message: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_message_literal() {
        assert_eq!(
            compose_message("Big Release", "https://x.io/a"),
            "IT-News: [Big Release](https://x.io/a)"
        );
    }

    #[test]
    fn test_markdown_to_html_renders_link() {
        let html = markdown_to_html("IT-News: [Big Release](https://x.io/a)");
        assert!(html.contains(r#"<a href="https://x.io/a">Big Release</a>"#));
        assert!(html.contains("IT-News:"));
    }

    #[test]
    fn test_room_message_payload_shape() {
        let payload = RoomMessage::text("hello", "<p>hello</p>");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["msgtype"], "m.text");
        assert_eq!(json["body"], "hello");
        assert_eq!(json["format"], "org.matrix.custom.html");
        assert_eq!(json["formatted_body"], "<p>hello</p>");
    }

    #[test]
    fn test_endpoint_encodes_room_id() {
        let notifier = MatrixNotifier::new(
            "https://matrix.example.org/",
            "!room:example.org",
            "secret",
        );
        assert_eq!(
            notifier.endpoint(),
            "https://matrix.example.org/_matrix/client/r0/rooms/%21room%3Aexample.org/send/m.room.message?access_token=secret"
        );
    }
}
