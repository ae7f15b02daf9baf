//! JSON documents written to stdout.

use serde::Serialize;

use crate::{
    domain::Channel,
    errors::Error,
    media::{classify, MediaCategory, MediaDescriptor},
    messaging::types::FetchedMessage,
    utils::iso_timestamp,
};

/// One reported message (text and/or media).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageRecord {
    pub id: i32,
    pub date: String,
    pub sender: Option<i64>,
    pub text: Option<String>,
    pub media: Option<MediaDescriptor>,
}

impl MessageRecord {
    /// `None` for messages with neither text nor media.
    pub fn from_message(message: &FetchedMessage) -> Option<Self> {
        if !message.is_reportable() {
            return None;
        }
        Some(Self {
            id: message.id.0,
            date: iso_timestamp(&message.date),
            sender: message.sender,
            text: message.text.clone().filter(|t| !t.is_empty()),
            media: classify(message),
        })
    }
}

/// Entry of the `list` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    pub id: i64,
    pub name: String,
    pub username: Option<String>,
}

impl From<&Channel> for ChannelSummary {
    fn from(ch: &Channel) -> Self {
        Self {
            id: ch.peer.marked(),
            name: ch.name.clone(),
            username: ch.username.clone(),
        }
    }
}

/// Result of the `download` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub message_id: i32,
    pub channel_id: i64,
    pub file_path: String,
    pub media_type: MediaCategory,
    pub size: u64,
}

impl DownloadReport {
    pub fn new(
        channel: &Channel,
        message_id: i32,
        file_path: String,
        media_type: MediaCategory,
        size: u64,
    ) -> Self {
        Self {
            message_id,
            channel_id: channel.peer.marked(),
            file_path,
            media_type,
            size,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorDocument<'a> {
    error: String,
    kind: &'a str,
}

/// Error document: `{"error": "<message>", "kind": "<tag>"}`.
pub fn error_value(err: &Error) -> serde_json::Value {
    serde_json::to_value(ErrorDocument {
        error: err.to_string(),
        kind: err.kind(),
    })
    .unwrap_or_else(|_| serde_json::json!({ "error": err.to_string() }))
}

/// Pretty JSON with non-ASCII text left as-is.
pub fn render(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        format!("{{\"error\": \"cannot render output: {e}\", \"kind\": \"json\"}}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageId, PeerId, PeerKind},
        messaging::types::MediaInfo,
    };
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn message(id: i32, text: Option<&str>, media: Option<MediaInfo>) -> FetchedMessage {
        FetchedMessage {
            id: MessageId(id),
            date: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            sender: Some(-1_000_000_000_055),
            text: text.map(str::to_string),
            media,
        }
    }

    #[test]
    fn text_record_shape() {
        let rec = MessageRecord::from_message(&message(102, Some("héllo"), None)).unwrap();
        assert_eq!(
            serde_json::to_value(&rec).unwrap(),
            json!({
                "id": 102,
                "date": "2023-11-14T22:13:20+00:00",
                "sender": -1_000_000_000_055i64,
                "text": "héllo",
                "media": null,
            })
        );
    }

    #[test]
    fn photo_only_record_has_null_text() {
        let rec = MessageRecord::from_message(&message(5, Some(""), Some(MediaInfo::Photo))).unwrap();
        assert_eq!(rec.text, None);
        assert_eq!(rec.media.unwrap().file_name, "5.jpg");
    }

    #[test]
    fn empty_messages_produce_no_record() {
        assert!(MessageRecord::from_message(&message(101, None, None)).is_none());
    }

    #[test]
    fn list_uses_marked_ids() {
        let ch = Channel {
            peer: PeerId::new(PeerKind::Channel, 9),
            name: "News".to_string(),
            username: None,
        };
        assert_eq!(
            serde_json::to_value(ChannelSummary::from(&ch)).unwrap(),
            json!({ "id": -1_000_000_000_009i64, "name": "News", "username": null })
        );
    }

    #[test]
    fn errors_carry_message_and_kind() {
        let v = error_value(&Error::Resolution("Cannot find any entity".to_string()));
        assert_eq!(
            v,
            json!({ "error": "Cannot find any entity", "kind": "resolution_failure" })
        );
    }

    #[test]
    fn render_keeps_unicode() {
        let out = render(&json!([{ "text": "привет" }]));
        assert!(out.contains("привет"));
    }
}
