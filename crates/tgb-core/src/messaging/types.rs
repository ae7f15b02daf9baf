use chrono::{DateTime, Utc};

use crate::domain::MessageId;

/// A message as returned by the platform, reduced to the metadata we use.
///
/// Telegram-specific fields should live in the adapter.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchedMessage {
    pub id: MessageId,
    pub date: DateTime<Utc>,
    /// Marked peer id of the sender (the channel itself for channel posts).
    pub sender: Option<i64>,
    pub text: Option<String>,
    pub media: Option<MediaInfo>,
}

impl FetchedMessage {
    /// Messages with neither text nor media are fetched but not reported.
    pub fn is_reportable(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty()) || self.media.is_some()
    }
}

/// Media metadata already attached to a fetched message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaInfo {
    Photo,
    Document(DocumentInfo),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub is_video: bool,
    pub is_audio: bool,
}

/// Pick what `fetch_newer` yields from an ascending run of messages.
///
/// Only ids strictly above `min_id` survive. With a checkpoint the oldest
/// `limit` of them are kept, so a backlog drains across calls; without one
/// (`min_id == 0`) the newest `limit` are kept.
pub fn select_newer(
    mut ascending: Vec<FetchedMessage>,
    min_id: u64,
    limit: usize,
) -> Vec<FetchedMessage> {
    ascending.retain(|m| m.id.as_checkpoint() > min_id);
    if min_id == 0 {
        let skip = ascending.len().saturating_sub(limit);
        ascending.drain(..skip);
    } else {
        ascending.truncate(limit);
    }
    ascending
}
