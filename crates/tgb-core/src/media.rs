//! Media classification for fetched messages.

use serde::Serialize;

use crate::messaging::types::{FetchedMessage, MediaInfo};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Photo,
    Video,
    Audio,
    Document,
}

/// Classified attachment metadata, as reported to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MediaDescriptor {
    pub media_type: MediaCategory,
    pub file_name: String,
    pub mime_type: Option<String>,
    /// Not exposed for photos.
    pub size: Option<u64>,
}

/// Describe the media on `message`, if any. Pure: no I/O.
pub fn classify(message: &FetchedMessage) -> Option<MediaDescriptor> {
    let media = message.media.as_ref()?;
    let id = message.id.0;

    let descriptor = match media {
        MediaInfo::Photo => MediaDescriptor {
            media_type: MediaCategory::Photo,
            file_name: format!("{id}.jpg"),
            mime_type: None,
            size: None,
        },
        MediaInfo::Document(doc) => {
            let media_type = if doc.is_video {
                MediaCategory::Video
            } else if doc.is_audio {
                MediaCategory::Audio
            } else {
                MediaCategory::Document
            };
            let file_name = doc
                .file_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| id.to_string());
            MediaDescriptor {
                media_type,
                file_name,
                mime_type: doc.mime_type.clone(),
                size: doc.size,
            }
        }
    };
    Some(descriptor)
}
