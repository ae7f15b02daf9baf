//! grammers types -> core domain types.

use grammers_client::types::{Chat, Media, Message};
use grammers_session::{PackedChat, PackedType};

use tgb_core::{
    domain::{Channel, MessageId, PeerId, PeerKind},
    messaging::types::{DocumentInfo, FetchedMessage, MediaInfo},
};

pub fn peer_of(packed: &PackedChat) -> PeerId {
    let kind = match packed.ty {
        PackedType::User | PackedType::Bot => PeerKind::User,
        PackedType::Chat => PeerKind::Group,
        PackedType::Broadcast => PeerKind::Channel,
        _ => PeerKind::Supergroup,
    };
    PeerId::new(kind, packed.id)
}

pub fn channel_of(chat: &Chat) -> Channel {
    Channel {
        peer: peer_of(&chat.pack()),
        name: chat.name().to_string(),
        username: chat.username().map(str::to_string),
    }
}

pub fn fetched_of(msg: &Message) -> FetchedMessage {
    let text = msg.text();
    FetchedMessage {
        id: MessageId(msg.id()),
        date: msg.date(),
        sender: msg.sender().map(|s| peer_of(&s.pack()).marked()),
        text: (!text.is_empty()).then(|| text.to_string()),
        media: msg.media().and_then(media_of),
    }
}

fn media_of(media: Media) -> Option<MediaInfo> {
    match media {
        Media::Photo(_) => Some(MediaInfo::Photo),
        Media::Document(doc) => Some(MediaInfo::Document(document_info(
            doc.name(),
            doc.mime_type(),
            doc.size(),
        ))),
        _ => None,
    }
}

/// Video/audio flags come from the MIME type the platform reports.
pub fn document_info(name: &str, mime_type: Option<&str>, size: i64) -> DocumentInfo {
    let mime = mime_type.map(|m| m.trim().to_ascii_lowercase());
    let has_prefix = |prefix: &str| mime.as_deref().is_some_and(|m| m.starts_with(prefix));
    DocumentInfo {
        file_name: (!name.trim().is_empty()).then(|| name.to_string()),
        mime_type: mime_type.map(str::to_string),
        size: u64::try_from(size).ok(),
        is_video: has_prefix("video/"),
        is_audio: has_prefix("audio/"),
    }
}
