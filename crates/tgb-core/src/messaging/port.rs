use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    channel::ChannelRef,
    domain::{Channel, MessageId},
    messaging::types::FetchedMessage,
    Result,
};

/// Read-only port over the messaging platform.
///
/// One call is one remote round trip (or a bounded series of them); nothing
/// here sends messages. Message lists are always yielded in ascending id order.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Channel-type conversations visible to the account.
    async fn list_channels(&self) -> Result<Vec<Channel>>;

    /// Resolve a user-supplied reference to a platform entity.
    async fn resolve(&self, reference: &ChannelRef) -> Result<Channel>;

    /// Oldest `limit` messages with id strictly greater than `min_id`.
    ///
    /// With no checkpoint yet (`min_id == 0`) this is the newest `limit`
    /// messages instead, so a first sync does not replay the whole channel.
    async fn fetch_newer(
        &self,
        channel: &Channel,
        min_id: u64,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>>;

    /// Oldest `limit` messages dated at or after `after`, chronological.
    async fn fetch_history(
        &self,
        channel: &Channel,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>>;

    /// A single message by id, if it exists.
    async fn fetch_message(
        &self,
        channel: &Channel,
        id: MessageId,
    ) -> Result<Option<FetchedMessage>>;

    /// Save the media of message `id` to `dest` (a file path).
    ///
    /// Called right after `fetch_message` for the same id; adapters may reuse
    /// what that lookup returned instead of fetching the message again.
    async fn download_media(&self, channel: &Channel, id: MessageId, dest: &Path) -> Result<()>;
}
