/// Telegram message id (numeric, per-channel, monotonically increasing).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub i32);

impl MessageId {
    /// Checkpoint value for this id. Ids are positive; anything else maps to 0.
    pub fn as_checkpoint(self) -> u64 {
        u64::try_from(self.0).unwrap_or(0)
    }
}

/// Offset Telegram adds to channel/supergroup ids in the "marked" peer form.
const CHANNEL_MARK: i64 = 1_000_000_000_000;

/// Kind of peer a conversation is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerKind {
    User,
    /// Basic (legacy) group chat.
    Group,
    /// Supergroup (technically a channel with megagroup flag).
    Supergroup,
    /// Broadcast channel.
    Channel,
}

impl PeerKind {
    /// Whether this peer shows up in `list` output.
    pub fn is_channel_like(self) -> bool {
        matches!(self, PeerKind::Channel | PeerKind::Supergroup)
    }
}

/// Platform peer identity: kind plus the bare (unmarked) id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeerId {
    pub kind: PeerKind,
    pub bare_id: i64,
}

impl PeerId {
    pub fn new(kind: PeerKind, bare_id: i64) -> Self {
        Self { kind, bare_id }
    }

    /// Marked peer id: users keep their id, basic groups are negated and
    /// channels/supergroups get the `-100…` prefix.
    pub fn marked(self) -> i64 {
        match self.kind {
            PeerKind::User => self.bare_id,
            PeerKind::Group => -self.bare_id,
            PeerKind::Supergroup | PeerKind::Channel => -(CHANNEL_MARK + self.bare_id),
        }
    }
}

/// A resolved conversation entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub peer: PeerId,
    pub name: String,
    pub username: Option<String>,
}
