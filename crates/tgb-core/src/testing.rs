//! In-memory fakes shared by unit tests.

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    channel::ChannelRef,
    checkpoint::{CheckpointStore, Checkpoints},
    domain::{Channel, MessageId, PeerId, PeerKind},
    errors::Error,
    messaging::{
        port::MessageSource,
        types::{select_newer, FetchedMessage},
    },
    Result,
};

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<Checkpoints>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn with(state: Checkpoints) -> Self {
        Self {
            state: Mutex::new(state),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> Checkpoints {
        self.state.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CheckpointStore for MemoryStore {
    fn load(&self) -> Checkpoints {
        self.state.lock().unwrap().clone()
    }

    fn save(&self, state: &Checkpoints) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = state.clone();
        Ok(())
    }
}

pub fn channel(bare_id: i64, name: &str, username: Option<&str>) -> Channel {
    Channel {
        peer: PeerId::new(PeerKind::Channel, bare_id),
        name: name.to_string(),
        username: username.map(str::to_string),
    }
}

pub fn message(id: i32, text: Option<&str>) -> FetchedMessage {
    FetchedMessage {
        id: MessageId(id),
        date: at(1_700_000_000 + i64::from(id)),
        sender: Some(-1_000_000_000_001),
        text: text.map(str::to_string),
        media: None,
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
}

/// Scripted platform: one or more channels, each with ascending messages.
#[derive(Default)]
pub struct FakeSource {
    channels: Vec<Channel>,
    messages: Mutex<HashMap<i64, Vec<FetchedMessage>>>,
    pub fail_fetch: Mutex<Option<String>>,
    pub fetch_calls: AtomicUsize,
    pub downloads: Mutex<Vec<(i32, std::path::PathBuf)>>,
}

impl FakeSource {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            channels,
            ..Default::default()
        }
    }

    pub fn push(&self, channel: &Channel, message: FetchedMessage) {
        let mut map = self.messages.lock().unwrap();
        let xs = map.entry(channel.peer.marked()).or_default();
        xs.push(message);
        xs.sort_by_key(|m| m.id);
    }

    pub fn fail_next_fetch(&self, reason: &str) {
        *self.fail_fetch.lock().unwrap() = Some(reason.to_string());
    }

    fn stored(&self, channel: &Channel) -> Result<Vec<FetchedMessage>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.fail_fetch.lock().unwrap().take() {
            return Err(Error::Transport(reason));
        }
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(&channel.peer.marked())
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl MessageSource for FakeSource {
    async fn list_channels(&self) -> Result<Vec<Channel>> {
        Ok(self.channels.clone())
    }

    async fn resolve(&self, reference: &ChannelRef) -> Result<Channel> {
        let found = self.channels.iter().find(|ch| match reference {
            ChannelRef::Name(name) => {
                let name = name.trim_start_matches('@');
                ch.username.as_deref() == Some(name) || ch.name == name
            }
            ChannelRef::Id(id) => ch.peer.marked() == *id || ch.peer.bare_id == id.abs(),
        });
        found.cloned().ok_or_else(|| {
            Error::Resolution(format!(
                "Cannot find any entity corresponding to \"{reference}\""
            ))
        })
    }

    async fn fetch_newer(
        &self,
        channel: &Channel,
        min_id: u64,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>> {
        Ok(select_newer(self.stored(channel)?, min_id, limit))
    }

    async fn fetch_history(
        &self,
        channel: &Channel,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>> {
        let mut xs = self.stored(channel)?;
        xs.retain(|m| m.date >= after);
        xs.truncate(limit);
        Ok(xs)
    }

    async fn fetch_message(
        &self,
        channel: &Channel,
        id: MessageId,
    ) -> Result<Option<FetchedMessage>> {
        Ok(self.stored(channel)?.into_iter().find(|m| m.id == id))
    }

    async fn download_media(&self, _channel: &Channel, id: MessageId, dest: &Path) -> Result<()> {
        std::fs::write(dest, b"0123456789")?;
        self.downloads
            .lock()
            .unwrap()
            .push((id.0, dest.to_path_buf()));
        Ok(())
    }
}
