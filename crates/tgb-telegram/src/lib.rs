//! Telegram adapter (grammers MTProto user client).
//!
//! This crate implements the `tgb-core` MessageSource over a user session, which
//! (unlike the Bot API) can enumerate dialogs and read channel history.

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grammers_client::{
    grammers_tl_types as tl,
    types::{Chat, Message},
    ChatMap, Client,
};
use grammers_session::PackedChat;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub mod auth;
pub mod convert;

use tgb_core::{
    channel::ChannelRef,
    config::Config,
    domain::{Channel, MessageId},
    errors::Error,
    messaging::{
        port::MessageSource,
        types::{select_newer, FetchedMessage},
    },
    Result,
};

use convert::{channel_of, fetched_of, peer_of};

/// Server-side cap on messages per `messages.getHistory` call.
const PAGE_SIZE: usize = 100;

/// Holds the most recently fetched value for one key, handed out once.
struct LastFetched<K, V> {
    slot: Mutex<Option<(K, V)>>,
}

impl<K: PartialEq, V> LastFetched<K, V> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    async fn put(&self, key: K, value: V) {
        *self.slot.lock().await = Some((key, value));
    }

    /// The stored value if it belongs to `key`; the slot is emptied either way.
    async fn take(&self, key: &K) -> Option<V> {
        match self.slot.lock().await.take() {
            Some((k, v)) if k == *key => Some(v),
            _ => None,
        }
    }
}

pub struct TelegramSource {
    client: Client,
    history_scan_limit: usize,
    /// Marked peer id -> packed chat, filled by resolution.
    chats: Mutex<HashMap<i64, PackedChat>>,
    /// Message looked up by `fetch_message`, reused by `download_media`.
    last_message: LastFetched<(i64, i32), Message>,
}

impl TelegramSource {
    /// Connect (and sign in on first use) with the configured session.
    pub async fn connect(cfg: &Config) -> Result<Self> {
        let client = auth::connect(cfg).await?;
        Ok(Self::new(client, cfg.history_scan_limit))
    }

    pub fn new(client: Client, history_scan_limit: usize) -> Self {
        Self {
            client,
            history_scan_limit,
            chats: Mutex::new(HashMap::new()),
            last_message: LastFetched::new(),
        }
    }

    /// Persist session state (auth key, update state) for the next run.
    pub fn save_session(&self, path: &Path) -> Result<()> {
        auth::save_session(&self.client, path)
    }

    fn map_err(e: impl std::fmt::Display) -> Error {
        Error::Transport(format!("telegram error: {e}"))
    }

    async fn remember(&self, chat: &Chat) -> Channel {
        let packed = chat.pack();
        let channel = channel_of(chat);
        self.chats
            .lock()
            .await
            .insert(peer_of(&packed).marked(), packed);
        channel
    }

    async fn packed(&self, channel: &Channel) -> Result<PackedChat> {
        let key = channel.peer.marked();
        self.chats.lock().await.get(&key).cloned().ok_or_else(|| {
            Error::Resolution(format!("channel {key} was not resolved in this session"))
        })
    }

    async fn dialog_chats(&self) -> Result<Vec<Chat>> {
        let mut out = Vec::new();
        let mut dialogs = self.client.iter_dialogs();
        while let Some(dialog) = dialogs.next().await.map_err(Self::map_err)? {
            out.push(dialog.chat().clone());
        }
        Ok(out)
    }

    async fn find_dialog(&self, reference: &ChannelRef) -> Result<Option<Chat>> {
        let chats = self.dialog_chats().await?;
        let found = match reference {
            ChannelRef::Name(name) => {
                let name = name.trim();
                chats.into_iter().find(|c| c.name() == name)
            }
            ChannelRef::Id(id) => {
                let by_marked = chats
                    .iter()
                    .position(|c| peer_of(&c.pack()).marked() == *id);
                let by_bare = || chats.iter().position(|c| c.pack().id == id.abs());
                by_marked.or_else(by_bare).map(|i| chats[i].clone())
            }
        };
        Ok(found)
    }

    async fn message_by_id(&self, channel: &Channel, id: MessageId) -> Result<Option<Message>> {
        let packed = self.packed(channel).await?;
        let mut found = self
            .client
            .get_messages_by_id(packed, &[id.0])
            .await
            .map_err(Self::map_err)?;
        Ok(found.pop().flatten())
    }

    /// One `messages.getHistory` round trip for the messages just above
    /// `min_id`, ascending.
    async fn page_above(
        &self,
        packed: PackedChat,
        min_id: i32,
        size: usize,
    ) -> Result<Vec<FetchedMessage>> {
        let size = size.min(PAGE_SIZE) as i32;
        let request = tl::functions::messages::GetHistory {
            peer: packed.to_input_peer(),
            offset_id: min_id.saturating_add(1),
            offset_date: 0,
            // Negative offset walks from the anchor towards newer messages.
            add_offset: -size,
            limit: size,
            max_id: 0,
            min_id,
            hash: 0,
        };

        let response = self
            .client
            .invoke(&request)
            .await
            .map_err(Self::map_err)?;
        let (messages, users, chats) = match response {
            tl::enums::messages::Messages::Messages(m) => (m.messages, m.users, m.chats),
            tl::enums::messages::Messages::Slice(m) => (m.messages, m.users, m.chats),
            tl::enums::messages::Messages::ChannelMessages(m) => (m.messages, m.users, m.chats),
            tl::enums::messages::Messages::NotModified(_) => return Ok(Vec::new()),
        };

        let chats = ChatMap::new(users, chats);
        let mut page: Vec<FetchedMessage> = messages
            .into_iter()
            .filter_map(|m| Message::from_raw(&self.client, m, &chats))
            .map(|m| fetched_of(&m))
            .collect();
        page.sort_by_key(|m| m.id);
        Ok(page)
    }

    /// Walk history newest-first while `keep` holds, up to the scan limit,
    /// returning what was kept in ascending order.
    async fn scan_back(
        &self,
        channel: &Channel,
        mut keep: impl FnMut(&Message) -> bool,
    ) -> Result<Vec<FetchedMessage>> {
        let packed = self.packed(channel).await?;
        let mut iter = self.client.iter_messages(packed);
        let mut out = Vec::new();
        let mut exhausted = true;

        while let Some(msg) = iter.next().await.map_err(Self::map_err)? {
            if !keep(&msg) {
                break;
            }
            out.push(fetched_of(&msg));
            if out.len() >= self.history_scan_limit {
                exhausted = false;
                break;
            }
        }

        if !exhausted {
            warn!(
                channel = channel.peer.marked(),
                scanned = out.len(),
                "scan limit reached; older messages in range were not read"
            );
        }
        out.reverse();
        Ok(out)
    }
}

#[async_trait]
impl MessageSource for TelegramSource {
    async fn list_channels(&self) -> Result<Vec<Channel>> {
        let chats = self.dialog_chats().await?;
        let mut out = Vec::with_capacity(chats.len());
        for chat in &chats {
            out.push(self.remember(chat).await);
        }
        Ok(out)
    }

    async fn resolve(&self, reference: &ChannelRef) -> Result<Channel> {
        if let ChannelRef::Name(name) = reference {
            let username = name
                .trim()
                .trim_start_matches("https://t.me/")
                .trim_start_matches('@');
            match self.client.resolve_username(username).await {
                Ok(Some(chat)) => return Ok(self.remember(&chat).await),
                Ok(None) => debug!("no user or channel named @{username}"),
                // Display names are not valid usernames; fall back to dialogs.
                Err(e) => debug!("username lookup for {username:?} failed: {e}"),
            }
        }

        match self.find_dialog(reference).await? {
            Some(chat) => Ok(self.remember(&chat).await),
            None => Err(Error::Resolution(format!(
                "Cannot find any entity corresponding to \"{reference}\""
            ))),
        }
    }

    async fn fetch_newer(
        &self,
        channel: &Channel,
        min_id: u64,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>> {
        if min_id == 0 {
            let mut seen = 0usize;
            let newest = self
                .scan_back(channel, |_| {
                    seen += 1;
                    seen <= limit
                })
                .await?;
            return Ok(select_newer(newest, 0, limit));
        }

        let packed = self.packed(channel).await?;
        let mut cursor = i32::try_from(min_id).map_err(|_| {
            Error::InvalidInput(format!("checkpoint {min_id} is not a message id"))
        })?;
        let mut out = Vec::new();

        while out.len() < limit {
            let want = limit - out.len();
            let page = self.page_above(packed, cursor, want).await?;
            let page = select_newer(page, MessageId(cursor).as_checkpoint(), want);
            let Some(last) = page.last() else { break };
            let short = page.len() < want.min(PAGE_SIZE);
            cursor = last.id.0;
            out.extend(page);
            if short {
                break;
            }
        }

        debug!(
            channel = channel.peer.marked(),
            min_id,
            fetched = out.len(),
            "fetched newer"
        );
        Ok(out)
    }

    async fn fetch_history(
        &self,
        channel: &Channel,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<FetchedMessage>> {
        let mut window = self.scan_back(channel, |m| m.date() >= after).await?;
        window.truncate(limit);
        Ok(window)
    }

    async fn fetch_message(
        &self,
        channel: &Channel,
        id: MessageId,
    ) -> Result<Option<FetchedMessage>> {
        let Some(msg) = self.message_by_id(channel, id).await? else {
            return Ok(None);
        };
        let fetched = fetched_of(&msg);
        self.last_message.put((channel.peer.marked(), id.0), msg).await;
        Ok(Some(fetched))
    }

    async fn download_media(&self, channel: &Channel, id: MessageId, dest: &Path) -> Result<()> {
        let key = (channel.peer.marked(), id.0);
        let msg = match self.last_message.take(&key).await {
            Some(msg) => msg,
            None => self
                .message_by_id(channel, id)
                .await?
                .ok_or_else(|| Error::Resolution(format!("message {} not found", id.0)))?,
        };
        let downloaded = msg.download_media(dest).await?;
        if !downloaded {
            return Err(Error::InvalidInput(format!(
                "message {} has no downloadable media",
                id.0
            )));
        }
        Ok(())
    }
}
