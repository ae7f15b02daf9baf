//! Incremental sync: deliver messages newer than the stored checkpoint.
//!
//! Per call: resolve the channel, reconcile legacy state keys, fetch messages
//! strictly newer than the checkpoint, advance the checkpoint over *every*
//! fetched message, and persist only when something changed. Any failure
//! before persisting leaves the store untouched, so a failed call may
//! redeliver but never skips.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    channel::{canonical_key, ChannelTarget},
    checkpoint::{reconcile, CheckpointStore},
    messaging::{port::MessageSource, types::FetchedMessage},
    output::MessageRecord,
    Result,
};

#[derive(Clone, Debug, PartialEq)]
pub struct SyncOutcome {
    pub channel_key: String,
    pub last_seen_id: u64,
    pub persisted: bool,
    /// Reportable messages only, in fetch order.
    pub records: Vec<MessageRecord>,
}

pub struct SyncOrchestrator {
    store: Arc<dyn CheckpointStore>,
}

impl SyncOrchestrator {
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self { store }
    }

    pub async fn sync(
        &self,
        source: &dyn MessageSource,
        target: &ChannelTarget,
        limit: usize,
    ) -> Result<SyncOutcome> {
        let mut state = self.store.load();

        debug!(channel = %target.raw(), "sync: resolving");
        let channel = source.resolve(target.reference()).await?;
        let key = canonical_key(&channel);

        debug!(channel = %key, "sync: reconciling");
        let (last_id, mut changed) = reconcile(&mut state, &key, &target.legacy_keys());

        debug!(channel = %key, last_id, limit, "sync: fetching");
        let messages = source.fetch_newer(&channel, last_id, limit).await?;

        let new_last_id = advance(last_id, &messages);
        debug!(channel = %key, new_last_id, fetched = messages.len(), "sync: advancing");
        if new_last_id > last_id {
            state.insert(key.clone(), new_last_id);
            changed = true;
        }

        if changed {
            self.store.save(&state)?;
            info!(channel = %key, from = last_id, to = new_last_id, "checkpoint saved");
        }

        let records = messages
            .iter()
            .filter_map(MessageRecord::from_message)
            .collect();

        Ok(SyncOutcome {
            channel_key: key,
            last_seen_id: new_last_id,
            persisted: changed,
            records,
        })
    }
}

/// Highest id among `messages`, never below `last_id`.
///
/// Every fetched message counts, reportable or not.
pub fn advance(last_id: u64, messages: &[FetchedMessage]) -> u64 {
    messages
        .iter()
        .map(|m| m.id.as_checkpoint())
        .fold(last_id, u64::max)
}
