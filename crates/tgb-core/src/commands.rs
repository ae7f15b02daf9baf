//! Command handlers: `list`, `history`, `sync`, `download`.
//!
//! Requests are validated before any platform connection is made, so bad
//! input is reported without a network round trip.

use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{
    channel::ChannelTarget,
    checkpoint::CheckpointStore,
    domain::MessageId,
    errors::Error,
    media::classify,
    messaging::port::MessageSource,
    output::{ChannelSummary, DownloadReport, MessageRecord},
    sync::SyncOrchestrator,
    utils::{parse_iso_timestamp, sanitize_filename},
    Result,
};

pub const DEFAULT_LIMIT: usize = 50;

/// A validated command invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    List,
    History {
        target: ChannelTarget,
        after: DateTime<Utc>,
        limit: usize,
    },
    Sync {
        target: ChannelTarget,
        limit: usize,
    },
    Download {
        target: ChannelTarget,
        message_id: MessageId,
        output_dir: PathBuf,
    },
}

impl Request {
    pub fn history(target: ChannelTarget, after: &str, limit: usize) -> Result<Self> {
        Ok(Self::History {
            target,
            after: parse_iso_timestamp(after)?,
            limit: check_limit(limit)?,
        })
    }

    pub fn sync(target: ChannelTarget, limit: usize) -> Result<Self> {
        Ok(Self::Sync {
            target,
            limit: check_limit(limit)?,
        })
    }

    pub fn download(target: ChannelTarget, message_id: i32, output_dir: PathBuf) -> Result<Self> {
        if message_id <= 0 {
            return Err(Error::InvalidInput(
                "message id must be a positive integer".to_string(),
            ));
        }
        Ok(Self::Download {
            target,
            message_id: MessageId(message_id),
            output_dir,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Request::List => "list",
            Request::History { .. } => "history",
            Request::Sync { .. } => "sync",
            Request::Download { .. } => "download",
        }
    }
}

fn check_limit(limit: usize) -> Result<usize> {
    if limit == 0 {
        return Err(Error::InvalidInput("limit must be at least 1".to_string()));
    }
    Ok(limit)
}

/// Runs requests against a message source and a checkpoint store.
pub struct Bridge {
    source: Arc<dyn MessageSource>,
    sync: SyncOrchestrator,
}

impl Bridge {
    pub fn new(source: Arc<dyn MessageSource>, store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            source,
            sync: SyncOrchestrator::new(store),
        }
    }

    /// Execute `req` and return the command's JSON result.
    pub async fn execute(&self, req: Request) -> Result<serde_json::Value> {
        match req {
            Request::List => to_json(self.list().await?),
            Request::History {
                target,
                after,
                limit,
            } => to_json(self.history(&target, after, limit).await?),
            Request::Sync { target, limit } => {
                let outcome = self.sync.sync(self.source.as_ref(), &target, limit).await?;
                info!(
                    channel = %outcome.channel_key,
                    delivered = outcome.records.len(),
                    last_seen_id = outcome.last_seen_id,
                    "sync finished"
                );
                to_json(outcome.records)
            }
            Request::Download {
                target,
                message_id,
                output_dir,
            } => to_json(self.download(&target, message_id, output_dir).await?),
        }
    }

    pub async fn list(&self) -> Result<Vec<ChannelSummary>> {
        let channels = self.source.list_channels().await?;
        Ok(channels
            .iter()
            .filter(|ch| ch.peer.kind.is_channel_like())
            .map(ChannelSummary::from)
            .collect())
    }

    pub async fn history(
        &self,
        target: &ChannelTarget,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<MessageRecord>> {
        let channel = self.source.resolve(target.reference()).await?;
        let messages = self.source.fetch_history(&channel, after, limit).await?;
        Ok(messages
            .iter()
            .filter_map(MessageRecord::from_message)
            .collect())
    }

    pub async fn download(
        &self,
        target: &ChannelTarget,
        message_id: MessageId,
        output_dir: PathBuf,
    ) -> Result<DownloadReport> {
        let channel = self.source.resolve(target.reference()).await?;
        let message = self
            .source
            .fetch_message(&channel, message_id)
            .await?
            .ok_or_else(|| Error::Resolution(format!("message {} not found", message_id.0)))?;
        let media = classify(&message).ok_or_else(|| {
            Error::InvalidInput(format!("message {} has no media", message_id.0))
        })?;

        tokio::fs::create_dir_all(&output_dir).await?;
        let dest = output_dir.join(sanitize_filename(&media.file_name));
        self.source
            .download_media(&channel, message_id, &dest)
            .await?;

        let size = tokio::fs::metadata(&dest).await?.len();
        let file_path = tokio::fs::canonicalize(&dest).await?;
        info!(
            message_id = message_id.0,
            path = %file_path.display(),
            size,
            "media downloaded"
        );

        Ok(DownloadReport::new(
            &channel,
            message_id.0,
            file_path.to_string_lossy().to_string(),
            media.media_type,
            size,
        ))
    }
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}
