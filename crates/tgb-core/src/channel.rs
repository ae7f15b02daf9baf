//! Channel identity: user-supplied references and canonical state keys.

use std::fmt;

use crate::{domain::Channel, errors::Error, Result};

/// How the user pointed at a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelRef {
    /// Display name or username, passed to the platform unresolved.
    Name(String),
    /// Sign-normalized numeric id.
    Id(i64),
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Name(name) => f.write_str(name),
            ChannelRef::Id(id) => write!(f, "{id}"),
        }
    }
}

/// A channel argument as typed on the command line, plus its parsed form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelTarget {
    raw: String,
    reference: ChannelRef,
}

impl ChannelTarget {
    /// `--channel <name>`.
    pub fn from_name(name: impl Into<String>) -> Self {
        let raw = name.into();
        Self {
            reference: ChannelRef::Name(raw.clone()),
            raw,
        }
    }

    /// `--channel_id <id>`; the id may be given with or without a leading `-`.
    pub fn from_id_arg(value: impl Into<String>) -> Result<Self> {
        let raw = value.into();
        let id = normalize_channel_id(&raw)?;
        Ok(Self {
            raw,
            reference: ChannelRef::Id(id),
        })
    }

    /// Build from the mutually exclusive `--channel` / `--channel_id` pair.
    pub fn from_args(channel: Option<String>, channel_id: Option<String>) -> Result<Self> {
        match (channel, channel_id) {
            (_, Some(id)) => Self::from_id_arg(id),
            (Some(name), None) => Ok(Self::from_name(name)),
            (None, None) => Err(Error::InvalidInput(
                "one of --channel or --channel_id is required".to_string(),
            )),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn reference(&self) -> &ChannelRef {
        &self.reference
    }

    /// State keys older revisions may have written for this channel.
    ///
    /// The raw input always comes first; the normalized id follows when it
    /// differs (e.g. `123` typed, `-123` stored).
    pub fn legacy_keys(&self) -> Vec<String> {
        let mut keys = vec![self.raw.clone()];
        let normalized = self.reference.to_string();
        if normalized != self.raw {
            keys.push(normalized);
        }
        keys
    }
}

/// Normalize a numeric channel id so it works with or without a leading `-`.
///
/// Channel and supergroup ids are negative on the platform; a positive value is
/// taken as the bare form and negated. Non-positive values pass through.
pub fn normalize_channel_id(value: &str) -> Result<i64> {
    let id = value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidInput("Channel ID must be a numeric value.".to_string()))?;
    if id > 0 {
        Ok(-id)
    } else {
        Ok(id)
    }
}

/// Canonical state key for a resolved entity: its marked peer id.
///
/// Stable across name/id inputs, so it is the only key ever written.
pub fn canonical_key(channel: &Channel) -> String {
    channel.peer.marked().to_string()
}
