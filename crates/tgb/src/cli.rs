use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tgb_core::{
    channel::ChannelTarget,
    commands::{Request, DEFAULT_LIMIT},
    Result,
};

/// AI Telegram Bridge: read channel messages and media as JSON.
#[derive(Parser, Debug)]
#[command(name = "tgb", version)]
pub struct Args {
    /// Checkpoint file (overrides TG_STATE_FILE)
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Client session file (overrides TG_SESSION_FILE)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available channels
    List,

    /// Get messages from a specific date
    History {
        #[command(flatten)]
        channel: ChannelArgs,

        /// ISO format date (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        after: String,

        /// Max messages to retrieve
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Get new messages since last checkpoint
    Sync {
        #[command(flatten)]
        channel: ChannelArgs,

        /// Max messages to retrieve
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Download the media attached to one message
    Download {
        #[command(flatten)]
        channel: ChannelArgs,

        #[arg(long = "message_id", alias = "message-id")]
        message_id: i32,

        /// Directory to save into (created if absent)
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ChannelArgs {
    /// Channel username or name
    #[arg(long)]
    pub channel: Option<String>,

    /// Numeric channel ID (with or without leading '-')
    #[arg(long = "channel_id", alias = "channel-id", allow_hyphen_values = true)]
    pub channel_id: Option<String>,
}

impl ChannelArgs {
    fn target(self) -> Result<ChannelTarget> {
        ChannelTarget::from_args(self.channel, self.channel_id)
    }
}

impl Command {
    /// Validate arguments into a request; no network involved.
    pub fn into_request(self) -> Result<Request> {
        match self {
            Command::List => Ok(Request::List),
            Command::History {
                channel,
                after,
                limit,
            } => Request::history(channel.target()?, &after, limit),
            Command::Sync { channel, limit } => Request::sync(channel.target()?, limit),
            Command::Download {
                channel,
                message_id,
                output,
            } => Request::download(channel.target()?, message_id, output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgb_core::{channel::ChannelRef, errors::Error};

    fn parse(argv: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("tgb").chain(argv.iter().copied()))
    }

    #[test]
    fn sync_by_name_uses_default_limit() {
        let args = parse(&["sync", "--channel", "mychan"]).unwrap();
        match args.command.into_request().unwrap() {
            Request::Sync { target, limit } => {
                assert_eq!(target.reference(), &ChannelRef::Name("mychan".into()));
                assert_eq!(limit, 50);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn negative_channel_ids_are_accepted() {
        let args = parse(&["sync", "--channel_id", "-100123", "--limit", "5"]).unwrap();
        match args.command.into_request().unwrap() {
            Request::Sync { target, limit } => {
                assert_eq!(target.reference(), &ChannelRef::Id(-100123));
                assert_eq!(limit, 5);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn channel_and_channel_id_are_mutually_exclusive_and_required() {
        assert!(parse(&["sync", "--channel", "a", "--channel_id", "1"]).is_err());
        assert!(parse(&["sync"]).is_err());
    }

    #[test]
    fn bad_inputs_become_invalid_input_requests() {
        let args = parse(&["sync", "--channel_id", "abc"]).unwrap();
        assert!(matches!(
            args.command.into_request(),
            Err(Error::InvalidInput(_))
        ));

        let args = parse(&["history", "--channel", "c", "--after", "nope"]).unwrap();
        assert!(matches!(
            args.command.into_request(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn download_and_global_overrides() {
        let args = parse(&[
            "download",
            "--channel",
            "c",
            "--message_id",
            "42",
            "--output",
            "/tmp/out",
            "--state-file",
            "/tmp/state.json",
        ])
        .unwrap();
        assert_eq!(args.state_file, Some(PathBuf::from("/tmp/state.json")));
        let req = args.command.into_request().unwrap();
        assert_eq!(req.name(), "download");
    }

    #[test]
    fn history_requires_after() {
        assert!(parse(&["history", "--channel", "c"]).is_err());
        let args = parse(&["history", "--channel", "c", "--after", "2024-01-01T00:00:00"]).unwrap();
        assert_eq!(args.command.into_request().unwrap().name(), "history");
    }
}
