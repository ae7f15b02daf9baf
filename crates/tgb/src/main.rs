use std::{io::Write, process::ExitCode, sync::Arc};

use clap::Parser;
use tracing::{error, info};

use tgb_core::{
    checkpoint::JsonFileStore, commands::Bridge, config::Config, output, Result,
};
use tgb_telegram::TelegramSource;

mod cli;

use cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = tgb_core::logging::init("tgb") {
        eprintln!("logging setup failed: {e}");
    }

    // Errors are reported in the JSON document; the exit code stays 0.
    let value = match run(args).await {
        Ok(v) => v,
        Err(e) => {
            error!(kind = e.kind(), "{e}");
            output::error_value(&e)
        }
    };

    let mut stdout = std::io::stdout().lock();
    if writeln!(stdout, "{}", output::render(&value)).is_err() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(args: Args) -> Result<serde_json::Value> {
    let request = args.command.into_request()?;

    let mut cfg = Config::load()?;
    if let Some(path) = args.state_file {
        cfg.state_file = path;
    }
    if let Some(path) = args.session_file {
        cfg.session_file = path;
    }

    let source = Arc::new(TelegramSource::connect(&cfg).await?);
    let store = Arc::new(JsonFileStore::new(&cfg.state_file));
    let bridge = Bridge::new(source.clone(), store);

    info!(command = request.name(), "running");
    let result = bridge.execute(request).await;

    if let Err(e) = source.save_session(&cfg.session_file) {
        error!("{e}");
    }
    result
}
