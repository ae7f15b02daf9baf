use std::io::IsTerminal;

use tracing_subscriber::{fmt, EnvFilter};

use crate::Result;

/// Initialize logging/tracing for the bridge.
///
/// Everything goes to stderr: stdout carries exactly one JSON document.
pub fn init(service_name: &str) -> Result<()> {
    // Default: warn for dependencies, info for our crates.
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,tgb_core=info,tgb_telegram=info,{service_name}=info"
        ))
    });

    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    Ok(())
}
