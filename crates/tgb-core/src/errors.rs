/// Core error type for the bridge.
///
/// Adapter crates map SDK failures into one of these variants so the CLI can
/// report every failure with the same `{"error", "kind"}` shape.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Resolution(String),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Auth(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable tag surfaced next to the message in error documents.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::Resolution(_) => "resolution_failure",
            Error::Transport(_) => "transport_failure",
            Error::Auth(_) => "auth_failure",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
