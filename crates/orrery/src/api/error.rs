use thiserror::Error;

/// Everything the core can reject. All variants are caller contract
/// violations caught at construction or command time; nothing here is
/// raised from inside a tick.
#[derive(Debug, Error)]
pub enum OrreryError {
    #[error("invalid speed multiplier {0}: must be finite and >= 0")]
    InvalidSpeed(f64),

    #[error("unknown body id {0}")]
    UnknownBody(u32),

    #[error("unknown body name \"{0}\"")]
    UnknownBodyName(String),

    #[error("invalid body {name}: {reason}")]
    InvalidBody { name: String, reason: String },

    #[error("invalid {belt} belt config: {reason}")]
    InvalidBelt { belt: &'static str, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown locale \"{0}\"")]
    UnknownLocale(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type OrreryResult<T> = Result<T, OrreryError>;
