use minichain_core::ChainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    #[error("{0}")]
    MalformedCorruptionRequest(String),

    #[error("difficulty {difficulty} exceeds this node's limit of {limit}")]
    DifficultyLimit { difficulty: i64, limit: u32 },

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
