use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("chain has no genesis block")]
    EmptyChain,

    #[error("block index {index} out of range for chain of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid difficulty {0}: must be between 0 and 64 hex digits")]
    InvalidDifficulty(i64),

    #[error("render error: {0}")]
    Render(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChainError>;
