//! Block and chain model for a single in-memory proof-of-work ledger.
pub mod block;
pub mod chain;
pub mod constants;
pub mod error;
pub mod pow;
pub mod snapshot;

pub use block::Block;
pub use chain::{Chain, ChainConfig, ValidationFailure};
pub use error::{ChainError, Result};
pub use snapshot::{BlockSnapshot, ChainSnapshot};
