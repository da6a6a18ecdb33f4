//! Line-oriented JSON request/response protocol for a single shared chain.
pub mod error;
pub mod handler;
pub mod message;

pub use error::{ProtocolError, Result};
pub use handler::Handler;
pub use message::{Action, Corruption, Request, Response};
