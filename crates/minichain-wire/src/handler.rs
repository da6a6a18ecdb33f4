use chrono::Utc;
use minichain_core::{constants::DEFAULT_MAX_DIFFICULTY, Block, Chain, ChainError};
use tracing::{info, warn};

use crate::error::{ProtocolError, Result};
use crate::message::{Action, Corruption, Request, Response};

/// Turns requests into chain operations. Every failure comes back as a
/// `success = false` response; nothing here can take the caller down.
#[derive(Clone, Copy, Debug)]
pub struct Handler {
    max_difficulty: u32,
}

impl Default for Handler {
    fn default() -> Self {
        Self {
            max_difficulty: DEFAULT_MAX_DIFFICULTY,
        }
    }
}

impl Handler {
    /// `max_difficulty` caps `addTransaction` so mining stays practically bounded.
    pub fn new(max_difficulty: u32) -> Self {
        Self { max_difficulty }
    }

    pub fn max_difficulty(&self) -> u32 {
        self.max_difficulty
    }

    /// Decode one request line and run it.
    pub fn handle_line(&self, chain: &mut Chain, line: &str) -> Response {
        info!("Received Request: {line}");
        match Request::decode(line) {
            Ok(request) => self.handle(chain, &request),
            Err(e) => {
                warn!("undecodable request: {e}");
                Response::failure("", format!("Error processing request: {e}"))
            }
        }
    }

    pub fn handle(&self, chain: &mut Chain, request: &Request) -> Response {
        let action = match request.action.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                warn!("{e}");
                return Response::failure(&request.action, "Unknown action requested.");
            }
        };
        match self.execute(chain, action, request) {
            Ok(response) => response,
            Err(e) => {
                warn!("{action} failed: {e}");
                Response::failure(action, format!("Error processing request: {e}"))
            }
        }
    }

    fn execute(&self, chain: &mut Chain, action: Action, request: &Request) -> Result<Response> {
        let response = match action {
            Action::ViewBlockchainStatus => {
                Response::success(action, "Blockchain status viewed successfully.")
                    .with_blockchain_data(chain.render()?)
            }
            Action::AddTransaction => {
                self.add_transaction(chain, request)?;
                Response::success(action, "Transaction added successfully.")
            }
            Action::VerifyBlockchain => match chain.first_invalid() {
                None => Response::success(action, "Blockchain is valid."),
                Some(failure) => {
                    info!("verification failed: {failure:?}");
                    Response::failure(action, "Blockchain validation failed.")
                }
            },
            Action::ViewBlockchain => Response::success(action, "Viewing the Blockchain")
                .with_blockchain_data(chain.render()?),
            Action::CorruptBlockchain => corrupt(chain, &request.data)?,
            Action::RepairBlockchain => {
                chain.repair();
                Response::success(action, "Blockchain repaired successfully.")
            }
        };
        Ok(if action.reports_stats() {
            response.with_stats(chain)
        } else {
            response
        })
    }

    fn add_transaction(&self, chain: &mut Chain, request: &Request) -> Result<()> {
        if request.difficulty > i64::from(self.max_difficulty) {
            return Err(ProtocolError::DifficultyLimit {
                difficulty: request.difficulty,
                limit: self.max_difficulty,
            });
        }
        let block = Block::new(
            chain.len() as u64,
            Utc::now(),
            request.data.as_str(),
            request.difficulty,
        )?;
        chain.append(block)?;
        Ok(())
    }
}

fn corrupt(chain: &mut Chain, payload: &str) -> Result<Response> {
    let action = Action::CorruptBlockchain;
    let corruption = match payload.parse::<Corruption>() {
        Ok(corruption) => corruption,
        Err(e) => {
            warn!("{e}");
            return Ok(Response::failure(
                action,
                format!("Error processing request data for block corruption: {e}"),
            ));
        }
    };
    let Ok(index) = usize::try_from(corruption.index) else {
        warn!("corruption target {} is negative", corruption.index);
        return Ok(Response::failure(action, "Invalid block ID provided."));
    };
    match chain.tamper_data(index, corruption.data.as_str()) {
        Ok(()) => Ok(Response::success(
            action,
            format!(
                "Block {index} corrupted successfully with new data: {}",
                corruption.data
            ),
        )),
        Err(ChainError::IndexOutOfRange { index, len }) => {
            warn!("corruption target {index} outside chain of length {len}");
            Ok(Response::failure(action, "Invalid block ID provided."))
        }
        Err(e) => Err(e.into()),
    }
}
