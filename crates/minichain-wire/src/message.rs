use std::fmt;
use std::str::FromStr;

use minichain_core::Chain;
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Operations a client can ask of the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    ViewBlockchainStatus,
    AddTransaction,
    VerifyBlockchain,
    ViewBlockchain,
    CorruptBlockchain,
    RepairBlockchain,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::ViewBlockchainStatus,
        Action::AddTransaction,
        Action::VerifyBlockchain,
        Action::ViewBlockchain,
        Action::CorruptBlockchain,
        Action::RepairBlockchain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::ViewBlockchainStatus => "viewBlockchainStatus",
            Action::AddTransaction => "addTransaction",
            Action::VerifyBlockchain => "verifyBlockchain",
            Action::ViewBlockchain => "viewBlockchain",
            Action::CorruptBlockchain => "corruptBlockchain",
            Action::RepairBlockchain => "repairBlockchain",
        }
    }

    /// Actions whose responses carry the chain statistics.
    pub fn reports_stats(self) -> bool {
        matches!(
            self,
            Action::ViewBlockchainStatus
                | Action::AddTransaction
                | Action::VerifyBlockchain
                | Action::RepairBlockchain
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownAction(s.to_string()))
    }
}

/// One request line. Absent `data`/`difficulty` read as `""`/`0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub action: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub difficulty: i64,
}

impl Request {
    pub fn new(action: Action, data: impl Into<String>, difficulty: i64) -> Self {
        Self {
            action: action.as_str().to_string(),
            data: data.into(),
            difficulty,
        }
    }

    pub fn decode(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One response line. Stat fields stay at their defaults unless the action
/// reports them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Response {
    pub success: bool,
    pub message: String,
    pub action: String,
    pub blockchain_data: Option<String>,
    pub chain_size: u64,
    pub latest_block_difficulty: u32,
    pub total_difficulty: u64,
    pub hashes_per_second: u64,
    pub total_expected_hashes: f64,
    pub latest_block_nonce: String,
    pub chain_hash: String,
}

impl Response {
    pub fn success(action: impl fmt::Display, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            action: action.to_string(),
            ..Self::default()
        }
    }

    pub fn failure(action: impl fmt::Display, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            action: action.to_string(),
            ..Self::default()
        }
    }

    pub fn with_blockchain_data(mut self, data: String) -> Self {
        self.blockchain_data = Some(data);
        self
    }

    /// Fill the status fields from `chain`.
    pub fn with_stats(mut self, chain: &Chain) -> Self {
        self.chain_size = chain.len() as u64;
        if let Ok(latest) = chain.latest_block() {
            self.latest_block_difficulty = latest.difficulty();
            self.latest_block_nonce = latest.nonce().to_string();
        }
        self.total_difficulty = chain.total_difficulty();
        self.hashes_per_second = chain.hash_rate();
        self.total_expected_hashes = chain.total_expected_hashes();
        self.chain_hash = chain.chain_hash().to_string();
        self
    }

    pub fn decode(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Payload of a `corruptBlockchain` request: `"<blockId>:<newData>"`.
/// Everything after the first `:` is the new data, colons included. The id is
/// signed so a negative one is reported as out of range, not as malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corruption {
    pub index: i64,
    pub data: String,
}

impl Corruption {
    pub fn new(index: i64, data: impl Into<String>) -> Self {
        Self {
            index,
            data: data.into(),
        }
    }

    pub fn to_payload(&self) -> String {
        format!("{}:{}", self.index, self.data)
    }
}

impl FromStr for Corruption {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let (id, data) = s.split_once(':').ok_or_else(|| {
            ProtocolError::MalformedCorruptionRequest(format!(
                "expected <blockId>:<newData>, got {s:?}"
            ))
        })?;
        let index = id.trim().parse::<i64>().map_err(|e| {
            ProtocolError::MalformedCorruptionRequest(format!("bad block id {id:?}: {e}"))
        })?;
        Ok(Self::new(index, data))
    }
}
