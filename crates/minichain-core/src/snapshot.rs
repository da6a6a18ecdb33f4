use serde::{Deserialize, Serialize};

use crate::block::Block;

/// Textual view of a chain. The field names are part of the wire format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    #[serde(rename = "ds_chain")]
    pub blocks: Vec<BlockSnapshot>,
    #[serde(rename = "chainHash")]
    pub chain_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub index: u64,
    pub timestamp: String,
    pub data: String,
    #[serde(rename = "previousHash")]
    pub previous_hash: String,
    /// Decimal text, so readers are not limited to a 53-bit JSON number.
    pub nonce: String,
    pub difficulty: u32,
}

impl From<&Block> for BlockSnapshot {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index(),
            timestamp: block.timestamp_text(),
            data: block.data().to_string(),
            previous_hash: block.previous_hash().to_string(),
            nonce: block.nonce().to_string(),
            difficulty: block.difficulty(),
        }
    }
}

impl ChainSnapshot {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
