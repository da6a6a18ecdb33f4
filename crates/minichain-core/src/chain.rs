use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::block::Block;
use crate::constants::HASH_RATE_SAMPLES;
use crate::error::{ChainError, Result};
use crate::pow::{measure_hash_rate, meets_difficulty, NonceSearch, SequentialSearch};
use crate::snapshot::{BlockSnapshot, ChainSnapshot};

/// Knobs for building a [`Chain`].
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Iterations of the hash-rate measurement run at construction; 0 skips it.
    pub hash_rate_samples: u32,
    /// Nonce search used for the genesis block, appends and repairs.
    pub miner: Arc<dyn NonceSearch>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            hash_rate_samples: HASH_RATE_SAMPLES,
            miner: Arc::new(SequentialSearch),
        }
    }
}

/// Why [`Chain::first_invalid`] rejected a chain. `index` is the position of
/// the offending block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationFailure {
    /// `previous_hash` no longer matches the predecessor's hash.
    BrokenLink { index: usize },
    /// The block's hash lacks the leading zeros its difficulty demands.
    Unmined { index: usize },
}

/// In-memory hash-linked ledger. Always holds a mined genesis block.
#[derive(Debug)]
pub struct Chain {
    blocks: Vec<Block>,
    chain_hash: String,
    hash_rate: u64,
    miner: Arc<dyn NonceSearch>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    /// Measure the hash rate, then mine and append the genesis block.
    pub fn with_config(config: ChainConfig) -> Self {
        let hash_rate = measure_hash_rate(config.hash_rate_samples);
        let mut genesis = Block::genesis(Utc::now());
        genesis.mine_with(config.miner.as_ref());
        let chain_hash = genesis.calculate_hash();
        info!("Mined genesis block with nonce {} and hash {chain_hash}", genesis.nonce());
        Self {
            blocks: vec![genesis],
            chain_hash,
            hash_rate,
            miner: config.miner,
        }
    }

    /// Link `block` to the current tip, mine it and push it.
    pub fn append(&mut self, mut block: Block) -> Result<()> {
        if self.blocks.is_empty() {
            warn!("append refused: the chain has no genesis block");
            return Err(ChainError::EmptyChain);
        }
        block.set_previous_hash(self.chain_hash.clone());
        block.mine_with(self.miner.as_ref());
        self.chain_hash = block.calculate_hash();
        info!(
            "Mined block {} with nonce {} and hash {}",
            block.index(),
            block.nonce(),
            self.chain_hash
        );
        self.blocks.push(block);
        Ok(())
    }

    /// First block (from index 1 on) that breaks the link or proof-of-work
    /// rule. Genesis itself is never re-checked.
    pub fn first_invalid(&self) -> Option<ValidationFailure> {
        self.blocks
            .windows(2)
            .enumerate()
            .find_map(|(i, pair)| {
                let (previous, current) = (&pair[0], &pair[1]);
                let index = i + 1;
                if current.previous_hash() != previous.calculate_hash() {
                    return Some(ValidationFailure::BrokenLink { index });
                }
                if !meets_difficulty(&current.calculate_hash(), current.difficulty()) {
                    return Some(ValidationFailure::Unmined { index });
                }
                None
            })
            .inspect(|failure| debug!("chain invalid: {failure:?}"))
    }

    pub fn is_valid(&self) -> bool {
        self.first_invalid().is_none()
    }

    /// Relink and re-mine every block after genesis, left to right, so one
    /// pass heals any number of corrupted blocks.
    pub fn repair(&mut self) {
        let mut remined = 0usize;
        for i in 1..self.blocks.len() {
            let previous_hash = self.blocks[i - 1].calculate_hash();
            let block = &mut self.blocks[i];
            let nonce = block.nonce();
            block.set_previous_hash(previous_hash);
            block.mine_with(self.miner.as_ref());
            if block.nonce() != nonce {
                remined += 1;
            }
        }
        if let Some(last) = self.blocks.last() {
            self.chain_hash = last.calculate_hash();
        }
        info!("Repaired chain of {} blocks ({remined} re-mined)", self.blocks.len());
    }

    /// Overwrite a block's payload without re-mining it.
    pub fn tamper_data(&mut self, index: usize, data: impl Into<String>) -> Result<()> {
        let len = self.blocks.len();
        let block = self
            .blocks
            .get_mut(index)
            .ok_or(ChainError::IndexOutOfRange { index, len })?;
        block.set_data(data);
        warn!("Block {index} data overwritten without re-mining");
        Ok(())
    }

    pub fn total_difficulty(&self) -> u64 {
        self.blocks.iter().map(|b| u64::from(b.difficulty())).sum()
    }

    /// Σ 2^difficulty: expected hash attempts to mine every block.
    pub fn total_expected_hashes(&self) -> f64 {
        self.blocks
            .iter()
            .map(|b| 2f64.powi(b.difficulty() as i32))
            .sum()
    }

    pub fn hash_rate(&self) -> u64 {
        self.hash_rate
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            blocks: self.blocks.iter().map(BlockSnapshot::from).collect(),
            chain_hash: self.chain_hash.clone(),
        }
    }

    /// JSON snapshot of every block plus the chain hash.
    pub fn render(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn block(&self, index: usize) -> Result<&Block> {
        self.blocks.get(index).ok_or(ChainError::IndexOutOfRange {
            index,
            len: self.blocks.len(),
        })
    }

    pub fn latest_block(&self) -> Result<&Block> {
        self.blocks.last().ok_or(ChainError::EmptyChain)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn chain_hash(&self) -> &str {
        &self.chain_hash
    }
}
