use chrono::Utc;
use minichain_core::{Block, Chain, ChainConfig};

pub fn quick_chain() -> Chain {
    // Skip most of the hash-rate measurement; it only feeds diagnostics.
    Chain::with_config(ChainConfig {
        hash_rate_samples: 1_000,
        ..ChainConfig::default()
    })
}

pub fn append_tx(chain: &mut Chain, data: &str, difficulty: i64) {
    let block = Block::new(chain.len() as u64, Utc::now(), data, difficulty)
        .expect("difficulty within range");
    chain.append(block).expect("chain has genesis");
}

pub fn chain_with(difficulties: &[i64]) -> Chain {
    let mut chain = quick_chain();
    for (i, difficulty) in difficulties.iter().enumerate() {
        append_tx(&mut chain, &format!("tx-{i}"), *difficulty);
    }
    chain
}

pub fn hashes(chain: &Chain) -> Vec<String> {
    chain.blocks().iter().map(Block::calculate_hash).collect()
}
