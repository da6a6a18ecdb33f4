use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::constants::{
    GENESIS_DATA, GENESIS_DIFFICULTY, GENESIS_PREVIOUS_HASH, HASH_HEX_SIZE, HASH_SIZE,
    TIMESTAMP_FORMAT,
};
use crate::error::{ChainError, Result};
use crate::pow::{NonceSearch, SequentialSearch};

/// One ledger entry.
///
/// The hash is never stored on the block: every caller recomputes it with
/// [`Block::calculate_hash`] after touching any field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    index: u64,
    timestamp: DateTime<Utc>,
    data: String,
    previous_hash: String,
    nonce: u64,
    difficulty: u32,
}

impl Block {
    /// Create an unlinked, unmined block. `previous_hash` starts empty and the
    /// nonce starts at zero.
    pub fn new(
        index: u64,
        timestamp: DateTime<Utc>,
        data: impl Into<String>,
        difficulty: i64,
    ) -> Result<Self> {
        Ok(Self {
            index,
            timestamp,
            data: data.into(),
            previous_hash: String::new(),
            nonce: 0,
            difficulty: check_difficulty(difficulty)?,
        })
    }

    /// The fixed first block of every chain, linked to the `"0"` sentinel.
    pub(crate) fn genesis(timestamp: DateTime<Utc>) -> Self {
        Self {
            index: 0,
            timestamp,
            data: GENESIS_DATA.to_string(),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            nonce: 0,
            difficulty: GENESIS_DIFFICULTY,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Timestamp as it enters the hash preimage and the snapshot text.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    pub fn set_previous_hash(&mut self, previous_hash: impl Into<String>) {
        self.previous_hash = previous_hash.into();
    }

    pub fn set_difficulty(&mut self, difficulty: i64) -> Result<()> {
        self.difficulty = check_difficulty(difficulty)?;
        Ok(())
    }

    /// SHA-256 over `index ‖ timestamp ‖ data ‖ previous_hash ‖ nonce ‖ difficulty`
    /// (all as text), rendered as lowercase hex.
    pub fn calculate_hash(&self) -> String {
        self.hash_with_nonce(self.nonce)
    }

    /// Hash this block as if its nonce were `nonce`.
    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        self.nonce_hasher().hex(nonce)
    }

    /// Hasher with every field except the nonce already absorbed, so a search
    /// can try candidates without re-encoding the rest of the block.
    pub fn nonce_hasher(&self) -> NonceHasher {
        let mut prefix = Sha256::new();
        prefix.update(self.index.to_string());
        prefix.update(self.timestamp_text());
        prefix.update(&self.data);
        prefix.update(&self.previous_hash);
        NonceHasher {
            prefix,
            difficulty: self.difficulty.to_string(),
        }
    }

    /// Proof-of-work with the plain incrementing search.
    ///
    /// Blocks until a nonce is found; there is no iteration cap.
    pub fn mine(&mut self) {
        self.mine_with(&SequentialSearch);
    }

    pub fn mine_with(&mut self, search: &dyn NonceSearch) {
        self.nonce = search.find_nonce(self);
    }
}

/// Precomputed hash state for one block; see [`Block::nonce_hasher`].
#[derive(Clone, Debug)]
pub struct NonceHasher {
    prefix: Sha256,
    difficulty: String,
}

impl NonceHasher {
    /// Raw digest for `nonce`.
    pub fn digest(&self, nonce: u64) -> [u8; HASH_SIZE] {
        let mut buf = [0u8; 20];
        let mut hasher = self.prefix.clone();
        hasher.update(decimal(nonce, &mut buf));
        hasher.update(&self.difficulty);
        let mut out = [0u8; HASH_SIZE];
        out.copy_from_slice(&hasher.finalize()[..]);
        out
    }

    pub fn hex(&self, nonce: u64) -> String {
        hex::encode(self.digest(nonce))
    }
}

/// ASCII decimal digits of `n`, written into the tail of `buf`.
fn decimal(mut n: u64, buf: &mut [u8; 20]) -> &[u8] {
    let mut start = buf.len();
    loop {
        start -= 1;
        buf[start] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[start..]
}

fn check_difficulty(difficulty: i64) -> Result<u32> {
    match u32::try_from(difficulty) {
        Ok(d) if d as usize <= HASH_HEX_SIZE => Ok(d),
        _ => Err(ChainError::InvalidDifficulty(difficulty)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pow::meets_difficulty;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_600_000_000_123).unwrap()
    }

    #[test]
    fn new_block_starts_unlinked_and_unmined() {
        let block = Block::new(3, fixed_time(), "Alice pays Bob 10", 2).unwrap();
        assert_eq!(block.index(), 3);
        assert_eq!(block.nonce(), 0);
        assert_eq!(block.previous_hash(), "");
        assert_eq!(block.difficulty(), 2);
        assert_eq!(block.data(), "Alice pays Bob 10");
    }

    #[test]
    fn timestamp_text_keeps_milliseconds() {
        let block = Block::new(0, fixed_time(), "x", 0).unwrap();
        assert_eq!(block.timestamp_text(), "2020-09-13 12:26:40.123");
    }

    #[test]
    fn hash_matches_concatenated_preimage() {
        let mut block = Block::new(1, fixed_time(), "hello", 3).unwrap();
        block.set_previous_hash("abc");
        let preimage = "12020-09-13 12:26:40.123helloabc03";
        let expected = hex::encode(Sha256::digest(preimage.as_bytes()));
        assert_eq!(block.calculate_hash(), expected);
    }

    #[test]
    fn hash_is_lowercase_hex_of_full_width() {
        let block = Block::new(1, fixed_time(), "hello", 1).unwrap();
        let hash = block.calculate_hash();
        assert_eq!(hash.len(), HASH_HEX_SIZE);
        assert!(hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn hash_is_pure() {
        let block = Block::new(1, fixed_time(), "hello", 1).unwrap();
        assert_eq!(block.calculate_hash(), block.calculate_hash());
    }

    #[test]
    fn hash_changes_with_nonce() {
        let block = Block::new(1, fixed_time(), "hello", 1).unwrap();
        assert_ne!(block.hash_with_nonce(0), block.hash_with_nonce(1));
    }

    #[test]
    fn nonce_hasher_matches_full_preimage() {
        let mut block = Block::new(12, fixed_time(), "prefix reuse", 5).unwrap();
        block.set_previous_hash("00beef");
        let hasher = block.nonce_hasher();
        for nonce in [0, 7, 10, 99, 1_000_000, u64::MAX] {
            let preimage = format!("122020-09-13 12:26:40.123prefix reuse00beef{nonce}5");
            let expected = hex::encode(Sha256::digest(preimage.as_bytes()));
            assert_eq!(hasher.hex(nonce), expected, "nonce {nonce}");
        }
    }

    #[test]
    fn decimal_digits() {
        let mut buf = [0u8; 20];
        assert_eq!(decimal(0, &mut buf), b"0");
        assert_eq!(decimal(42, &mut buf), b"42");
        assert_eq!(decimal(u64::MAX, &mut buf), u64::MAX.to_string().as_bytes());
    }

    #[test]
    fn hash_changes_with_data() {
        let mut block = Block::new(1, fixed_time(), "hello", 1).unwrap();
        let before = block.calculate_hash();
        block.set_data("goodbye");
        assert_ne!(before, block.calculate_hash());
    }

    #[test]
    fn mine_satisfies_difficulty() {
        let mut block = Block::new(1, fixed_time(), "mine me", 3).unwrap();
        block.set_previous_hash("00ff");
        block.mine();
        assert!(block.calculate_hash().starts_with("000"));
        assert!(meets_difficulty(&block.calculate_hash(), 3));
    }

    #[test]
    fn mine_leaves_other_fields_alone() {
        let mut block = Block::new(4, fixed_time(), "payload", 2).unwrap();
        block.set_previous_hash("prev");
        let before = block.clone();
        block.mine();
        assert_eq!(block.index(), before.index());
        assert_eq!(block.timestamp(), before.timestamp());
        assert_eq!(block.data(), before.data());
        assert_eq!(block.previous_hash(), before.previous_hash());
        assert_eq!(block.difficulty(), before.difficulty());
    }

    #[test]
    fn mine_with_zero_difficulty_keeps_nonce() {
        let mut block = Block::new(1, fixed_time(), "free", 0).unwrap();
        block.mine();
        assert_eq!(block.nonce(), 0);
    }

    #[test]
    fn mining_twice_is_stable() {
        let mut block = Block::new(1, fixed_time(), "stable", 2).unwrap();
        block.mine();
        let nonce = block.nonce();
        block.mine();
        assert_eq!(block.nonce(), nonce);
    }

    #[test]
    fn difficulty_bounds_are_enforced() {
        assert!(Block::new(1, fixed_time(), "x", 64).is_ok());
        assert!(matches!(
            Block::new(1, fixed_time(), "x", 65),
            Err(ChainError::InvalidDifficulty(65))
        ));
        assert!(matches!(
            Block::new(1, fixed_time(), "x", -1),
            Err(ChainError::InvalidDifficulty(-1))
        ));

        let mut block = Block::new(1, fixed_time(), "x", 1).unwrap();
        assert!(block.set_difficulty(99).is_err());
        assert_eq!(block.difficulty(), 1);
        block.set_difficulty(5).unwrap();
        assert_eq!(block.difficulty(), 5);
    }

    #[test]
    fn genesis_block_example() {
        let genesis = Block::genesis(fixed_time());
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.previous_hash(), "0");
        assert_eq!(genesis.data(), "Genesis");
        assert_eq!(genesis.difficulty(), 2);
        assert_eq!(genesis.nonce(), 0);
    }
}
