use std::fmt::Debug;
use std::hint::black_box;
use std::time::Instant;

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::block::Block;
use crate::constants::{HASH_RATE_INPUT, PARALLEL_WINDOW};

/// Strategy for the proof-of-work nonce search.
///
/// Implementations must return the first nonce at or after `block.nonce()`
/// (wrapping past `u64::MAX`) whose hash carries `block.difficulty()` leading
/// hex zeros. They never give up: an unsatisfiable target blocks forever, so
/// bound the difficulty rather than the search.
pub trait NonceSearch: Send + Sync + Debug {
    fn find_nonce(&self, block: &Block) -> u64;
}

/// Try one nonce after another on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialSearch;

impl NonceSearch for SequentialSearch {
    fn find_nonce(&self, block: &Block) -> u64 {
        let difficulty = block.difficulty() as usize;
        let hasher = block.nonce_hasher();
        let mut nonce = block.nonce();
        while leading_zero_nibbles(&hasher.digest(nonce)) < difficulty {
            nonce = nonce.wrapping_add(1);
        }
        nonce
    }
}

/// Search consecutive windows of `window` nonces, each split across rayon's
/// pool. `find_first` inside a window plus in-order windows keeps the result
/// identical to [`SequentialSearch`].
#[derive(Clone, Copy, Debug)]
pub struct ParallelSearch {
    window: u64,
}

impl Default for ParallelSearch {
    fn default() -> Self {
        Self::with_window(PARALLEL_WINDOW)
    }
}

impl ParallelSearch {
    pub fn with_window(window: u64) -> Self {
        Self {
            window: window.max(1),
        }
    }
}

impl NonceSearch for ParallelSearch {
    fn find_nonce(&self, block: &Block) -> u64 {
        let difficulty = block.difficulty() as usize;
        let hasher = block.nonce_hasher();
        let hit = |nonce: &u64| leading_zero_nibbles(&hasher.digest(*nonce)) >= difficulty;
        let mut base = block.nonce();
        loop {
            let end = base.saturating_add(self.window - 1);
            if let Some(nonce) = (base..=end).into_par_iter().find_first(hit) {
                return nonce;
            }
            base = end.wrapping_add(1);
        }
    }
}

/// Number of leading zero hex digits in a raw digest.
pub fn leading_zero_nibbles(digest: &[u8]) -> usize {
    let mut total = 0;
    for b in digest {
        if *b == 0 {
            total += 2;
        } else {
            if *b < 0x10 {
                total += 1;
            }
            break;
        }
    }
    total
}

/// Number of leading `'0'` characters in a hex digest.
pub fn leading_hex_zeros(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

/// True when the first `difficulty` characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    leading_hex_zeros(hash) >= difficulty as usize
}

/// Hash a short constant `samples` times and report hashes per second.
///
/// Returns 0 when nothing was measured (no samples, or a timer too coarse to
/// see the work).
pub fn measure_hash_rate(samples: u32) -> u64 {
    if samples == 0 {
        return 0;
    }
    let start = Instant::now();
    for _ in 0..samples {
        black_box(Sha256::digest(black_box(HASH_RATE_INPUT.as_bytes())));
    }
    let seconds = start.elapsed().as_secs_f64();
    if seconds <= 0.0 {
        warn!("hash rate measurement finished in zero time; reporting 0");
        return 0;
    }
    let rate = (f64::from(samples) / seconds) as u64;
    info!("Hashes per second: {rate}");
    rate
}
