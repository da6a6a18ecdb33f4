pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const GENESIS_DATA: &str = "Genesis";
pub const GENESIS_DIFFICULTY: u32 = 2;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const HASH_RATE_SAMPLES: u32 = 2_000_000;
pub const HASH_RATE_INPUT: &str = "00000000";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
/// Default ceiling for caller-supplied difficulty; keeps one mining run in the
/// seconds range (16^6 expected attempts).
pub const DEFAULT_MAX_DIFFICULTY: u32 = 6;
/// Nonces per rayon batch in the parallel search.
pub const PARALLEL_WINDOW: u64 = 1 << 16;
