//! Constants shared across pool scanning and export

/// Bytes between entries of the asset pool table
pub const POOL_ENTRY_STRIDE: u64 = 0x20;

/// Upper bound accepted for a pool's slot count
pub const MAX_POOL_SLOTS: u32 = 0x10_0000;

/// Upper bound accepted for a pool's per-slot size
pub const MAX_ASSET_SIZE: u32 = 0x1_0000;

/// Upper bound for any single block copied out of the game (64MB)
pub const MAX_BLOCK_SIZE: usize = 64 * 1024 * 1024;
