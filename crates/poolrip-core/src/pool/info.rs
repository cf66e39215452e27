use tracing::debug;

use crate::config::limits::{MAX_ASSET_SIZE, MAX_POOL_SLOTS};
use crate::error::{Error, Result};
use crate::memory::ReadMemory;

/// Location and shape of one asset pool.
///
/// The end address is always derived from start, size and count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolInfo {
    start_address: u64,
    asset_size: u32,
    asset_count: u32,
}

impl PoolInfo {
    /// Pool table entry layout: pool pointer @0, asset size @8, pool size @12
    pub const POINTER_OFFSET: u64 = 0;
    pub const ASSET_SIZE_OFFSET: u64 = 8;
    pub const POOL_SIZE_OFFSET: u64 = 12;

    pub fn new(start_address: u64, asset_size: u32, asset_count: u32) -> Self {
        Self {
            start_address,
            asset_size,
            asset_count,
        }
    }

    /// Read a pool descriptor from the pool table
    pub fn read<R: ReadMemory>(reader: &R, entry_address: u64) -> Result<Self> {
        let start_address = reader.read_u64(entry_address + Self::POINTER_OFFSET)?;
        let asset_size = reader.read_u32(entry_address + Self::ASSET_SIZE_OFFSET)?;
        let asset_count = reader.read_u32(entry_address + Self::POOL_SIZE_OFFSET)?;

        if start_address == 0 {
            return Err(Error::DecodeInconsistency(format!(
                "pool entry at 0x{entry_address:X} has a null pool pointer"
            )));
        }
        if !(1..=MAX_ASSET_SIZE).contains(&asset_size) {
            return Err(Error::DecodeInconsistency(format!(
                "pool entry at 0x{entry_address:X} has asset size {asset_size}"
            )));
        }
        if !(1..=MAX_POOL_SLOTS).contains(&asset_count) {
            return Err(Error::DecodeInconsistency(format!(
                "pool entry at 0x{entry_address:X} has {asset_count} slots"
            )));
        }

        let info = Self::new(start_address, asset_size, asset_count);
        debug!(
            "Pool at 0x{:X}: {} slots of {} bytes (end 0x{:X})",
            info.start_address,
            info.asset_count,
            info.asset_size,
            info.end_address()
        );
        Ok(info)
    }

    pub fn start_address(&self) -> u64 {
        self.start_address
    }

    pub fn asset_size(&self) -> u32 {
        self.asset_size
    }

    pub fn asset_count(&self) -> u32 {
        self.asset_count
    }

    pub fn end_address(&self) -> u64 {
        self.start_address + u64::from(self.asset_count) * u64::from(self.asset_size)
    }

    /// Address of the header stored in slot `index`
    pub fn slot_address(&self, index: u32) -> u64 {
        self.start_address + u64::from(index) * u64::from(self.asset_size)
    }

    /// A name pointer that is zero or points back into the pool marks a free slot
    pub fn is_null_address(&self, name_address: u64) -> bool {
        name_address == 0 || (self.start_address..=self.end_address()).contains(&name_address)
    }
}
