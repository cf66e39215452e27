//! Synthetic address spaces for tests

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::memory::ReadMemory;

/// Mapping granularity of the mock address space
pub const MOCK_PAGE_SIZE: u64 = 0x100;

/// Sparse memory mapped in [`MOCK_PAGE_SIZE`] pages.
///
/// Writing any byte maps its whole page; unwritten bytes of a mapped page
/// read as zero. Reads touching an unmapped page fail.
#[derive(Debug, Default)]
pub struct MockMemoryReader {
    bytes: BTreeMap<u64, u8>,
    pages: BTreeSet<u64>,
    base_address: u64,
    reads: AtomicUsize,
}

impl MockMemoryReader {
    /// Number of `read_bytes` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Overwrite memory after construction, as a live process would
    pub fn poke(&mut self, address: u64, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            let at = address + i as u64;
            self.pages.insert(at / MOCK_PAGE_SIZE);
            self.bytes.insert(at, *byte);
        }
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        (0..size as u64)
            .map(|i| {
                let at = address + i;
                if !self.pages.contains(&(at / MOCK_PAGE_SIZE)) {
                    return Err(Error::read_failed(at, "unmapped"));
                }
                Ok(self.bytes.get(&at).copied().unwrap_or(0))
            })
            .collect()
    }

    fn base_address(&self) -> u64 {
        self.base_address
    }
}

/// Builder for [`MockMemoryReader`]
#[derive(Debug, Default)]
pub struct MockMemoryBuilder {
    reader: MockMemoryReader,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_address(mut self, base: u64) -> Self {
        self.reader.base_address = base;
        self
    }

    pub fn write_bytes(mut self, address: u64, data: &[u8]) -> Self {
        self.reader.poke(address, data);
        self
    }

    pub fn write_u8(self, address: u64, value: u8) -> Self {
        self.write_bytes(address, &[value])
    }

    pub fn write_u16(self, address: u64, value: u16) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_i32(self, address: u64, value: i32) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_u32(self, address: u64, value: u32) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_u64(self, address: u64, value: u64) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_f32(self, address: u64, value: f32) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    /// Write `value` followed by a NUL terminator
    pub fn write_cstring(self, address: u64, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        self.write_bytes(address, &data)
    }

    pub fn build(self) -> MockMemoryReader {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_into_unmapped_page_fails_whole_read() {
        let reader = MockMemoryBuilder::new().write_bytes(0xFC, &[1, 2, 3]).build();

        assert_eq!(reader.read_bytes(0xFC, 4).unwrap(), vec![1, 2, 3, 0]);
        let err = reader.read_bytes(0xFC, 5).unwrap_err();
        assert!(matches!(err, Error::MemoryReadFailed { address: 0x100, .. }));
    }

    #[test]
    fn test_poke_overwrites() {
        let mut reader = MockMemoryBuilder::new().write_u32(0x40, 1).build();
        reader.poke(0x40, &2u32.to_le_bytes());
        assert_eq!(reader.read_u32(0x40).unwrap(), 2);
        assert_eq!(reader.read_count(), 1);
    }
}
