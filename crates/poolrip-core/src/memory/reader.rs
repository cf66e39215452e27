//! Typed reads over a remote address space.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::memory::ProcessHandle;

/// Longest NUL-terminated string `read_cstring` will follow
pub const MAX_CSTRING_LEN: usize = 4096;

/// String reads never cross this alignment within one request, so a string
/// ending just before an unmapped page still reads cleanly.
const CSTRING_CHUNK: u64 = 256;

/// Fixed-size little-endian values that can be read in arrays
pub trait FromLeBytes: Sized {
    const SIZE: usize;

    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_from_le_bytes {
    ($($ty:ty => $read:expr),* $(,)?) => {
        $(
            impl FromLeBytes for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    $read(bytes)
                }
            }
        )*
    };
}

impl_from_le_bytes! {
    u16 => LittleEndian::read_u16,
    i32 => LittleEndian::read_i32,
    u32 => LittleEndian::read_u32,
    i64 => LittleEndian::read_i64,
    u64 => LittleEndian::read_u64,
    f32 => LittleEndian::read_f32,
}

impl FromLeBytes for u8 {
    const SIZE: usize = 1;

    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

/// Read access to another process's memory.
///
/// Every read fails with [`Error::MemoryReadFailed`] when any byte of the
/// requested range is not readable; partial results are never returned.
pub trait ReadMemory {
    /// Read exactly `size` bytes starting at `address`
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Base address of the main module
    fn base_address(&self) -> u64;

    fn read_u8(&self, address: u64) -> Result<u8> {
        self.read_value(address)
    }

    fn read_u16(&self, address: u64) -> Result<u16> {
        self.read_value(address)
    }

    fn read_i32(&self, address: u64) -> Result<i32> {
        self.read_value(address)
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        self.read_value(address)
    }

    fn read_i64(&self, address: u64) -> Result<i64> {
        self.read_value(address)
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        self.read_value(address)
    }

    fn read_f32(&self, address: u64) -> Result<f32> {
        self.read_value(address)
    }

    fn read_value<T: FromLeBytes>(&self, address: u64) -> Result<T> {
        let bytes = self.read_bytes(address, T::SIZE)?;
        Ok(T::from_le_slice(&bytes))
    }

    /// Read `count` consecutive values starting at `address`
    fn read_array<T: FromLeBytes>(&self, address: u64, count: usize) -> Result<Vec<T>> {
        let bytes = self.read_bytes(address, count * T::SIZE)?;
        Ok(bytes.chunks_exact(T::SIZE).map(T::from_le_slice).collect())
    }

    /// Read a NUL-terminated string, decoded lossily as UTF-8
    fn read_cstring(&self, address: u64) -> Result<String> {
        let mut collected = Vec::new();
        let mut cursor = address;

        while collected.len() < MAX_CSTRING_LEN {
            let to_boundary = CSTRING_CHUNK - (cursor % CSTRING_CHUNK);
            let remaining = (MAX_CSTRING_LEN - collected.len()) as u64;
            let chunk = self.read_bytes(cursor, to_boundary.min(remaining) as usize)?;

            if let Some(end) = memchr::memchr(0, &chunk) {
                collected.extend_from_slice(&chunk[..end]);
                return Ok(String::from_utf8_lossy(&collected).into_owned());
            }

            collected.extend_from_slice(&chunk);
            cursor += chunk.len() as u64;
        }

        Err(Error::StringTooLong {
            address,
            limit: MAX_CSTRING_LEN,
        })
    }
}

/// Reads the memory of an opened game process
pub struct MemoryReader<'a> {
    process: &'a ProcessHandle,
}

impl<'a> MemoryReader<'a> {
    pub fn new(process: &'a ProcessHandle) -> Self {
        Self { process }
    }
}

impl ReadMemory for MemoryReader<'_> {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if size == 0 {
            return Ok(Vec::new());
        }
        self.process.read_raw(address, size)
    }

    fn base_address(&self) -> u64 {
        self.process.base_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemoryBuilder;

    #[test]
    fn test_typed_reads_are_little_endian() {
        let reader = MockMemoryBuilder::new()
            .write_bytes(0x100, &[0x34, 0x12, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF])
            .build();

        assert_eq!(reader.read_u16(0x100).unwrap(), 0x1234);
        assert_eq!(reader.read_i32(0x100).unwrap(), 0x1234);
        assert_eq!(reader.read_i32(0x104).unwrap(), -1);
        assert_eq!(reader.read_u64(0x100).unwrap(), 0xFFFF_FFFF_0000_1234);
    }

    #[test]
    fn test_read_array() {
        let reader = MockMemoryBuilder::new()
            .write_u32(0x200, 7)
            .write_u32(0x204, 8)
            .write_u32(0x208, 9)
            .build();

        let values: Vec<u32> = reader.read_array(0x200, 3).unwrap();
        assert_eq!(values, vec![7, 8, 9]);
        assert!(reader.read_array::<u32>(0x2FC, 2).is_err());
    }

    #[test]
    fn test_read_cstring_stops_at_nul() {
        let reader = MockMemoryBuilder::new()
            .write_cstring(0x300, "viewmodel_idle")
            .write_bytes(0x30F, b"garbage")
            .build();

        assert_eq!(reader.read_cstring(0x300).unwrap(), "viewmodel_idle");
    }

    #[test]
    fn test_read_cstring_before_unmapped_boundary() {
        // String ends right before a 256-byte boundary with nothing mapped past it
        let reader = MockMemoryBuilder::new().write_cstring(0x3FB, "void").build();

        assert_eq!(reader.read_cstring(0x3FB).unwrap(), "void");
    }

    #[test]
    fn test_read_cstring_spanning_chunks() {
        let long = "a".repeat(300);
        let reader = MockMemoryBuilder::new().write_cstring(0x1F0, &long).build();

        assert_eq!(reader.read_cstring(0x1F0).unwrap(), long);
    }

    #[test]
    fn test_read_cstring_without_terminator() {
        let reader = MockMemoryBuilder::new()
            .write_bytes(0x1000, &vec![b'x'; MAX_CSTRING_LEN + 16])
            .build();

        let err = reader.read_cstring(0x1000).unwrap_err();
        assert!(matches!(err, Error::StringTooLong { address: 0x1000, .. }));
    }

    #[test]
    fn test_unmapped_read_fails() {
        let reader = MockMemoryBuilder::new().build();
        let err = reader.read_u32(0xDEAD).unwrap_err();
        assert!(err.is_read_fault());
    }
}
