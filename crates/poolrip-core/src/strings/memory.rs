use serde::{Deserialize, Serialize};

use super::StringTable;
use crate::error::{Error, Result};
use crate::memory::ReadMemory;

/// Where the game's string table lives, relative to the module base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringTableLayout {
    /// Offset of entry 0 from the module base
    pub offset: u64,
    /// Bytes between consecutive entries
    pub entry_size: u64,
    /// Offset of the inline string inside an entry
    pub string_offset: u64,
}

impl Default for StringTableLayout {
    fn default() -> Self {
        Self {
            offset: 0,
            entry_size: 0x10,
            string_offset: 0,
        }
    }
}

impl StringTableLayout {
    pub fn is_configured(&self) -> bool {
        self.offset != 0 && self.entry_size != 0
    }
}

/// String table read directly out of the game's memory
pub struct MemoryStringTable<'a, R: ReadMemory> {
    reader: &'a R,
    table_address: u64,
    layout: StringTableLayout,
}

impl<'a, R: ReadMemory> MemoryStringTable<'a, R> {
    pub fn new(reader: &'a R, layout: StringTableLayout) -> Self {
        Self {
            table_address: reader.base_address() + layout.offset,
            reader,
            layout,
        }
    }

    fn entry_address(&self, id: u32) -> u64 {
        self.table_address + u64::from(id) * self.layout.entry_size + self.layout.string_offset
    }
}

impl<R: ReadMemory> StringTable for MemoryStringTable<'_, R> {
    fn resolve(&self, id: u32) -> Result<String> {
        if !self.layout.is_configured() {
            return Err(Error::Config(format!(
                "string_table is not configured, cannot resolve string {id}"
            )));
        }
        self.reader.read_cstring(self.entry_address(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemoryBuilder;

    #[test]
    fn test_resolves_relative_to_base() {
        let reader = MockMemoryBuilder::new()
            .base_address(0x1_0000)
            .write_cstring(0x1_0400 + 2 * 0x10 + 4, "tag_origin")
            .build();
        let layout = StringTableLayout {
            offset: 0x400,
            entry_size: 0x10,
            string_offset: 4,
        };

        let table = MemoryStringTable::new(&reader, layout);
        assert_eq!(table.resolve(2).unwrap(), "tag_origin");
        assert!(table.resolve(64).unwrap_err().is_read_fault());
    }

    #[test]
    fn test_default_layout_is_unconfigured() {
        assert!(!StringTableLayout::default().is_configured());
    }

    #[test]
    fn test_unconfigured_layout_does_not_read_module_image() {
        let reader = MockMemoryBuilder::new()
            .base_address(0x1_0000)
            .write_bytes(0x1_0000, b"MZ\x90\0")
            .build();

        let table = MemoryStringTable::new(&reader, StringTableLayout::default());
        assert!(matches!(table.resolve(0), Err(Error::Config(_))));

        let zero_stride = StringTableLayout {
            offset: 0x400,
            entry_size: 0,
            string_offset: 0,
        };
        let table = MemoryStringTable::new(&reader, zero_stride);
        assert!(matches!(table.resolve(3), Err(Error::Config(_))));
    }
}
