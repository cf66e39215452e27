//! Resolution of string ids (bone names, notetrack names) to text.

mod cache;
mod memory;

pub use cache::{CachedStringTable, MapStringTable};
pub use memory::{MemoryStringTable, StringTableLayout};

use crate::error::Result;

/// Maps a small integer id to its string value
pub trait StringTable {
    fn resolve(&self, id: u32) -> Result<String>;
}

impl<T: StringTable + ?Sized> StringTable for &T {
    fn resolve(&self, id: u32) -> Result<String> {
        (**self).resolve(id)
    }
}
