mod process;
mod reader;

#[cfg(test)]
pub mod mock;

pub use process::*;
pub use reader::{FromLeBytes, MAX_CSTRING_LEN, MemoryReader, ReadMemory};

#[cfg(test)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
