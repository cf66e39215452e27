//! # poolrip-core
//!
//! Core library for extracting animation assets from a running Black Ops 3
//! process.
//!
//! This crate provides:
//! - Windows process attach and typed remote memory reads
//! - Asset pool location and slot classification
//! - xanim header, notify track and delta curve decoding
//! - Pointer sentinel conversion and `.xanim_raw` serialization

pub mod cancel;
pub mod config;
pub mod error;
pub mod memory;
pub mod pool;
pub mod strings;
pub mod xanim;

pub use cancel::CancelToken;
pub use config::{CONFIG_FILE, Config};
pub use error::{Error, Result};
pub use memory::{MemoryReader, ProcessHandle, ProcessInfo, ReadMemory, attach, find_process};
pub use pool::{AssetPool, ExportStatus, ExportedAssetEntry, PoolInfo};
pub use strings::{
    CachedStringTable, MapStringTable, MemoryStringTable, StringTable, StringTableLayout,
};
pub use xanim::{AnimationRecord, XAnimPool};
