//! CLI command implementations.

pub mod export;
pub mod header;
pub mod list;
