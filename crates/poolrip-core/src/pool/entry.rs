use std::path::PathBuf;

use serde::Serialize;

/// Lightweight handle to one occupied pool slot.
///
/// Holds the address and the name seen at scan time, never a copy of the
/// record; export re-reads the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedAssetEntry {
    pub name: String,
    pub header_address: u64,
    pub name_address: u64,
    /// Name of the owning pool
    pub pool: &'static str,
    /// Human-readable summary shown in listings
    pub summary: String,
}

/// Outcome of exporting one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Exported { path: PathBuf, bytes: u64 },
    /// The slot no longer holds the asset seen during the scan
    MemoryChanged,
}
