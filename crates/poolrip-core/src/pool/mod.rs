//! Asset pools: fixed-stride arrays of one asset kind in game memory

mod entry;
mod info;

pub use entry::{ExportStatus, ExportedAssetEntry};
pub use info::PoolInfo;

use crate::cancel::CancelToken;
use crate::error::Result;

/// Operations every asset pool exposes to the session layer
pub trait AssetPool {
    /// Pool identity, also the output sub-directory (e.g. `xanim`)
    fn name(&self) -> &'static str;

    /// Settings group this pool is listed under
    fn setting_group(&self) -> &'static str;

    fn info(&self) -> &PoolInfo;

    /// Enumerate occupied slots
    fn scan(&self) -> Result<Vec<ExportedAssetEntry>>;

    /// Export one entry, honoring `cancel` between block reads
    fn export_with(
        &self,
        entry: &ExportedAssetEntry,
        cancel: &CancelToken,
    ) -> Result<ExportStatus>;

    fn export(&self, entry: &ExportedAssetEntry) -> Result<ExportStatus> {
        self.export_with(entry, &CancelToken::new())
    }

    fn is_null_slot(&self, entry: &ExportedAssetEntry) -> bool {
        self.info().is_null_address(entry.name_address)
    }
}
