//! The xanim asset pool: slot classification, scanning and export.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::export::{AssetSerializer, output_path, write_atomic};
use super::layout::{VOID_NAME, header};
use super::types::AnimationRecord;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::memory::ReadMemory;
use crate::pool::{AssetPool, ExportStatus, ExportedAssetEntry, PoolInfo};
use crate::strings::StringTable;

pub const POOL_NAME: &str = "xanim";
pub const SETTING_GROUP: &str = "Misc";

/// State carried across one pass over the pool
#[derive(Debug, Default)]
pub struct ScanContext {
    /// First record named `void`, the template of an unused slot
    void: Option<AnimationRecord>,
    pub null_slots: usize,
    pub void_slots: usize,
    pub unused_slots: usize,
    pub occupied_slots: usize,
    pub skipped_slots: usize,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template for occupancy checks; zeroed until a `void` record is seen
    pub fn void_record(&self) -> Option<&AnimationRecord> {
        self.void.as_ref()
    }
}

/// What one pool slot holds
#[derive(Debug, Clone, PartialEq)]
pub enum SlotClass {
    /// Name pointer is zero or points back into the pool
    Null,
    /// The `void` placeholder record
    Void,
    /// Shares data pointers with the void template
    Unused,
    Occupied(ExportedAssetEntry),
}

/// Animation pool located in the game's memory
pub struct XAnimPool<'a, R: ReadMemory, S: StringTable> {
    reader: &'a R,
    strings: &'a S,
    info: PoolInfo,
    output_root: PathBuf,
    game_name: String,
}

impl<'a, R: ReadMemory, S: StringTable> XAnimPool<'a, R, S> {
    pub fn new(
        reader: &'a R,
        strings: &'a S,
        info: PoolInfo,
        output_root: impl Into<PathBuf>,
        game_name: impl Into<String>,
    ) -> Result<Self> {
        if (info.asset_size() as usize) < header::SIZE {
            return Err(Error::DecodeInconsistency(format!(
                "xanim slots are {} bytes, smaller than the {}-byte header",
                info.asset_size(),
                header::SIZE
            )));
        }

        Ok(Self {
            reader,
            strings,
            info,
            output_root: output_root.into(),
            game_name: game_name.into(),
        })
    }

    /// Read the pool descriptor from the table named in `config`
    pub fn locate(reader: &'a R, strings: &'a S, config: &Config) -> Result<Self> {
        let entry = config.xanim_pool_entry(reader.base_address())?;
        let info = PoolInfo::read(reader, entry)?;
        info!(
            "xanim pool: {} slots at 0x{:X}",
            info.asset_count(),
            info.start_address()
        );
        Self::new(
            reader,
            strings,
            info,
            config.output_dir.clone(),
            config.game_name.clone(),
        )
    }

    pub fn read_record(&self, address: u64) -> Result<AnimationRecord> {
        AnimationRecord::from_bytes(&self.reader.read_bytes(address, header::SIZE)?)
    }

    /// Classify slot `index`, updating the void template in `ctx`
    pub fn classify_slot(&self, index: u32, ctx: &mut ScanContext) -> Result<SlotClass> {
        let address = self.info.slot_address(index);
        let record = self.read_record(address)?;

        if self.info.is_null_address(record.name.raw()) {
            return Ok(SlotClass::Null);
        }

        let name = self.reader.read_cstring(record.name.raw())?;

        if name == VOID_NAME {
            if ctx.void.is_none() {
                debug!("Void template at slot {} (0x{:X})", index, address);
                ctx.void = Some(record);
            }
            return Ok(SlotClass::Void);
        }

        let unused = match &ctx.void {
            Some(template) => !record.differs_from(template),
            None => !record.differs_from(&AnimationRecord::default()),
        };
        if unused {
            return Ok(SlotClass::Unused);
        }

        let summary = record.summary()?;
        Ok(SlotClass::Occupied(ExportedAssetEntry {
            name,
            header_address: address,
            name_address: record.name.raw(),
            pool: POOL_NAME,
            summary,
        }))
    }

    /// Enumerate occupied slots, skipping any slot that fails to decode
    pub fn scan_with(&self, ctx: &mut ScanContext) -> Vec<ExportedAssetEntry> {
        let mut entries = Vec::new();

        for index in 0..self.info.asset_count() {
            match self.classify_slot(index, ctx) {
                Ok(SlotClass::Null) => ctx.null_slots += 1,
                Ok(SlotClass::Void) => ctx.void_slots += 1,
                Ok(SlotClass::Unused) => ctx.unused_slots += 1,
                Ok(SlotClass::Occupied(entry)) => {
                    debug!("Slot {}: {} ({})", index, entry.name, entry.summary);
                    ctx.occupied_slots += 1;
                    entries.push(entry);
                }
                Err(e) => {
                    warn!("Skipping xanim slot {}: {}", index, e);
                    ctx.skipped_slots += 1;
                }
            }
        }

        info!(
            "Scanned {} xanim slots: {} assets, {} null, {} unused, {} skipped",
            self.info.asset_count(),
            ctx.occupied_slots,
            ctx.null_slots,
            ctx.unused_slots + ctx.void_slots,
            ctx.skipped_slots
        );
        entries
    }

    /// Destination file of `entry`
    pub fn output_path_for(&self, entry: &ExportedAssetEntry) -> Result<PathBuf> {
        output_path(&self.output_root, &self.game_name, &entry.name)
    }
}

impl<R: ReadMemory, S: StringTable> AssetPool for XAnimPool<'_, R, S> {
    fn name(&self) -> &'static str {
        POOL_NAME
    }

    fn setting_group(&self) -> &'static str {
        SETTING_GROUP
    }

    fn info(&self) -> &PoolInfo {
        &self.info
    }

    fn scan(&self) -> Result<Vec<ExportedAssetEntry>> {
        Ok(self.scan_with(&mut ScanContext::new()))
    }

    fn export_with(
        &self,
        entry: &ExportedAssetEntry,
        cancel: &CancelToken,
    ) -> Result<ExportStatus> {
        cancel.check()?;
        let record = self.read_record(entry.header_address)?;

        if self.info.is_null_address(record.name.raw()) {
            debug!("{}: slot is now empty", entry.name);
            return Ok(ExportStatus::MemoryChanged);
        }
        let live_name = self.reader.read_cstring(record.name.raw())?;
        if live_name != entry.name {
            debug!("{}: slot now holds {}", entry.name, live_name);
            return Ok(ExportStatus::MemoryChanged);
        }

        let path = self.output_path_for(entry)?;
        let decoded = AssetSerializer::new(self.reader, self.strings, cancel)
            .decode(record, live_name)?;
        cancel.check()?;
        let bytes = write_atomic(&path, &decoded)?;

        info!("Exported {} ({} bytes)", entry.name, bytes);
        Ok(ExportStatus::Exported { path, bytes })
    }
}
