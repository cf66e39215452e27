//! Export command: write selected animations to disk.

use std::time::Duration;

use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use poolrip_core::{AssetPool, ExportStatus, ExportedAssetEntry};
use tracing::{error, info, warn};

use crate::shutdown::ShutdownSignal;

/// Per-run export counters
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub memory_changed: usize,
    pub failed: usize,
    pub bytes: u64,
}

impl ExportSummary {
    pub fn record(&mut self, status: &ExportStatus) {
        match status {
            ExportStatus::Exported { bytes, .. } => {
                self.exported += 1;
                self.bytes += bytes;
            }
            ExportStatus::MemoryChanged => self.memory_changed += 1,
        }
    }
}

/// Entries matching `names` (or all of them), plus names with no match
pub fn select_entries(
    entries: Vec<ExportedAssetEntry>,
    names: &[String],
    all: bool,
) -> (Vec<ExportedAssetEntry>, Vec<String>) {
    if all {
        return (entries, Vec::new());
    }

    let missing = names
        .iter()
        .filter(|name| !entries.iter().any(|e| &e.name == *name))
        .cloned()
        .collect();
    let selected = entries
        .into_iter()
        .filter(|e| names.contains(&e.name))
        .collect();
    (selected, missing)
}

pub fn run<P: AssetPool>(
    pool: &P,
    names: &[String],
    all: bool,
    shutdown: &ShutdownSignal,
    timeout: Option<Duration>,
) -> Result<()> {
    if names.is_empty() && !all {
        bail!("name at least one animation to export, or pass --all");
    }

    let (selected, missing) = select_entries(pool.scan()?, names, all);
    for name in &missing {
        warn!("No animation named {:?} in the pool", name);
    }

    let mut summary = ExportSummary::default();
    for entry in &selected {
        if shutdown.is_shutdown() {
            break;
        }

        let cancel = shutdown.export_token(timeout);
        match pool.export_with(entry, &cancel) {
            Ok(status) => {
                match &status {
                    ExportStatus::Exported { path, bytes } => {
                        println!("{} {} ({} bytes)", "exported".green(), path.display(), bytes);
                    }
                    ExportStatus::MemoryChanged => {
                        println!("{} {}", "memory changed".yellow(), entry.name);
                    }
                }
                summary.record(&status);
            }
            Err(e) if e.is_interrupted() && shutdown.is_shutdown() => {
                warn!("Export of {} interrupted", entry.name);
                break;
            }
            Err(e) => {
                error!("Failed to export {}: {}", entry.name, e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Exported {} of {} animations ({} bytes), {} changed in memory, {} failed",
        summary.exported,
        selected.len(),
        summary.bytes,
        summary.memory_changed,
        summary.failed
    );
    Ok(())
}
