//! Attached game process plus the configuration used to read it.

use anyhow::{Context, Result};
use poolrip_core::{
    CachedStringTable, Config, MemoryReader, MemoryStringTable, ProcessHandle, XAnimPool, attach,
};
use tracing::{info, warn};

/// The xanim pool of a live process
pub type LivePool<'a> =
    XAnimPool<'a, MemoryReader<'a>, CachedStringTable<MemoryStringTable<'a, MemoryReader<'a>>>>;

pub struct Session {
    process: ProcessHandle,
    config: Config,
}

impl Session {
    pub fn attach(config: Config, pid: Option<u32>) -> Result<Self> {
        let process = attach(&config.process_name, pid)
            .with_context(|| format!("could not attach to {}", config.process_name))?;
        info!(
            "Found {} (PID: {}, Base: 0x{:X})",
            config.process_name, process.pid, process.base_address
        );

        if !config.string_table.is_configured() {
            warn!("string_table is not configured; exports of animations with named bones or notetracks will fail");
        }

        Ok(Self { process, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Locate the xanim pool and hand it to `f`
    pub fn with_pool<T>(&self, f: impl FnOnce(&LivePool<'_>) -> Result<T>) -> Result<T> {
        let reader = MemoryReader::new(&self.process);
        let strings = CachedStringTable::new(MemoryStringTable::new(
            &reader,
            self.config.string_table,
        ));
        let pool: LivePool<'_> = XAnimPool::locate(&reader, &strings, &self.config)
            .context("failed to locate the xanim pool")?;
        f(&pool)
    }
}
