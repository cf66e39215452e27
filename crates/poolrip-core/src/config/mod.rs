//! Per-game configuration, loaded from JSON

pub mod limits;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::strings::StringTableLayout;

/// Default configuration file name
pub const CONFIG_FILE: &str = "poolrip.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Game name, used as the output directory component
    pub game_name: String,
    /// Executable name to attach to
    pub process_name: String,
    /// Offset of the asset pool table from the module base
    pub asset_pool_table: u64,
    /// Index of the xanim pool within the table
    pub xanim_pool_index: u32,
    /// Bytes between pool table entries
    pub pool_entry_stride: u64,
    pub string_table: StringTableLayout,
    /// Root directory for exported files
    pub output_dir: PathBuf,
    /// Per-asset export deadline in seconds
    pub export_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game_name: "BlackOps3".to_string(),
            process_name: "BlackOps3.exe".to_string(),
            asset_pool_table: 0,
            xanim_pool_index: 3,
            pool_entry_stride: limits::POOL_ENTRY_STRIDE,
            string_table: StringTableLayout::default(),
            output_dir: PathBuf::from("exported_files"),
            export_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)?;
        info!("Saved config to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject values that can never locate a pool
    pub fn validate(&self) -> Result<()> {
        if self.game_name.trim().is_empty() {
            return Err(Error::Config("game_name must not be empty".to_string()));
        }
        if self.pool_entry_stride == 0 {
            return Err(Error::Config("pool_entry_stride must be non-zero".to_string()));
        }
        if self.export_timeout_secs == Some(0) {
            return Err(Error::Config(
                "export_timeout_secs must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Address of the pool table entry for the xanim pool
    pub fn xanim_pool_entry(&self, base_address: u64) -> Result<u64> {
        if self.asset_pool_table == 0 {
            return Err(Error::Config(
                "asset_pool_table is not set; supply it in the config or with --pool-table"
                    .to_string(),
            ));
        }
        Ok(base_address
            + self.asset_pool_table
            + u64::from(self.xanim_pool_index) * self.pool_entry_stride)
    }

    pub fn export_timeout(&self) -> Option<Duration> {
        self.export_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "asset_pool_table": 4096, "game_name": "BlackOps3" }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.asset_pool_table, 0x1000);
        assert_eq!(config.xanim_pool_index, 3);
        assert_eq!(config.output_dir, PathBuf::from("exported_files"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = Config {
            export_timeout_secs: Some(30),
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = Config::load("/nonexistent/poolrip.json").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_pool_entry_requires_table() {
        let config = Config::default();
        assert!(matches!(config.xanim_pool_entry(0x1000), Err(Error::Config(_))));

        let config = Config {
            asset_pool_table: 0x500,
            ..Config::default()
        };
        assert_eq!(config.xanim_pool_entry(0x1000).unwrap(), 0x1000 + 0x500 + 3 * 0x20);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = Config {
            export_timeout_secs: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
