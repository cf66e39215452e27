//! List command: scan the pool and print every animation found.

use anyhow::Result;
use owo_colors::OwoColorize;
use poolrip_core::AssetPool;

use crate::hex_utils::format_address;

pub fn run<P: AssetPool>(pool: &P, json: bool) -> Result<()> {
    let entries = pool.scan()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{:<48} {} {}",
            entry.name.green(),
            format_address(entry.header_address).dimmed(),
            entry.summary
        );
    }
    eprintln!(
        "{} {} assets in pool '{}' ({})",
        "Found".bold(),
        entries.len(),
        pool.name(),
        pool.setting_group()
    );
    Ok(())
}
