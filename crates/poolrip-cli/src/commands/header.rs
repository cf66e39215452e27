//! Header command: dump one animation's decoded header.

use anyhow::{Context, Result};
use poolrip_core::xanim::XAnimPool;
use poolrip_core::{AssetPool, ReadMemory, StringTable};
use serde_json::json;

use crate::hex_utils::format_address;

pub fn run<R: ReadMemory, S: StringTable>(pool: &XAnimPool<'_, R, S>, name: &str) -> Result<()> {
    let entry = pool
        .scan()?
        .into_iter()
        .find(|entry| entry.name == name)
        .with_context(|| format!("no animation named {name:?} in the pool"))?;

    let record = pool.read_record(entry.header_address)?;
    let report = json!({
        "name": entry.name,
        "address": format_address(entry.header_address),
        "type": record.anim_type().map(|t| t.label()).ok(),
        "output": pool.output_path_for(&entry).ok(),
        "header": record,
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
