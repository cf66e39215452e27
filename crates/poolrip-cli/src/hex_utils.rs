//! Hex address parsing for command-line arguments.

/// Parse a hex value with or without a `0x` prefix.
///
/// Used as a clap value parser, so errors are plain strings.
pub fn parse_hex_arg(s: &str) -> Result<u64, String> {
    let digits = s
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value {s:?}: {e}"))
}

/// Format an address the way listings print it
pub fn format_address(address: u64) -> String {
    format!("0x{:X}", address)
}
