pub mod csv;
pub mod table;

use anyhow::Result;
use serde::Serialize;

/// Shared `--output json` rendering; every printable shape in the crate
/// serializes, so one pretty-printer covers them all.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
