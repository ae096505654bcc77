use anyhow::Result;
use serde::Serialize;

/// Pretty-print a value as indented JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
