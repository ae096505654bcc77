use std::fs;
use std::io::Read;

use anyhow::{Context, Result};

/// Resolve text content from an inline argument or a file path.
///
/// An explicit file path wins over inline text; the path `-` reads
/// standard input, so long bodies don't have to pass through the shell:
///
/// ```text
/// --body-file content.html   # read from file
/// --body-file -              # read from stdin (pipe)
/// ```
pub fn resolve_text(inline: Option<&str>, file_path: Option<&str>) -> Result<Option<String>> {
    if let Some(path) = file_path {
        if path == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            return Ok(Some(buf));
        }
        let text =
            fs::read_to_string(path).with_context(|| format!("Failed to read file {path}"))?;
        return Ok(Some(text));
    }

    Ok(inline.map(str::to_string))
}
