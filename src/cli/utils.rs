use serde::Serialize;

use crate::cli::OutputFormat;

/// Print `data` as pretty JSON, or the text rendering of it
pub fn output<T: Serialize>(output_format: OutputFormat, data: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => println!("{}", text(data)),
    }
    Ok(())
}

pub fn check_mark(done: bool) -> &'static str {
    if done {
        "✓"
    } else {
        "○"
    }
}
