//! Report writing.

use std::fs::File;
use std::io::Write;

use serde::Serialize;

/// Writes `value` as pretty JSON to `file`, or to stdout when `None`.
pub fn write_json<T: Serialize>(value: &T, file: Option<&str>) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(value)?;

    match file {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(output.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
