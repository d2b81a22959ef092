//! Reading and writing number sequences.
//!
//! Input format: the element count `n` followed by `n` floats, all
//! whitespace-separated. Output format: values separated by single spaces,
//! terminated by a newline.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

/// Parse a count-prefixed sequence of floats.
pub fn read_sequence<R: Read>(reader: R) -> Result<Vec<f32>> {
    let mut text = String::new();
    BufReader::new(reader)
        .read_to_string(&mut text)
        .context("Failed to read sequence")?;

    let mut tokens = text.split_whitespace();
    let count: usize = tokens
        .next()
        .ok_or_else(|| anyhow!("Missing element count"))?
        .parse()
        .context("Invalid element count")?;

    // The count is untrusted; every value needs at least two bytes of text.
    let mut values = Vec::with_capacity(count.min(text.len() / 2));
    for i in 0..count {
        let token = tokens
            .next()
            .ok_or_else(|| anyhow!("Expected {count} values, found {i}"))?;
        let value: f32 = token
            .parse()
            .with_context(|| format!("Invalid value at index {i}: {token:?}"))?;
        values.push(value);
    }

    if tokens.next().is_some() {
        bail!("Trailing data after {count} values");
    }

    Ok(values)
}

/// Read a count-prefixed sequence from a file.
pub fn read_sequence_file(path: &Path) -> Result<Vec<f32>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_sequence(file).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write values separated by spaces, followed by a newline.
pub fn write_sequence<W: Write>(writer: W, values: &[f32]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            writer.write_all(b" ")?;
        }
        write!(writer, "{value}")?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write values to a file, replacing its contents.
pub fn write_sequence_file(path: &Path, values: &[f32]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_sequence(file, values).with_context(|| format!("Failed to write {}", path.display()))
}
