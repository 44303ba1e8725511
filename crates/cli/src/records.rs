//! JSON-lines input and output.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use trackfilter_core::{ChainOutcome, Record};

/// One line of output: the input position plus its outcome.
#[derive(Debug, Serialize)]
pub struct OutcomeLine<'a> {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: &'a ChainOutcome,
}

/// Parses one record per non-blank line.
pub fn read_records(reader: impl BufRead) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line)
            .with_context(|| format!("Invalid record on line {}", n + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Writes outcomes as JSON lines, in input order.
pub fn write_outcomes(mut writer: impl Write, outcomes: &[ChainOutcome]) -> Result<()> {
    for (index, outcome) in outcomes.iter().enumerate() {
        serde_json::to_writer(&mut writer, &OutcomeLine { index, outcome })?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
