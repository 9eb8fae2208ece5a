//! Loads the flat RP 210 CSV (`Formatted as UL, Type, Data Element Name,
//! Data Element Definition`) named by `--dict` into rows `mxf-dict`'s
//! constructor accepts. `mxf-dict` deliberately leaves this to an external
//! collaborator; this is that collaborator, kept deliberately small since
//! the CLI is a thin wrapper, not a parser for RP 210's full CSV dialect
//! (quoting, embedded commas).

use std::path::Path;

use anyhow::{Context, Result};
use mxf_core::Ul;

pub fn load_rows(path: &Path) -> Result<Vec<(Ul, String, String, String)>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("cannot read RP 210 table: {}", path.display()))?;

    let mut rows = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 4 || fields.iter().any(|f| f.is_empty()) {
            continue;
        }
        let normalized_ul = fields[0].replace('.', "").to_lowercase();
        let Some(ul) = Ul::from_hex(&normalized_ul) else {
            continue;
        };
        rows.push((ul, fields[1].to_string(), fields[2].to_string(), fields[3].to_string()));
    }
    Ok(rows)
}
