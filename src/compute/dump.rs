//! Full enumeration of small landscapes for offline inspection.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use super::landscape::Landscape;
use super::search::bitstring;

/// Largest landscape `dump` will enumerate.
pub const MAX_DUMP_BITS: usize = 24;

/// One enumerated point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpRow {
    /// Point index; bit `j` is locus `j`.
    pub index: u64,
    /// Fitness of the point.
    pub fitness: f64,
    /// Point, locus 0 first.
    pub bits: String,
}

/// Dump errors.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("Landscape has {n} loci, dump is limited to {limit}")]
    TooLarge { n: usize, limit: usize },
    #[error("Failed to write dump: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to serialize dump row: {0}")]
    Json(#[from] serde_json::Error),
}

/// Evaluate all `2^N` points of `landscape`.
///
/// This visits every state sequence, so the cache ends up fully populated.
pub fn dump(landscape: &mut Landscape, max_n: usize) -> Result<Vec<DumpRow>, DumpError> {
    let n = landscape.n();
    let limit = max_n.min(MAX_DUMP_BITS);
    if n > limit {
        return Err(DumpError::TooLarge { n, limit });
    }

    let mut point = vec![false; n];
    let rows = (0..1u64 << n)
        .map(|index| {
            for (j, bit) in point.iter_mut().enumerate() {
                *bit = (index >> j) & 1 == 1;
            }
            DumpRow {
                index,
                fitness: landscape.evaluate(&point).fitness,
                bits: bitstring(&point),
            }
        })
        .collect();

    Ok(rows)
}

/// Write rows as newline-delimited JSON.
pub fn write_dump_json_lines<W: Write>(rows: &[DumpRow], mut out: W) -> Result<(), DumpError> {
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
