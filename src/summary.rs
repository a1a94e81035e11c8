use crate::cluster::FrequencyMap;
use crate::seq::{reverse_complement, SeqError};
use anyhow::Result;
use serde::Serialize;
use std::io::Write;

/// One row of the joined coverage table. Either side may be absent (a
/// barcode seen on only one strand), but never both. Column names and
/// nullability are a compatibility contract with downstream consumers.
#[derive(Serialize, Debug, PartialEq)]
pub struct CoverageRow {
    pub forward_barcode: Option<String>,
    pub forward_count: Option<u64>,
    pub reverse_barcode: Option<String>,
    pub reverse_count: Option<u64>,
}

impl CoverageRow {
    /// The minimum of the two strand counts, defined only when both strands
    /// were observed.
    pub fn min_count(&self) -> Option<u64> {
        match (self.forward_count, self.reverse_count) {
            (Some(f), Some(r)) => Some(f.min(r)),
            _ => None,
        }
    }
}

/// Joins the collapsed forward and reverse frequency maps into a single
/// coverage table keyed by canonical barcode.
///
/// Reverse map keys are already stored as reverse complements, so they are
/// compared with forward keys directly; the `reverse_barcode` column reports
/// the barcode as it was sequenced, i.e. complemented back. Rows are sorted
/// ascending by min(forward, reverse) coverage, with single-strand rows
/// first (an absent side sorts as lower than any observed count), surfacing
/// the lowest-confidence calls at the top of the table. The sort is stable.
pub fn join_coverage(
    forward: &FrequencyMap,
    reverse: &FrequencyMap,
) -> Result<Vec<CoverageRow>, SeqError> {
    let mut rows = Vec::with_capacity(forward.len() + reverse.len());

    for (barcode, &count) in forward {
        let reverse_count = reverse.get(barcode).copied();
        let reverse_barcode = match reverse_count {
            Some(_) => Some(reverse_complement(barcode)?),
            None => None,
        };

        rows.push(CoverageRow {
            forward_barcode: Some(barcode.clone()),
            forward_count: Some(count),
            reverse_barcode,
            reverse_count,
        });
    }

    for (barcode, &count) in reverse {
        if forward.contains_key(barcode) {
            continue;
        }

        rows.push(CoverageRow {
            forward_barcode: None,
            forward_count: None,
            reverse_barcode: Some(reverse_complement(barcode)?),
            reverse_count: Some(count),
        });
    }

    // Option<u64> orders None before Some, which is exactly the
    // single-strand-rows-first convention
    rows.sort_by_key(|row| row.min_count());

    Ok(rows)
}

/// Writes the coverage table as CSV, with empty cells for absent values.
/// Should only be called once the whole pipeline has succeeded, so that a
/// failed run never leaves behind a truncated table.
pub fn write_coverage(writer: &mut impl Write, rows: &[CoverageRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}
