use crate::seq::{hamming_distance, SeqError};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::io::Write;

/// Observed read count per distinct barcode. Insertion order is preserved by
/// `IndexMap`, which keeps downstream output deterministic.
pub type FrequencyMap = IndexMap<String, u64>;

/// Collapses single-mismatch sequencing errors into their source barcode.
///
/// Barcodes are visited in descending order of count, so the most frequent
/// barcode of any 1-mismatch neighborhood wins and absorbs the counts of its
/// error variants. Ties on count are broken by the barcode string, ascending,
/// so cluster assignment is reproducible across runs.
///
/// The returned map conserves the total count of the input, its keys are a
/// subset of the input keys (no new barcode strings are invented), and its
/// entries appear in descending-frequency order. Collapsing is idempotent:
/// no two output keys are within Hamming distance 1 of each other.
///
/// # Errors
///
/// Returns `SeqError::LengthMismatch` if the map contains barcodes of
/// differing lengths, which indicates a barcode-window misconfiguration
/// upstream.
pub fn collapse_frequencies(counts: &FrequencyMap) -> Result<FrequencyMap, SeqError> {
    let mut order: Vec<(&str, u64)> = counts.iter().map(|(b, c)| (b.as_str(), *c)).collect();
    order.sort_unstable_by_key(|&(barcode, count)| (Reverse(count), barcode));

    let mut claimed = vec![false; order.len()];
    let mut reduced = FrequencyMap::with_capacity(order.len());

    for i in 0..order.len() {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;

        let (barcode, mut total) = order[i];

        // Every barcode before `i` has already been claimed, either as a
        // cluster seed or by absorption, so only the tail needs scanning.
        for j in (i + 1)..order.len() {
            if claimed[j] {
                continue;
            }
            if hamming_distance(barcode, order[j].0)? == 1 {
                total += order[j].1;
                claimed[j] = true;
            }
        }

        reduced.insert(barcode.to_string(), total);
    }

    Ok(reduced)
}

#[derive(Serialize, Deserialize)]
struct BarcodeCount {
    barcode: String,
    count: u64,
}

/// Runs the collapse over a bare `barcode,count` CSV and writes the reduced
/// CSV, exposing the error correction on its own: for re-running it over a
/// previously exported table, and for differential testing against an
/// optimised implementation. Duplicate input barcodes have their counts
/// summed before collapsing.
pub fn collapse_csv(input: &str, writer: &mut impl Write) -> Result<()> {
    let mut rdr = csv::Reader::from_path(input)
        .with_context(|| format!("Unable to open barcode file {input}"))?;

    let mut counts = FrequencyMap::new();
    for record in rdr.deserialize() {
        let BarcodeCount { barcode, count } = record?;
        *counts.entry(barcode).or_insert(0) += count;
    }

    info!("Read {} distinct barcodes", counts.len());
    let reduced = collapse_frequencies(&counts)?;
    info!("Collapsed into {} barcodes", reduced.len());

    let mut wtr = csv::Writer::from_writer(writer);
    for (barcode, count) in reduced {
        wtr.serialize(BarcodeCount { barcode, count })?;
    }
    wtr.flush()?;

    Ok(())
}
