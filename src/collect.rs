use crate::cluster::FrequencyMap;
use crate::io::Read;
use crate::seq::{check_alphabet, reverse_complement};
use anyhow::{bail, Result};
use indexmap::IndexMap;
use thiserror::Error;

/// Coordinates of every read observed for a barcode, one entry per read, in
/// arrival order.
pub type LocationMap = IndexMap<String, Vec<(f64, f64)>>;

/// Configuration of the orientation tags and the barcode extraction window.
/// The offset is measured from the start of the sequence, matching the
/// default layout of a 3-base tag followed immediately by an 8-base barcode.
#[derive(Debug, Clone)]
pub struct TagConfig {
    pub forward_tag: String,
    pub reverse_tag: String,
    pub barcode_offset: usize,
    pub barcode_len: usize,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            forward_tag: String::from("CAT"),
            reverse_tag: String::from("GTA"),
            barcode_offset: 3,
            barcode_len: 8,
        }
    }
}

impl TagConfig {
    fn window_end(&self) -> usize {
        self.barcode_offset + self.barcode_len
    }
}

/// Per-strand barcode frequencies and read locations accumulated over a
/// single pass of the input, plus read counters for the run report.
///
/// Reverse-strand counts are keyed by the reverse complement of the extracted
/// barcode so that they are directly comparable with forward keys. Locations,
/// however, are keyed by the barcode as sequenced. The asymmetry is retained
/// deliberately, pending product-owner clarification.
#[derive(Debug, Default)]
pub struct BarcodeTally {
    pub forward_counts: FrequencyMap,
    pub reverse_counts: FrequencyMap,
    pub forward_locs: LocationMap,
    pub reverse_locs: LocationMap,
    pub read_count: u64,
    pub forward_reads: u64,
    pub reverse_reads: u64,
    pub skipped: u64,
}

#[derive(Error, Debug)]
pub enum CollectError {
    #[error(
        "cannot determine the orientation of read {read}:
position {pos}
    `{id}`
the sequence starts with neither the forward nor the reverse tag
suggestion: if such reads should be counted and skipped, pass the --skip-unclassified flag"
    )]
    UnclassifiableOrientation { read: u64, pos: u64, id: String },

    #[error(
        "malformed coordinate fields in the identifier of read {read}:
position {pos}
    `{id}`
expected numeric x and y in the 3rd and 4th colon-delimited fields"
    )]
    MalformedCoordinates { read: u64, pos: u64, id: String },

    #[error(
        "read {read} is too short for the barcode window:
position {pos}
    `{id}`
the sequence has {len} bases but the window ends at base {end}"
    )]
    ReadTooShort {
        read: u64,
        pos: u64,
        id: String,
        len: usize,
        end: usize,
    },
}

/// Extracts the x/y location embedded in a read identifier: the 3rd and 4th
/// colon-delimited fields, with the 4th truncated at a `#` marker if one is
/// present. The format is an upstream contract; `None` means the identifier
/// does not honor it.
fn parse_coordinates(id: &str) -> Option<(f64, f64)> {
    let mut fields = id.split(':');
    let x = fields.nth(2)?;
    let y = fields.next()?.split('#').next()?;

    Some((x.parse().ok()?, y.parse().ok()?))
}

/// Consumes a single-pass stream of reads, classifying each by its
/// orientation tag and accumulating barcode frequencies and locations per
/// strand.
///
/// Every read must start with exactly one of the two configured tags; a read
/// matching neither aborts the run unless `skip_unclassified` is set, in
/// which case it is counted and passed over. Coordinate parse failures and
/// reads shorter than the barcode window always abort: they indicate a
/// malformed upstream source, and a partial table must never be mistaken for
/// a complete one.
pub fn tally_reads(
    reads: impl Iterator<Item = Result<Read>>,
    config: &TagConfig,
    skip_unclassified: bool,
) -> Result<BarcodeTally> {
    let mut tally = BarcodeTally::default();

    for read in reads {
        let read = read?;
        tally.read_count += 1;

        if tally.read_count % 50000 == 0 {
            info!("Processed: {}", tally.read_count)
        }

        let Some((x, y)) = parse_coordinates(&read.id) else {
            bail!(CollectError::MalformedCoordinates {
                read: tally.read_count,
                pos: read.byte_pos,
                id: read.id,
            })
        };

        if read.seq.starts_with(&config.forward_tag) {
            let barcode = extract_barcode(&read, config, tally.read_count)?;

            tally.forward_reads += 1;
            *tally.forward_counts.entry(barcode.clone()).or_insert(0) += 1;
            tally.forward_locs.entry(barcode).or_default().push((x, y));
        } else if read.seq.starts_with(&config.reverse_tag) {
            let barcode = extract_barcode(&read, config, tally.read_count)?;

            // counts are keyed by the reverse complement so that forward and
            // reverse populations can be joined directly; locations keep the
            // barcode as sequenced (see BarcodeTally)
            let complemented = reverse_complement(&barcode)?;

            tally.reverse_reads += 1;
            *tally.reverse_counts.entry(complemented).or_insert(0) += 1;
            tally.reverse_locs.entry(barcode).or_default().push((x, y));
        } else if skip_unclassified {
            tally.skipped += 1;
        } else {
            bail!(CollectError::UnclassifiableOrientation {
                read: tally.read_count,
                pos: read.byte_pos,
                id: read.id,
            })
        }
    }

    Ok(tally)
}

/// Slices the configured barcode window out of a read and validates its
/// alphabet.
fn extract_barcode(read: &Read, config: &TagConfig, ordinal: u64) -> Result<String> {
    let end = config.window_end();

    if read.seq.len() < end {
        bail!(CollectError::ReadTooShort {
            read: ordinal,
            pos: read.byte_pos,
            id: read.id.clone(),
            len: read.seq.len(),
            end,
        })
    }

    let barcode = &read.seq[config.barcode_offset..end];
    check_alphabet(barcode)?;

    Ok(barcode.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(id: &str, seq: &str) -> Result<Read> {
        Ok(Read {
            id: id.to_string(),
            seq: seq.to_string(),
            byte_pos: 0,
        })
    }

    #[test]
    fn coordinates_parse_with_marker() {
        assert_eq!(
            parse_coordinates("M00001:23:1101.5:2345.7#0/1"),
            Some((1101.5, 2345.7))
        );
        assert_eq!(
            parse_coordinates("M00001:23:1101.5:2345.7"),
            Some((1101.5, 2345.7))
        );
        assert_eq!(parse_coordinates("M00001:23"), None);
        assert_eq!(parse_coordinates("M00001:23:x:4"), None);
    }

    #[test]
    fn classifies_and_extracts_both_strands() {
        let reads = vec![
            read("M:1:10.0:20.0#0/1", "CATAAAAAAAAGGGG"),
            read("M:1:10.5:20.5#0/1", "CATAAAAAAAAGGGG"),
            read("M:1:11.0:21.0#0/1", "GTACCCCCCAAGGGG"),
        ];

        let tally = tally_reads(reads.into_iter(), &TagConfig::default(), false).unwrap();

        assert_eq!(tally.forward_reads, 2);
        assert_eq!(tally.reverse_reads, 1);
        assert_eq!(tally.forward_counts.get("AAAAAAAA"), Some(&2));
        assert_eq!(tally.forward_locs.get("AAAAAAAA").unwrap().len(), 2);

        // reverse counts are keyed by the reverse complement...
        assert_eq!(tally.reverse_counts.get("TTGGGGGG"), Some(&1));
        // ...but reverse locations by the barcode as sequenced
        assert_eq!(
            tally.reverse_locs.get("CCCCCCAA"),
            Some(&vec![(11.0, 21.0)])
        );
    }

    #[test]
    fn unclassifiable_read_aborts_by_default() {
        let reads = vec![read("M:1:10.0:20.0#0/1", "GGGAAAAAAAAGGGG")];
        let err = tally_reads(reads.into_iter(), &TagConfig::default(), false).unwrap_err();

        assert!(err
            .to_string()
            .contains("cannot determine the orientation"));
    }

    #[test]
    fn unclassifiable_read_skipped_when_lenient() {
        let reads = vec![
            read("M:1:10.0:20.0#0/1", "GGGAAAAAAAAGGGG"),
            read("M:1:10.0:20.0#0/1", "CATAAAAAAAAGGGG"),
        ];
        let tally = tally_reads(reads.into_iter(), &TagConfig::default(), true).unwrap();

        assert_eq!(tally.skipped, 1);
        assert_eq!(tally.forward_reads, 1);
    }

    #[test]
    fn malformed_identifier_aborts() {
        let reads = vec![read("no-colons-here", "CATAAAAAAAAGGGG")];
        let err = tally_reads(reads.into_iter(), &TagConfig::default(), false).unwrap_err();

        assert!(err.to_string().contains("malformed coordinate fields"));
    }

    #[test]
    fn short_read_aborts() {
        let reads = vec![read("M:1:10.0:20.0#0/1", "CATAAAA")];
        let err = tally_reads(reads.into_iter(), &TagConfig::default(), false).unwrap_err();

        assert!(err.to_string().contains("too short for the barcode window"));
    }

    #[test]
    fn invalid_base_in_barcode_aborts() {
        let reads = vec![read("M:1:10.0:20.0#0/1", "CATAAAXAAAAGGGG")];
        assert!(tally_reads(reads.into_iter(), &TagConfig::default(), false).is_err());
    }
}
