use anyhow::{Context, Result};
use needletail::{parse_fastx_file, FastxReader};
use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
    path::Path,
};

/// A single sequencing read, as consumed by the collector. Quality and
/// comment fields of the underlying FASTQ record are opaque to this tool and
/// are not carried.
pub struct Read {
    /// The read identifier, containing colon-delimited positional fields.
    pub id: String,
    /// The read sequence, over the alphabet {A, T, G, C, N}.
    pub seq: String,
    /// Byte offset of the record in the input file, used in error reports.
    pub byte_pos: u64,
}

/// A lazy, single-pass source of reads backed by needletail. Handles both
/// plain and gzip-compressed FASTQ transparently; reads are yielded in
/// arrival order and never materialized wholesale.
pub struct ReadSource {
    reader: Box<dyn FastxReader>,
}

impl ReadSource {
    pub fn from_path(path: &str) -> Result<Self> {
        let reader = parse_fastx_file(path)
            .with_context(|| format!("Unable to open sequence file {path}"))?;
        Ok(ReadSource { reader })
    }
}

impl Iterator for ReadSource {
    type Item = Result<Read>;

    fn next(&mut self) -> Option<Self::Item> {
        let rec = self.reader.next()?;

        let read = rec
            .map_err(anyhow::Error::from)
            .and_then(|rec| {
                Ok(Read {
                    id: String::from_utf8(rec.id().to_vec())?,
                    seq: String::from_utf8(rec.seq().to_vec())?,
                    byte_pos: rec.position().byte(),
                })
            })
            .context("Invalid record in sequence file");

        Some(read)
    }
}

/// Creates a `BufWriter` for the given output option. This allows for an
/// output file to be passed or otherwise will default to using standard
/// output.
///
/// If `output` is `Some`, it creates a file at the specified path and returns
/// a `BufWriter` for it. If `output` is `None`, it returns a `BufWriter` for
/// the standard output.
pub fn get_writer(output: &Option<String>) -> Result<impl Write> {
    // get output as a BufWriter - equal to stdout if None
    let writer = BufWriter::new(match output {
        Some(ref x) => {
            let file = File::create(Path::new(x))
                .with_context(|| format!("Unable to create output file {x}"))?;
            Box::new(file) as Box<dyn Write + Send>
        }
        None => Box::new(stdout()) as Box<dyn Write + Send>,
    });
    Ok(writer)
}
