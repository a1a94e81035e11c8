use crate::summary::CoverageRow;
use serde::Serialize;
use std::fmt;

/// Descriptive statistics over the joined coverage table: per-strand barcode
/// and read totals, and the spread of per-barcode read totals (forward plus
/// reverse, with an absent strand contributing zero).
#[derive(Serialize, Debug)]
pub struct CoverageStats {
    pub forward_barcodes: usize,
    pub forward_total: u64,
    pub reverse_barcodes: usize,
    pub reverse_total: u64,
    pub mean_reads: f64,
    pub std_dev_reads: f64,
    pub variance_reads: f64,
}

impl CoverageStats {
    pub fn from_rows(rows: &[CoverageRow]) -> Self {
        let forward_barcodes = rows.iter().filter(|r| r.forward_barcode.is_some()).count();
        let reverse_barcodes = rows.iter().filter(|r| r.reverse_barcode.is_some()).count();

        let forward_total: u64 = rows.iter().filter_map(|r| r.forward_count).sum();
        let reverse_total: u64 = rows.iter().filter_map(|r| r.reverse_count).sum();

        let totals: Vec<f64> = rows
            .iter()
            .map(|r| (r.forward_count.unwrap_or(0) + r.reverse_count.unwrap_or(0)) as f64)
            .collect();

        let n = totals.len() as f64;
        let mean_reads = if totals.is_empty() {
            0.0
        } else {
            totals.iter().sum::<f64>() / n
        };

        // population variance, matching the reporting of the original
        // analysis
        let variance_reads = if totals.is_empty() {
            0.0
        } else {
            totals.iter().map(|t| (t - mean_reads).powi(2)).sum::<f64>() / n
        };

        CoverageStats {
            forward_barcodes,
            forward_total,
            reverse_barcodes,
            reverse_total,
            mean_reads,
            std_dev_reads: variance_reads.sqrt(),
            variance_reads,
        }
    }
}

impl fmt::Display for CoverageStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} forward barcodes ({} reads), {} reverse barcodes ({} reads), \
             reads per barcode: mean {:.2}, sd {:.2}, variance {:.2}",
            self.forward_barcodes,
            self.forward_total,
            self.reverse_barcodes,
            self.reverse_total,
            self.mean_reads,
            self.std_dev_reads,
            self.variance_reads
        )
    }
}

/// Metadata about a completed run, printed as JSON so that pipelines can
/// pick it up alongside the coverage table.
#[derive(Serialize, Debug, Default)]
pub struct RunReport {
    pub strandem_version: String,
    pub file_path: String,
    pub run_date: String,
    pub elapsed: f64,
    pub read_count: u64,
    pub forward_reads: u64,
    pub reverse_reads: u64,
    pub skipped_reads: u64,
    pub forward_barcodes_raw: usize,
    pub forward_barcodes_collapsed: usize,
    pub reverse_barcodes_raw: usize,
    pub reverse_barcodes_collapsed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(f: Option<u64>, r: Option<u64>) -> CoverageRow {
        CoverageRow {
            forward_barcode: f.map(|_| "AAAA".to_string()),
            forward_count: f,
            reverse_barcode: r.map(|_| "TTTT".to_string()),
            reverse_count: r,
        }
    }

    #[test]
    fn totals_and_spread() {
        let rows = vec![
            row(Some(10), Some(2)), // total 12
            row(Some(4), None),     // total 4
            row(None, Some(2)),     // total 2
        ];

        let stats = CoverageStats::from_rows(&rows);
        assert_eq!(stats.forward_barcodes, 2);
        assert_eq!(stats.reverse_barcodes, 2);
        assert_eq!(stats.forward_total, 14);
        assert_eq!(stats.reverse_total, 4);
        assert_eq!(stats.mean_reads, 6.0);
        assert!((stats.variance_reads - 56.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_table_yields_zeros() {
        let stats = CoverageStats::from_rows(&[]);
        assert_eq!(stats.mean_reads, 0.0);
        assert_eq!(stats.variance_reads, 0.0);
    }
}
