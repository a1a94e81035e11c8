extern crate env_logger;
#[macro_use]
extern crate log;

use anyhow::Result;
use clap::Parser;

mod cli;
mod cluster;
mod collect;
mod io;
mod seq;
mod stats;
mod summary;

use cli::{Cli, Commands};
use collect::TagConfig;
use stats::{CoverageStats, RunReport};

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze {
            file,
            output,
            forward_tag,
            reverse_tag,
            offset,
            barcode_length,
            skip_unclassified,
            stats,
        } => {
            let config = TagConfig {
                forward_tag: forward_tag.clone(),
                reverse_tag: reverse_tag.clone(),
                barcode_offset: *offset,
                barcode_len: *barcode_length,
            };

            analyze(file, output, &config, *skip_unclassified, *stats)?;

            info!("Completed successfully.")
        }
        Commands::Collapse { file, output } => {
            let mut writer = io::get_writer(output)?;

            cluster::collapse_csv(file, &mut writer)?;

            info!("Completed successfully.")
        }
    };
    Ok(())
}

/// The full pipeline: stream reads once, tally barcodes per strand, collapse
/// single-mismatch variants (the two strands in parallel, since the maps are
/// independent), join into the coverage table and write it out. The table is
/// only written once every prior stage has succeeded.
fn analyze(
    file: &str,
    output: &Option<String>,
    config: &TagConfig,
    skip_unclassified: bool,
    show_stats: bool,
) -> Result<()> {
    let now = std::time::Instant::now();

    info!("Tallying barcodes from {file}");
    let source = io::ReadSource::from_path(file)?;
    let tally = collect::tally_reads(source, config, skip_unclassified)?;

    info!(
        "Tallied {} reads: {} forward, {} reverse, {} skipped",
        tally.read_count, tally.forward_reads, tally.reverse_reads, tally.skipped
    );

    let (forward, reverse) = rayon::join(
        || cluster::collapse_frequencies(&tally.forward_counts),
        || cluster::collapse_frequencies(&tally.reverse_counts),
    );
    let (forward, reverse) = (forward?, reverse?);

    info!(
        "Collapsed {} forward barcodes into {}, {} reverse barcodes into {}",
        tally.forward_counts.len(),
        forward.len(),
        tally.reverse_counts.len(),
        reverse.len()
    );

    let rows = summary::join_coverage(&forward, &reverse)?;

    let mut writer = io::get_writer(output)?;
    summary::write_coverage(&mut writer, &rows)?;

    if show_stats {
        let stats = CoverageStats::from_rows(&rows);
        info!("{stats}");
        info!("Coverage statistics: {}", serde_json::to_string(&stats)?);
    }

    let report = RunReport {
        strandem_version: cli::VERSION.to_string(),
        file_path: std::fs::canonicalize(file)?.display().to_string(),
        run_date: format!("{:?}", chrono::offset::Local::now()),
        elapsed: now.elapsed().as_secs_f64(),
        read_count: tally.read_count,
        forward_reads: tally.forward_reads,
        reverse_reads: tally.reverse_reads,
        skipped_reads: tally.skipped,
        forward_barcodes_raw: tally.forward_counts.len(),
        forward_barcodes_collapsed: forward.len(),
        reverse_barcodes_raw: tally.reverse_counts.len(),
        reverse_barcodes_collapsed: reverse.len(),
    };
    info!("Run report: {}", serde_json::to_string(&report)?);

    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
