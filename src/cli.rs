use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Parser, Subcommand};

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 strandem version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   barcode error correction and strand coverage pairing";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count, error-correct and pair strand barcodes from a .fastq file,
    /// writing a coverage table sorted ascending by min(forward, reverse)
    #[command(arg_required_else_help = true)]
    Analyze {
        /// the input .fastq file (plain or gzip-compressed)
        file: String,

        /// the output coverage table; defaults to standard output
        #[arg(short)]
        output: Option<String>,

        /// tag marking a forward-strand read at the start of its sequence
        #[arg(long, default_value = "CAT", value_parser = parse_tag)]
        forward_tag: String,

        /// tag marking a reverse-strand read at the start of its sequence
        #[arg(long, default_value = "GTA", value_parser = parse_tag)]
        reverse_tag: String,

        /// offset of the barcode window from the start of the sequence
        #[arg(long, default_value_t = 3)]
        offset: usize,

        /// length of the barcode window
        #[arg(long, default_value_t = 8)]
        barcode_length: usize,

        /// count and skip reads which match neither tag, instead of aborting.
        /// by default an unclassifiable read is treated as a malformed input
        /// and fails the whole run.
        #[arg(long, verbatim_doc_comment)]
        skip_unclassified: bool,

        /// also report descriptive statistics of the coverage table
        #[arg(long)]
        stats: bool,
    },

    /// Collapse single-mismatch variants in a `barcode,count` CSV, without
    /// touching any read data. Useful for re-running the error correction on
    /// its own, or for checking an alternative implementation against it.
    #[command(arg_required_else_help = true)]
    Collapse {
        /// the input CSV, with a `barcode,count` header row
        file: String,

        /// the output CSV; defaults to standard output
        #[arg(short)]
        output: Option<String>,
    },
}

/// Validates an orientation tag argument: non-empty DNA over {A,T,G,C,N}.
fn parse_tag(arg: &str) -> Result<String, String> {
    if arg.is_empty() {
        return Err("orientation tags must not be empty".to_string());
    }

    if crate::seq::check_alphabet(arg).is_err() {
        return Err(indoc::formatdoc! {"
            Invalid orientation tag '{arg}'. Tags are matched against the raw
            sequence and must only contain the bases A, T, G, C or N, as in:
              --forward-tag CAT
              --reverse-tag GTA
        "});
    }

    Ok(arg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_validation() {
        assert_eq!(parse_tag("CAT"), Ok("CAT".to_string()));
        assert!(parse_tag("").is_err());
        assert!(parse_tag("CAU").is_err());
    }
}
