use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "swtab")]
#[command(about = "swtab - tabulate ssearch36 alignments")]
#[command(version)]
#[command(long_about = "
swtab turns ssearch36 '-m 10' alignment output into a delimited table, one row
per alignment, with optional score filtering, best-hit selection, homopolymer
run-length decoding and a compact diff of the aligned region.

Examples:
  swtab tabulate hits.txt -o hits.csv
  swtab tabulate hits.txt --top-alignment --min-zscore 20 -f q_name,t_name,sw_zscore
  swtab rle-encode reads.fa -o reads.hpc.fa -r reads.rle.csv
  swtab tabulate hits.txt -r reads.rle.csv -r refs.rle.csv --with-diff
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write one table row per ssearch36 alignment
    Tabulate(TabulateArgs),

    /// Collapse homopolymer runs of a FASTA/FASTQ file and record the run lengths
    RleEncode(RleEncodeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TabulateArgs {
    /// ssearch36 output produced with -m 10 ('-' or absent for stdin; .gz allowed)
    pub alignments: Option<PathBuf>,

    /// Output table ('-' or absent for stdout; .gz compresses)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Print the first alignment as JSON and exit
    #[arg(short = 'p', long)]
    pub print_one: bool,

    /// Comma-separated list of fields to write (default: fields of the first alignment)
    #[arg(short = 'f', long)]
    pub fieldnames: Option<String>,

    /// Read at most this many alignments
    #[arg(long)]
    pub limit: Option<usize>,

    /// Do not write a header row
    #[arg(long)]
    pub no_header: bool,

    /// Run-length table file written by rle-encode (repeat for several files)
    #[arg(short = 'r', long = "rlefile")]
    pub rlefiles: Vec<PathBuf>,

    /// Exclude alignments with sw_zscore below this value
    #[arg(long)]
    pub min_zscore: Option<f64>,

    /// Keep only the first alignment of each query
    #[arg(short = 'a', long)]
    pub top_alignment: bool,

    /// Constant fields added to every row, as name1:val1,name2:val2
    #[arg(short = 'e', long)]
    pub extra_fields: Option<String>,

    /// Add q_diff and t_diff fields marking mismatches in the aligned region
    #[arg(short = 'd', long)]
    pub with_diff: bool,

    /// Pad decoded homopolymer runs with gaps so both sequences stay column-aligned
    #[arg(long)]
    pub pad_runs: bool,

    /// Field delimiter of the output table (one character, or '\t')
    #[arg(long)]
    pub delimiter: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RleEncodeArgs {
    /// Input FASTA/FASTQ file ('-' for stdin; gzip detected)
    pub seqs: PathBuf,

    /// Compressed FASTA output ('-' or absent for stdout; .gz compresses)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Run-length table output (default: <SEQS>.rle.csv)
    #[arg(short, long)]
    pub rle: Option<PathBuf>,
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    // RUST_LOG, when set, takes precedence over the flags
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.quiet)?;

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Tabulate(args) => commands::tabulate::execute(&config, args)?,
        Commands::RleEncode(args) => commands::rle_encode::execute(args)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => {
                let context: Vec<String> = err
                    .chain()
                    .take_while(|cause| !cause.is::<CliError>())
                    .map(|cause| cause.to_string())
                    .collect();
                if !context.is_empty() {
                    eprintln!("{}", context.join(": "));
                }
                print_error_and_exit(cli_err);
            }
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tabulate_flags() {
        let cli = Cli::try_parse_from([
            "swtab", "-vv", "tabulate", "hits.txt", "-a", "--min-zscore", "20", "-r", "q.csv",
            "-r", "t.csv", "-e", "note:ok", "-d", "--no-header",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Tabulate(args) = cli.command else {
            panic!("expected tabulate");
        };
        assert_eq!(args.alignments, Some(PathBuf::from("hits.txt")));
        assert!(args.top_alignment);
        assert_eq!(args.min_zscore, Some(20.0));
        assert_eq!(args.rlefiles, vec![PathBuf::from("q.csv"), PathBuf::from("t.csv")]);
        assert_eq!(args.extra_fields.as_deref(), Some("note:ok"));
        assert!(args.with_diff);
        assert!(args.no_header);
        assert!(!args.print_one);
    }

    #[test]
    fn test_rle_encode_flags() {
        let cli = Cli::try_parse_from(["swtab", "rle-encode", "reads.fa", "-o", "out.fa", "-r", "out.csv"]).unwrap();
        let Commands::RleEncode(args) = cli.command else {
            panic!("expected rle-encode");
        };
        assert_eq!(args.seqs, PathBuf::from("reads.fa"));
        assert_eq!(args.rle, Some(PathBuf::from("out.csv")));
    }
}
