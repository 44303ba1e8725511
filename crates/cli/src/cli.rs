//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Run track metadata through a chain of external filter programs.
///
/// Records are read as JSON lines (`{"artist","title","album","genres"}`)
/// and one outcome per record is written to stdout, in input order.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "TRACKFILTER_CONFIG",
        default_value = "trackfilter.toml"
    )]
    pub config: PathBuf,

    /// Read records from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Override `pipeline.max_concurrency` from the config
    #[arg(short = 'j', long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Print Prometheus metrics to stderr when the batch completes
    #[arg(long)]
    pub print_metrics: bool,

    /// Print the resolved filter chain and exit
    #[arg(long)]
    pub show_chain: bool,
}
