use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod utils;

use commands::scan::ScanArgs;

#[derive(Parser)]
#[command(name = "topkeys")]
#[command(about = "Finds the keys with the highest counts in a large `key count` file")]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a file and print its top keys (default; the path is read from stdin)
    Scan(ScanArgs),

    /// Print the segment map of a file
    Segments {
        /// Nominal segment size in bytes
        #[arg(long)]
        segment_size: Option<u64>,

        /// Probe window size in bytes
        #[arg(long)]
        probe_size: Option<u64>,

        /// Read through the page cache instead of O_DIRECT
        #[arg(long)]
        buffered: bool,

        /// Number of leading bytes shown for each segment
        #[arg(long, default_value_t = 32)]
        preview: usize,

        /// File to segment
        path: String,
    },

    /// Generate a test file of `http://api.tech.com/item/{i} {count}` records
    Generate {
        /// Number of records
        count: usize,

        /// Random seed
        #[arg(long, default_value_t = topkeys_testkit::data_gen::DEFAULT_SEED)]
        seed: u64,

        /// Use each count in 1..=COUNT exactly once
        #[arg(long)]
        distinct: bool,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.unwrap_or_else(|| Commands::Scan(ScanArgs::default())) {
        Commands::Scan(args) => commands::scan::run(args),
        Commands::Segments {
            segment_size,
            probe_size,
            buffered,
            preview,
            path,
        } => commands::segments::run(segment_size, probe_size, buffered, preview, path),
        Commands::Generate {
            count,
            seed,
            distinct,
            output,
        } => commands::generate::run(count, seed, distinct, output),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}
