//! CLI for volstats — instantaneous throughput and replica health of a volume.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "volstats")]
#[command(about = "volstats — instantaneous throughput and replica health of a volume")]
#[command(version = volstats_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile two counter snapshots and replica metadata into a stats report
    Stats {
        /// Sample bundle (JSON) with annotations, replicaStats, initial and final metrics
        #[arg(long)]
        sample: String,

        /// Output format: plain (human-readable table, default) or json
        #[arg(long, default_value = "plain", value_parser = ["plain", "table", "json", "structured"])]
        output: String,

        /// Sampling interval in seconds (at most 86400); rate window when controller uptime did not advance
        #[arg(long, default_value = "8")]
        interval_sec: f64,

        /// Also write the structured report as JSON to this path
        #[arg(long)]
        write: Option<String>,
    },

    /// Show the health state each replica status literal maps to
    Classify {
        /// Status literals, e.g. Running ErrImagePull CrashLoopBackOff
        #[arg(required = true)]
        statuses: Vec<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats {
            sample,
            output,
            interval_sec,
            write,
        } => commands::stats::run(commands::stats::StatsCommandConfig {
            sample_path: &sample,
            output: &output,
            interval_sec,
            write_path: write.as_deref(),
        }),
        Commands::Classify { statuses } => commands::classify::run(&statuses),
    }
}
