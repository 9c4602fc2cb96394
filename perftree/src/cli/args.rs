//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "perftree",
    about = "Aggregate a recorded perf profile into cost trees",
    after_help = "\
EXAMPLES:
    perftree perf.data                       Parse and print the run summary
    perftree perf.data --export trees.json   Also write the full trees as JSON
    perftree perf.data --exporter ./pp       Use an explicit exporter binary"
)]
pub struct Args {
    /// Recorded perf data file to parse
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Path to the exporter binary (auto-detected if omitted)
    #[arg(long, value_name = "BINARY")]
    pub exporter: Option<PathBuf>,

    /// Write the aggregated trees and summary as JSON
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Number of functions shown in the hotspot list
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
