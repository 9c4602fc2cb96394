//! # perftree - Main Entry Point
//!
//! Runs one parse session over a recorded perf data file, prints the run
//! summary and the hottest functions, and optionally writes the full
//! results bundle as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;

use perftree::analysis::{CostTree, ProfileResults};
use perftree::cli::Args;
use perftree::domain::SessionError;
use perftree::export;
use perftree::session::{ParseConfig, ParseSession};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOINPUT: i32 = 66;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code_for(&e)
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SessionError>() {
        Some(
            SessionError::InputMissing(_)
            | SessionError::InputNotAFile(_)
            | SessionError::InputNotReadable(_),
        ) => EXIT_NOINPUT,
        _ => EXIT_ERROR,
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();

    let session = ParseSession::spawn(ParseConfig {
        input: args.input.clone(),
        exporter: args.exporter.clone(),
    });
    let results = session.wait().await?;

    if !args.quiet {
        print_summary(&results);
        print_hotspots(&results, args.top);
    }

    if let Some(path) = &args.export {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        export::export_results(&results, BufWriter::new(file))
            .context("Failed to export results")?;
        if !args.quiet {
            println!("saved: {}", path.display());
        }
    }

    Ok(())
}

fn print_summary(results: &ProfileResults) {
    let summary = &results.summary;
    println!("command:   {}", summary.command);
    println!("samples:   {}", summary.sample_count);
    println!("lost:      {} chunks", summary.lost_chunks);
    println!("threads:   {}", summary.thread_count);
    println!("processes: {}", summary.process_count);
    println!(
        "time:      {} ns ({} - {})",
        summary.application_running_time,
        summary.application_start_time,
        summary.application_end_time
    );
}

/// Print the top functions by self cost from the caller-callee table.
fn print_hotspots(results: &ProfileResults, top: usize) {
    let table = &results.caller_callee;
    let mut rows: Vec<_> = table.children(CostTree::ROOT).to_vec();
    rows.sort_unstable_by_key(|&id| std::cmp::Reverse(table.node(id).self_cost));

    println!("\n{:>8} {:>8}  function", "self", "incl");
    for id in rows.into_iter().take(top) {
        let row = table.node(id);
        if row.binary.is_empty() {
            println!("{:>8} {:>8}  {}", row.self_cost, row.inclusive_cost, row.symbol);
        } else {
            println!(
                "{:>8} {:>8}  {} ({})",
                row.self_cost, row.inclusive_cost, row.symbol, row.binary
            );
        }
    }
}
