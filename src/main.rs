//! Funnel / intent / cancellation SLA report
//!
//! Usage:
//!   evo_report --events events.csv --messages messages.csv --orders orders.csv --out report/

use anyhow::Result;
use clap::Parser;
use evo_report::config::{
    ReportConfig, DEFAULT_SLA_THRESHOLD_SECS, DEFAULT_TOP_INTENTS, MAX_SLA_THRESHOLD_SECS,
};
use evo_report::loader::Inputs;
use evo_report::report;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "evo_report")]
#[command(about = "Generate funnel, intent and cancellation SLA report")]
struct Args {
    /// Path to events.csv
    #[arg(long)]
    events: PathBuf,

    /// Path to messages.csv
    #[arg(long)]
    messages: PathBuf,

    /// Path to orders.csv
    #[arg(long)]
    orders: PathBuf,

    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// Number of intents shown in the chart
    #[arg(long, default_value_t = DEFAULT_TOP_INTENTS)]
    top_intents: usize,

    /// Cancellation latency (seconds) above which an order violates the SLA
    #[arg(
        long,
        default_value_t = DEFAULT_SLA_THRESHOLD_SECS,
        value_parser = clap::value_parser!(i64).range(0..=MAX_SLA_THRESHOLD_SECS)
    )]
    sla_threshold_secs: i64,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let inputs = match Inputs::load(&args.events, &args.messages, &args.orders) {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("{}", e);
            println!("Error loading input files: {}", e);
            std::process::exit(1);
        }
    };

    let config = ReportConfig {
        top_intents: args.top_intents,
        sla_threshold_secs: args.sla_threshold_secs,
        render_charts: !args.no_charts,
        ..ReportConfig::default()
    };

    let report = report::run(&inputs, &args.out, &config)?;
    report::print_summary(&report, &args.out);

    Ok(())
}
