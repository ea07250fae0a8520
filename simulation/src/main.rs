use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swap3_simulation::{ScenarioConfig, ScenarioReport, ScenarioRunner, StepStatus};

#[derive(Parser, Debug)]
#[command(name = "swap3-sim")]
#[command(about = "Replay a Swap3 prediction market scenario")]
struct Args {
    /// Path to scenario TOML file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("swap3_simulation={},swap3_core={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let scenario = ScenarioConfig::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;

    let report = ScenarioRunner::run_scenario(&scenario).context("Scenario aborted")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &ScenarioReport) {
    println!("Scenario: {}", report.name);
    for step in &report.steps {
        let status = match &step.status {
            StepStatus::Applied => "ok".to_string(),
            StepStatus::Rejected { reason } => format!("rejected: {}", reason),
        };
        let probability = step
            .probability_after
            .map(|p| format!("{:.4}", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{:>3}] {:<5} tick={:<8} L={:<12} p={:<7} {}",
            step.index, step.action, step.tick_after, step.liquidity_after, probability, status
        );
        if let Some(swap) = &step.swap {
            let average = swap
                .average_price()
                .map(|price| format!("{:.6}", price))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "        {:?} shares_out={:.6} spent={:.6} refunded={:.6} avg={} crossed={} {:?}",
                swap.side,
                swap.shares_out,
                swap.amount_in_used,
                swap.amount_remaining,
                average,
                swap.ticks_crossed,
                swap.outcome
            );
        }
    }
    println!(
        "Applied {} / rejected {}; final tick {} liquidity {}",
        report.applied, report.rejected, report.final_tick, report.final_liquidity
    );
    match report.final_probability {
        Some(p) => println!("Final probability: {:.6}", p),
        None => println!("Final probability: undefined (no active liquidity)"),
    }
}
