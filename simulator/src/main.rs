//! CrossRate Simulator
//!
//! Thin host around the CrossRate engine: loads a rate table, answers
//! rate and conversion queries, prints results.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crossrate_common::Currency;
use crossrate_fx::{FxEngine, RateEdge};

/// CrossRate Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "CrossRate rate-table playground")]
struct Args {
    /// JSON rate table file; the built-in demo table is used when omitted
    #[arg(short, long)]
    rates: Option<PathBuf>,

    /// Source currency code
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// Target currency code
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Amount to convert; prints the bare rate when omitted
    #[arg(long)]
    amount: Option<f64>,
}

fn demo_table() -> Vec<RateEdge> {
    vec![
        ("USD", "CAD", 1.34).into(),
        ("CAD", "GBP", 0.58).into(),
        ("USD", "EUR", 0.86).into(),
    ]
}

fn load_table(path: &Path) -> anyhow::Result<Vec<RateEdge>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading rate table {}", path.display()))?;
    let edges = serde_json::from_str(&raw)
        .with_context(|| format!("parsing rate table {}", path.display()))?;
    Ok(edges)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let table = match &args.rates {
        Some(path) => load_table(path)?,
        None => demo_table(),
    };
    info!(edges = table.len(), "loading rate table");

    let engine = FxEngine::new();
    engine.load_configuration(table)?;

    match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            let from = Currency::new(from.as_str());
            let to = Currency::new(to.as_str());
            match args.amount {
                Some(amount) => {
                    let converted = engine.convert(&from, &to, amount)?;
                    println!("{} {} = {} {}", amount, from, converted, to);
                }
                None => {
                    let rate = engine.get_rate(&from, &to)?;
                    println!("{}/{}: {}", from, to, rate);
                }
            }
        }
        _ => {
            // Demo queries over the loaded table.
            for (from, to) in [("USD", "EUR"), ("CAD", "USD"), ("CAD", "EUR")] {
                let from = Currency::new(from);
                let to = Currency::new(to);
                println!("{}/{}: {}", from, to, engine.get_rate(&from, &to)?);
            }
        }
    }

    Ok(())
}
