#![deny(warnings)]

//! Headless boat builder: shows the builder tabs and runs one order.

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;
use yard_core::{Inventory, SharedStockpile, ShowcaseEntry};
use yard_panels::{build_showcase, overview, start_production, OverviewView};
use yard_production::{OrderState, ProductionController};

#[derive(Debug, Default)]
struct Args {
    data: Option<String>,
    recipe: Option<String>,
    delta: Option<Decimal>,
    max_ticks: Option<u32>,
}

fn parse_args<I: IntoIterator<Item = String>>(argv: I) -> Result<Args> {
    let mut args = Args::default();
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--data" => args.data = Some(it.next().context("--data needs a value")?),
            "--recipe" => args.recipe = Some(it.next().context("--recipe needs a value")?),
            "--delta" => {
                let v = it.next().context("--delta needs a value")?;
                args.delta = Some(v.parse().with_context(|| format!("bad --delta {v}"))?);
            }
            "--max-ticks" => {
                let v = it.next().context("--max-ticks needs a value")?;
                args.max_ticks = Some(v.parse().with_context(|| format!("bad --max-ticks {v}"))?);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

/// `RUST_LOG` directives when they parse, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(?args, "starting boatyard");

    let data = match &args.data {
        Some(path) => yard_data::load(path)?,
        None => yard_data::bundled()?,
    };
    let stock = SharedStockpile::new(data.starting_stock.clone());

    for category in &data.categories {
        let show = build_showcase(category, &data.catalog, &stock)?;
        println!("[{}] {}", show.category, show.headline);
        for card in &show.cards {
            let costs: Vec<&str> = card.costs.iter().map(|c| c.text.as_str()).collect();
            println!(
                "  {} ({}) costs: {} {}",
                card.unit,
                card.tooltip,
                costs.join(" "),
                card.unbuildable.as_deref().unwrap_or("")
            );
        }
    }

    let entry: ShowcaseEntry = match &args.recipe {
        Some(id) => data
            .categories
            .iter()
            .flat_map(|c| c.entries.iter())
            .find(|e| e.recipe.0 == *id)
            .cloned()
            .with_context(|| format!("recipe {id} is not offered in any tab"))?,
        None => data
            .categories
            .iter()
            .find_map(|c| c.entries.first())
            .cloned()
            .context("no ship offered in any tab")?,
    };

    let mut yard =
        ProductionController::new(data.catalog.clone(), stock.clone()).with_name("boat builder");
    start_production(&mut yard, &entry)?;

    let delta = args.delta.unwrap_or(Decimal::ONE);
    let max_ticks = args.max_ticks.unwrap_or(1000);
    let mut ticks = 0;
    while yard.state() != OrderState::Completed {
        if ticks == max_ticks {
            bail!("order not finished after {max_ticks} ticks");
        }
        yard.advance(delta)?;
        ticks += 1;
        if ticks % 10 == 0 {
            if let OverviewView::Building(status) = overview(&yard) {
                info!(ticks, progress = status.progress_percent, "building");
            }
        }
    }
    let unit = yard.collect()?;

    println!("Built {} in {} ticks", unit, ticks);
    let left: Vec<String> = data
        .starting_stock
        .amounts()
        .keys()
        .map(|k| format!("{k}={}", stock.available(k)))
        .collect();
    println!("Stock | {}", left.join(" | "));
    Ok(())
}
