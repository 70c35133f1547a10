use anyhow::Context;
use clap::{Parser, Subcommand};

use bet_hedge_betfair::{BetfairClient, BetfairExecutor};
use bet_hedge_cashout::{CashoutEngine, Mode};
use bet_hedge_core::{
    ConfigLoader, ExecutionGateway, ExecutionPlan, MarketDataProvider, MarketFilter, Order,
    OrderProvider, PositionLedger,
};
use bet_hedge_solver::ProjectedGradientSolver;

#[derive(Parser)]
#[command(name = "bet-hedge")]
#[command(about = "Position neutralization for Betfair exchange markets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show before/after hedge statistics for every market with positions
    Stats {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Compute (and optionally place) hedge orders for one market
    Cashout {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Market to neutralize
        #[arg(short, long)]
        market_id: String,
        /// Pricing mode override ("maker" or "taker"), defaults to config
        #[arg(long)]
        mode: Option<String>,
        /// Actually submit the computed orders to the exchange
        #[arg(long)]
        place: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Stats { config } => {
            run_stats(&config).await?;
        }
        Commands::Cashout {
            config,
            market_id,
            mode,
            place,
        } => {
            run_cashout(&config, &market_id, mode.as_deref(), place).await?;
        }
    }

    Ok(())
}

async fn run_stats(config_path: &str) -> anyhow::Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let client = BetfairClient::login(config.betfair.clone()).await?;

    let orders = client.current_orders().await?;
    let ledger = PositionLedger::from_orders(orders.clone());

    let market_ids = ledger.matched_market_ids();
    if market_ids.is_empty() {
        println!("No matched positions; nothing to report.");
        return Ok(());
    }
    tracing::info!("Evaluating {} market(s) with matched positions", market_ids.len());

    // Restrict to exactly the markets we hold; the volume floor would only
    // hide positions we already carry.
    let filter = MarketFilter {
        event_type_ids: config.filters.event_type_ids.clone(),
        market_type_codes: config.filters.market_type_codes.clone(),
        min_volume: 0.0,
        market_ids: Some(market_ids),
    };

    let stats =
        bet_hedge_report::market_stats(&client, &ledger, &filter, config.cashout.book_levels)
            .await?;

    println!("\n{}", "=".repeat(80));
    println!("Market Statistics");
    println!("{}", "=".repeat(80));
    println!(
        "{:<14} {:>14} {:>14} {:>14} {:>14}",
        "Market", "E[PnL] before", "E[PnL] after", "Worst before", "Hours to start"
    );
    println!("{}", "-".repeat(80));
    for stat in &stats {
        println!(
            "{:<14} {:>14} {:>14} {:>14} {:>14}",
            stat.market_id,
            fmt_opt(stat.expected_pnl_before),
            fmt_opt(stat.expected_pnl_after),
            fmt_opt(stat.worst_outcome_before),
            fmt_opt(stat.hours_to_start),
        );
    }
    println!("{}", "=".repeat(80));

    let selections = bet_hedge_report::selection_stats(&orders);
    println!("\n{}", "=".repeat(80));
    println!("Matched Selections");
    println!("{}", "=".repeat(80));
    println!(
        "{:<14} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Market", "Selection", "Back size", "Back avg", "Lay size", "Lay avg"
    );
    println!("{}", "-".repeat(80));
    for sel in &selections {
        println!(
            "{:<14} {:>12} {:>12.2} {:>12} {:>12.2} {:>12}",
            sel.market_id,
            sel.selection_id,
            sel.back_size_matched,
            fmt_opt(sel.back_avg_price),
            sel.lay_size_matched,
            fmt_opt(sel.lay_avg_price),
        );
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

async fn run_cashout(
    config_path: &str,
    market_id: &str,
    mode_override: Option<&str>,
    place: bool,
) -> anyhow::Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let mode: Mode = mode_override
        .unwrap_or(&config.cashout.mode)
        .parse()
        .context("invalid cashout mode")?;

    tracing::info!("Cashing out market {} in {} mode", market_id, mode);

    let client = BetfairClient::login(config.betfair.clone()).await?;
    let orders = client.current_orders().await?;
    let ledger = PositionLedger::from_orders(orders);

    let filter = MarketFilter {
        event_type_ids: config.filters.event_type_ids.clone(),
        market_type_codes: config.filters.market_type_codes.clone(),
        min_volume: 0.0,
        market_ids: Some(vec![market_id.to_string()]),
    };
    let markets = client.active_markets(&filter).await?;
    let market = markets
        .iter()
        .find(|m| m.market_id == market_id)
        .with_context(|| format!("market {market_id} not found or not active"))?;

    let book = client
        .book_snapshot(market, config.cashout.book_levels, None)
        .await?;

    let engine = CashoutEngine::new(
        book,
        ledger.matched_for(market_id),
        ledger.open_for(market_id),
        mode,
        config.cashout.constrain_by_volume,
        config.cashout.max_std_allowed,
        ProjectedGradientSolver::default(),
    );

    if engine.is_balanced() {
        println!(
            "Market {market_id} is already balanced (dispersion {:.4} <= {:.4}); nothing to do.",
            engine.pnl_outcomes().std_dev(),
            config.cashout.max_std_allowed
        );
        return Ok(());
    }

    let Some(result) = engine.hedge_orders()? else {
        println!("No economically meaningful hedge exists for {market_id}.");
        return Ok(());
    };

    println!("\n{}", "=".repeat(70));
    println!("Hedge Orders - Market {market_id} ({mode} mode)");
    println!("{}", "=".repeat(70));
    println!(
        "{:<12} {:>6} {:>10} {:>10}",
        "Selection", "Side", "Price", "Size"
    );
    println!("{}", "-".repeat(70));
    for order in &result.orders {
        println!(
            "{:<12} {:>6} {:>10.2} {:>10.1}",
            order.selection_id,
            order.side.as_str(),
            order.price,
            order.size_remaining,
        );
    }
    println!("{}", "-".repeat(70));
    println!("Expected PnL before: {}", fmt_opt(result.expected_pnl_before));
    println!("Expected PnL after:  {}", fmt_opt(result.expected_pnl_after));
    println!("Worst outcome before: {}", fmt_opt(result.worst_outcome_before));
    println!("{}", "=".repeat(70));

    if place {
        place_orders(&client, result.orders).await?;
    } else {
        println!("\nDry run; pass --place to submit these orders.");
    }

    Ok(())
}

async fn place_orders(client: &BetfairClient, orders: Vec<Order>) -> anyhow::Result<()> {
    let executor = BetfairExecutor::new(client);
    let plan = ExecutionPlan {
        place: orders,
        ..ExecutionPlan::default()
    };
    let report = executor.execute(&plan).await;
    println!(
        "\nExecution: {} succeeded, {} failed.",
        report.succeeded, report.failed
    );
    if report.failed > 0 {
        anyhow::bail!("{} instruction(s) were rejected", report.failed);
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
