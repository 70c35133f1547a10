//! Comparative statistics for markets with held positions.
//!
//! Runs the neutralization engine per market purely for observability:
//! taker mode, volume constraining off, dispersion tolerance fixed at 1.
//! Each market is evaluated independently — a failure degrades that
//! market's numbers to `None` and never aborts the batch.

use anyhow::Result;
use bet_hedge_cashout::{CashoutEngine, Mode};
use bet_hedge_core::{
    matched_amount, MarketDataProvider, MarketFilter, MarketId, Order, PositionLedger,
    SelectionId, Side,
};
use bet_hedge_solver::ProjectedGradientSolver;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Dispersion tolerance used for comparative stats runs.
const STATS_TOLERANCE: f64 = 1.0;

/// Per-market comparison of holding versus hedging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub market_id: MarketId,
    pub expected_pnl_before: Option<f64>,
    pub expected_pnl_after: Option<f64>,
    pub worst_outcome_before: Option<f64>,
    pub hours_to_start: Option<f64>,
}

/// Matched exposure on one (market, selection) pair, split by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionStats {
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub back_size_matched: f64,
    pub lay_size_matched: f64,
    /// Size-weighted average matched price; `None` with no matched size.
    pub back_avg_price: Option<f64>,
    pub lay_avg_price: Option<f64>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Evaluates every market in the filter and reports before/after hedge
/// expectations.
///
/// # Errors
///
/// Only the market-list fetch itself can fail; per-market evaluation
/// errors are logged and degrade that market's stats to `None`.
pub async fn market_stats(
    provider: &dyn MarketDataProvider,
    ledger: &PositionLedger,
    filter: &MarketFilter,
    levels: usize,
) -> Result<Vec<MarketStats>> {
    let markets = provider.active_markets(filter).await?;
    let mut stats = Vec::with_capacity(markets.len());

    for market in &markets {
        info!(market_id = %market.market_id, "evaluating market stats");
        let hours_to_start = Some(round2(
            (market.start_time - Utc::now()).num_seconds() as f64 / 3600.0,
        ));

        let evaluated = match provider.book_snapshot(market, levels, None).await {
            Ok(book) => {
                let engine = CashoutEngine::new(
                    book,
                    ledger.matched_for(&market.market_id),
                    ledger.open_for(&market.market_id),
                    Mode::Taker,
                    false,
                    STATS_TOLERANCE,
                    ProjectedGradientSolver::default(),
                );
                match engine.hedge_orders() {
                    Ok(Some(result)) => Some(result),
                    Ok(None) => {
                        warn!(market_id = %market.market_id, "no feasible hedge for stats");
                        None
                    }
                    Err(err) => {
                        warn!(market_id = %market.market_id, %err, "stats evaluation failed");
                        None
                    }
                }
            }
            Err(err) => {
                warn!(market_id = %market.market_id, %err, "book snapshot failed");
                None
            }
        };

        stats.push(match evaluated {
            Some(result) => MarketStats {
                market_id: market.market_id.clone(),
                expected_pnl_before: result.expected_pnl_before.map(round2),
                expected_pnl_after: result.expected_pnl_after.map(round2),
                worst_outcome_before: result.worst_outcome_before.map(round2),
                hours_to_start,
            },
            None => MarketStats {
                market_id: market.market_id.clone(),
                expected_pnl_before: None,
                expected_pnl_after: None,
                worst_outcome_before: None,
                hours_to_start,
            },
        });
    }

    Ok(stats)
}

/// Aggregates matched exposure per (market, selection, side).
///
/// Unmatched orders are excluded by the ledger split; ascending market and
/// selection order falls out of the ledger's `BTreeMap`s.
#[must_use]
pub fn selection_stats(orders: &[Order]) -> Vec<SelectionStats> {
    let ledger = PositionLedger::from_orders(orders.iter().cloned());
    let mut stats = Vec::new();

    for market_id in ledger.matched_market_ids() {
        let matched = ledger.matched_for(&market_id);
        for (&selection_id, by_side) in &matched {
            let back_size = matched_amount(&matched, selection_id, Side::Back);
            let lay_size = matched_amount(&matched, selection_id, Side::Lay);
            let weighted = |side| -> f64 {
                by_side
                    .side(side)
                    .iter()
                    .map(|o| o.price * o.size_matched)
                    .sum()
            };
            stats.push(SelectionStats {
                market_id: market_id.clone(),
                selection_id,
                back_size_matched: back_size,
                lay_size_matched: lay_size,
                back_avg_price: (back_size > 0.0).then(|| weighted(Side::Back) / back_size),
                lay_avg_price: (lay_size > 0.0).then(|| weighted(Side::Lay) / lay_size),
            });
        }
    }
    stats
}
