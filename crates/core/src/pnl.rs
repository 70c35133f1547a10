//! Per-outcome profit-and-loss computation.
//!
//! For each candidate winning selection, the realized PnL of a book of
//! matched bets is:
//!
//! - on the winning selection, a back bet pays `(price - 1) * stake` and a
//!   lay bet owes `(price - 1) * stake`;
//! - on every other selection, a back bet loses its stake and a lay bet
//!   keeps the stake.
//!
//! Single-selection markets additionally carry a `complementary` entry: the
//! PnL if the lone selection does *not* win.

use crate::positions::MatchedPositions;
use crate::types::SelectionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// PnL per candidate winning selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlOutcomes {
    /// Realized PnL if the keyed selection wins, ascending selection id.
    pub by_selection: BTreeMap<SelectionId, f64>,
    /// PnL if the selection loses; `Some` iff the market has exactly one
    /// selection.
    pub complementary: Option<f64>,
}

impl PnlOutcomes {
    /// All outcome values, complementary included.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.by_selection.values().copied().collect();
        if let Some(complementary) = self.complementary {
            values.push(complementary);
        }
        values
    }

    /// The worst outcome across all cases, `None` for an empty market.
    #[must_use]
    pub fn worst(&self) -> Option<f64> {
        self.values().into_iter().reduce(f64::min)
    }

    /// Population standard deviation of the outcome values.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        let values = self.values();
        if values.is_empty() {
            return 0.0;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        var.sqrt()
    }
}

/// Computes the PnL outcome map for one market.
///
/// `matched` must already contain one entry per id in `selection_ids`
/// (see [`crate::positions::fill_missing_selections`]). Pure function of
/// its inputs.
#[must_use]
pub fn pnl_outcomes(matched: &MatchedPositions, selection_ids: &[SelectionId]) -> PnlOutcomes {
    let mut by_selection = BTreeMap::new();

    for &winner in selection_ids {
        let mut pnl = 0.0;
        for (&selection_id, by_side) in matched {
            if selection_id == winner {
                pnl += by_side
                    .back
                    .iter()
                    .map(|o| (o.price - 1.0) * o.size_matched)
                    .sum::<f64>();
                pnl -= by_side
                    .lay
                    .iter()
                    .map(|o| (o.price - 1.0) * o.size_matched)
                    .sum::<f64>();
            } else {
                pnl += by_side.lay.iter().map(|o| o.size_matched).sum::<f64>();
                pnl -= by_side.back.iter().map(|o| o.size_matched).sum::<f64>();
            }
        }
        by_selection.insert(winner, pnl);
    }

    let complementary = if selection_ids.len() == 1 {
        matched.get(&selection_ids[0]).map(|by_side| {
            by_side.lay.iter().map(|o| o.size_matched).sum::<f64>()
                - by_side.back.iter().map(|o| o.size_matched).sum::<f64>()
        })
    } else {
        None
    };

    PnlOutcomes {
        by_selection,
        complementary,
    }
}
