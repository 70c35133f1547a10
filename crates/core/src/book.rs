//! Fixed-shape order-book snapshot.
//!
//! A [`BookSnapshot`] holds four parallel `levels × selections` tables of
//! back/lay prices and sizes, so the neutralization optimizer can treat the
//! book as dense matrices. Cells with no real quote are filled with the
//! exchange price bounds and zero size, which keeps every later division
//! well defined.

use crate::types::{Market, SelectionId};
use serde::{Deserialize, Serialize};

/// Minimum decimal price the exchange quotes; substituted for missing back
/// quotes.
pub const MIN_BACK_PRICE: f64 = 1.01;

/// Maximum decimal price the exchange quotes; substituted for missing lay
/// quotes.
pub const MAX_LAY_PRICE: f64 = 1000.0;

/// A point-in-time, fixed-shape view of one market's order book.
///
/// All four tables are indexed `[level][selection position]`, level 0 being
/// the best price, with selection positions following `selection_ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub market_id: String,
    /// Selection ordering; fixes the optimizer's vector layout.
    pub selection_ids: Vec<SelectionId>,
    pub back_prices: Vec<Vec<f64>>,
    pub back_sizes: Vec<Vec<f64>>,
    pub lay_prices: Vec<Vec<f64>>,
    pub lay_sizes: Vec<Vec<f64>>,
}

impl BookSnapshot {
    /// Normalizes a market's runner ladders into the dense table form.
    ///
    /// `selection_ids` selects and orders the runners to include; `None`
    /// takes the market's runner order. Missing runners or missing depth
    /// levels get `MIN_BACK_PRICE`/`MAX_LAY_PRICE` with zero size.
    #[must_use]
    pub fn from_market(
        market: &Market,
        levels: usize,
        selection_ids: Option<&[SelectionId]>,
    ) -> Self {
        let selection_ids: Vec<SelectionId> = match selection_ids {
            Some(ids) => ids.to_vec(),
            None => market.runners.iter().map(|r| r.selection_id).collect(),
        };

        let mut back_prices = Vec::with_capacity(levels);
        let mut back_sizes = Vec::with_capacity(levels);
        let mut lay_prices = Vec::with_capacity(levels);
        let mut lay_sizes = Vec::with_capacity(levels);

        for level in 0..levels {
            let mut back_prices_level = Vec::with_capacity(selection_ids.len());
            let mut back_sizes_level = Vec::with_capacity(selection_ids.len());
            let mut lay_prices_level = Vec::with_capacity(selection_ids.len());
            let mut lay_sizes_level = Vec::with_capacity(selection_ids.len());

            for &selection_id in &selection_ids {
                let runner = market
                    .runners
                    .iter()
                    .find(|r| r.selection_id == selection_id);

                let back = runner.and_then(|r| r.available_to_back.get(level));
                let (back_price, back_size) =
                    back.map_or((MIN_BACK_PRICE, 0.0), |ps| (ps.price, ps.size));

                let lay = runner.and_then(|r| r.available_to_lay.get(level));
                let (lay_price, lay_size) =
                    lay.map_or((MAX_LAY_PRICE, 0.0), |ps| (ps.price, ps.size));

                back_prices_level.push(back_price);
                back_sizes_level.push(back_size);
                lay_prices_level.push(lay_price);
                lay_sizes_level.push(lay_size);
            }

            back_prices.push(back_prices_level);
            back_sizes.push(back_sizes_level);
            lay_prices.push(lay_prices_level);
            lay_sizes.push(lay_sizes_level);
        }

        Self {
            market_id: market.market_id.clone(),
            selection_ids,
            back_prices,
            back_sizes,
            lay_prices,
            lay_sizes,
        }
    }

    /// Number of depth levels in the snapshot.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.back_prices.len()
    }

    /// Number of selections in the snapshot.
    #[must_use]
    pub fn selections(&self) -> usize {
        self.selection_ids.len()
    }
}
