//! Position aggregation.
//!
//! Partitions the exchange's flat list of current orders into matched and
//! open positions keyed by market and selection. `BTreeMap` keys give the
//! ascending-selection iteration order the optimizer relies on when it
//! encodes positions as a fixed-layout vector.

use crate::types::{MarketId, Order, SelectionId, Side};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Matched orders on one selection, split by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedBySide {
    pub back: Vec<Order>,
    pub lay: Vec<Order>,
}

impl MatchedBySide {
    /// Orders on the given side.
    #[must_use]
    pub fn side(&self, side: Side) -> &[Order] {
        match side {
            Side::Back => &self.back,
            Side::Lay => &self.lay,
        }
    }

    fn push(&mut self, order: Order) {
        match order.side {
            Side::Back => self.back.push(order),
            Side::Lay => self.lay.push(order),
        }
    }
}

/// One market's matched positions: selection → side → orders.
pub type MatchedPositions = BTreeMap<SelectionId, MatchedBySide>;

/// One market's open (resting) orders: selection → orders.
pub type OpenPositions = BTreeMap<SelectionId, Vec<Order>>;

/// All matched and open positions across markets, built from a flat order
/// list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionLedger {
    matched: BTreeMap<MarketId, MatchedPositions>,
    open: BTreeMap<MarketId, OpenPositions>,
}

impl PositionLedger {
    /// Files every order into the matched and/or open maps.
    ///
    /// An order with both `size_matched > 0` and `size_remaining > 0` is
    /// filed in both, independently.
    #[must_use]
    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let mut ledger = Self::default();
        for order in orders {
            if order.is_open() {
                ledger
                    .open
                    .entry(order.market_id.clone())
                    .or_default()
                    .entry(order.selection_id)
                    .or_default()
                    .push(order.clone());
            }
            if order.is_matched() {
                ledger
                    .matched
                    .entry(order.market_id.clone())
                    .or_default()
                    .entry(order.selection_id)
                    .or_default()
                    .push(order);
            }
        }
        ledger
    }

    /// Matched positions for a market; empty when none are held.
    #[must_use]
    pub fn matched_for(&self, market_id: &str) -> MatchedPositions {
        self.matched.get(market_id).cloned().unwrap_or_default()
    }

    /// Open positions for a market; empty when none are resting.
    #[must_use]
    pub fn open_for(&self, market_id: &str) -> OpenPositions {
        self.open.get(market_id).cloned().unwrap_or_default()
    }

    /// Ids of markets with at least one matched order.
    #[must_use]
    pub fn matched_market_ids(&self) -> Vec<MarketId> {
        self.matched.keys().cloned().collect()
    }
}

/// Returns a copy of `matched` whose key set is `selection_ids ∪ keys`,
/// with every selection absent from `matched` mapped to empty back/lay
/// lists.
///
/// The optimizer needs one entry per book selection, in ascending id order,
/// to line positions up with its stake vector.
#[must_use]
pub fn fill_missing_selections(
    matched: &MatchedPositions,
    selection_ids: &[SelectionId],
) -> MatchedPositions {
    let mut filled = matched.clone();
    for &selection_id in selection_ids {
        filled.entry(selection_id).or_default();
    }
    filled
}

/// Total matched size on one side of one selection; 0 when the selection is
/// absent.
#[must_use]
pub fn matched_amount(matched: &MatchedPositions, selection_id: SelectionId, side: Side) -> f64 {
    matched
        .get(&selection_id)
        .map_or(0.0, |by_side| {
            by_side.side(side).iter().map(|o| o.size_matched).sum()
        })
}
