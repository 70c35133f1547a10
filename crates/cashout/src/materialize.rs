//! Turns the optimizer's continuous stake vector into discrete orders.
//!
//! The stake vector is laid out level-major: for level `l` over `n`
//! selections, back stakes occupy indices `2·l·n + k` and lay stakes
//! `(2·l + 1)·n + k`, `k` being the selection position. One BACK and one
//! LAY order is emitted per `(level, selection)` cell; zero-stake orders
//! are kept — callers drop them if they want to.

use crate::types::Mode;
use bet_hedge_core::{BookSnapshot, Order, Side};
use ndarray::Array1;

/// Index of a back stake in the vector layout.
#[must_use]
pub fn back_index(level: usize, selection: usize, selections: usize) -> usize {
    2 * level * selections + selection
}

/// Index of a lay stake in the vector layout.
#[must_use]
pub fn lay_index(level: usize, selection: usize, selections: usize) -> usize {
    (2 * level + 1) * selections + selection
}

fn round_stake(stake: f64) -> f64 {
    (stake * 10.0).round() / 10.0
}

/// Materializes a stake vector into priced orders.
///
/// Taker mode prices BACK orders at the book's back quote and LAY orders
/// at the lay quote; maker mode swaps the two, inverted-looking as that is.
#[must_use]
pub fn vector_to_orders(book: &BookSnapshot, mode: Mode, stakes: &Array1<f64>) -> Vec<Order> {
    let selections = book.selections();
    let mut orders = Vec::with_capacity(2 * book.levels() * selections);

    for level in 0..book.levels() {
        for (position, &selection_id) in book.selection_ids.iter().enumerate() {
            let back_stake = stakes[back_index(level, position, selections)];
            let lay_stake = stakes[lay_index(level, position, selections)];

            let (back_price, lay_price) = match mode {
                Mode::Taker => (
                    book.back_prices[level][position],
                    book.lay_prices[level][position],
                ),
                Mode::Maker => (
                    book.lay_prices[level][position],
                    book.back_prices[level][position],
                ),
            };

            orders.push(Order::proposed(
                book.market_id.clone(),
                selection_id,
                Side::Back,
                back_price,
                round_stake(back_stake),
            ));
            orders.push(Order::proposed(
                book.market_id.clone(),
                selection_id,
                Side::Lay,
                lay_price,
                round_stake(lay_stake),
            ));
        }
    }
    orders
}
