//! Position-neutralization ("cashout") engine.
//!
//! Given a market's order-book snapshot and the matched bets held on it,
//! the engine computes hedge orders that maximize expected PnL subject to a
//! bound on how much the outcome-by-outcome PnL may still disperse after
//! hedging. Single-selection markets use a closed form; everything else
//! goes through the pluggable cone solver with a bounded
//! tolerance-doubling retry loop around infeasibility.

pub mod engine;
pub mod error;
pub mod materialize;
pub mod types;

pub use engine::CashoutEngine;
pub use error::CashoutError;
pub use types::{CashoutResult, Mode};

/// Risk tolerances are doubled on solver failure up to this ceiling;
/// beyond it a hedge is considered economically meaningless and the engine
/// reports "no hedge" instead.
pub const MAX_STD_CEILING: f64 = 10.0;
