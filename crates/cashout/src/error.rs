use thiserror::Error;

/// Errors the cashout engine can raise.
///
/// Solver infeasibility is *not* represented here: the retry loop absorbs
/// it and surfaces "no hedge" as `Ok(None)`.
#[derive(Debug, Error)]
pub enum CashoutError {
    /// The configured mode string is neither `maker` nor `taker`.
    #[error("mode must be maker or taker, got {0:?}")]
    InvalidMode(String),

    /// The book snapshot has no depth levels.
    #[error("book snapshot for market {0} has no levels")]
    EmptyBook(String),

    /// Single-selection market is missing its complementary PnL entry.
    #[error("single-selection market {0} has no complementary pnl")]
    MissingComplementary(String),
}
