//! Domain types shared across the workspace.
//!
//! Prices are decimal exchange odds (e.g. `2.5` pays 1.5 units of profit per
//! unit staked), sizes and stakes are account-currency amounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Market identifier as used by the exchange (e.g. `"1.234567890"`).
pub type MarketId = String;

/// Selection (runner) identifier within a market.
pub type SelectionId = u64;

// =============================================================================
// Side
// =============================================================================

/// Which side of a bet an order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Betting on the outcome to happen.
    Back,
    /// Betting against the outcome; symmetric risk/reward to the
    /// corresponding back bet.
    Lay,
}

impl Side {
    /// Returns the exchange wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Back => "BACK",
            Self::Lay => "LAY",
        }
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BACK" => Ok(Self::Back),
            "LAY" => Ok(Self::Lay),
            other => Err(anyhow::anyhow!("unknown side: {other}")),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A single order on the exchange, placed or proposed.
///
/// `size_remaining > 0` marks it open on the book; `size_matched > 0` marks
/// it (partially) filled. Both can hold at once for a partially matched
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub price: f64,
    pub size_remaining: f64,
    pub size_matched: f64,
    pub side: Side,
    /// Exchange-assigned id; `None` for orders not yet submitted.
    pub bet_id: Option<String>,
}

impl Order {
    /// Creates a proposed (not yet submitted) order.
    #[must_use]
    pub fn proposed(
        market_id: impl Into<MarketId>,
        selection_id: SelectionId,
        side: Side,
        price: f64,
        size: f64,
    ) -> Self {
        Self {
            market_id: market_id.into(),
            selection_id,
            price,
            size_remaining: size,
            size_matched: 0.0,
            side,
            bet_id: None,
        }
    }

    /// True if any part of the order is still resting on the book.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.size_remaining > 0.0
    }

    /// True if any part of the order has been filled.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.size_matched > 0.0
    }
}

// =============================================================================
// Market data
// =============================================================================

/// One price level of available liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSize {
    pub price: f64,
    pub size: f64,
}

/// One selection's ladder of available prices, best price first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub selection_id: SelectionId,
    pub available_to_back: Vec<PriceSize>,
    pub available_to_lay: Vec<PriceSize>,
}

/// An active market with its runners' liquidity ladders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub market_id: MarketId,
    pub start_time: DateTime<Utc>,
    pub total_matched: f64,
    pub runners: Vec<Runner>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("back".parse::<Side>().unwrap(), Side::Back);
        assert_eq!("LAY".parse::<Side>().unwrap(), Side::Lay);
        assert_eq!("Lay".parse::<Side>().unwrap(), Side::Lay);
        assert!("YES".parse::<Side>().is_err());
    }

    #[test]
    fn order_open_and_matched_flags() {
        let mut order = Order::proposed("1.1", 42, Side::Back, 2.0, 10.0);
        assert!(order.is_open());
        assert!(!order.is_matched());

        order.size_matched = 4.0;
        order.size_remaining = 6.0;
        assert!(order.is_open());
        assert!(order.is_matched());
    }

    #[test]
    fn side_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Side::Back).unwrap(), "\"BACK\"");
        let side: Side = serde_json::from_str("\"LAY\"").unwrap();
        assert_eq!(side, Side::Lay);
    }
}
