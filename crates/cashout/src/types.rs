use crate::error::CashoutError;
use bet_hedge_core::Order;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How hedge orders are priced against the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Rest passively on the book.
    Maker,
    /// Cross the spread for immediate fills.
    Taker,
}

impl FromStr for Mode {
    type Err = CashoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maker" => Ok(Self::Maker),
            "taker" => Ok(Self::Taker),
            other => Err(CashoutError::InvalidMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Maker => write!(f, "maker"),
            Self::Taker => write!(f, "taker"),
        }
    }
}

/// Outcome of one neutralization computation.
///
/// `worst_outcome_after` is never populated by the multi-selection path;
/// the field exists so every caller sees the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashoutResult {
    pub orders: Vec<Order>,
    pub expected_pnl_before: Option<f64>,
    pub expected_pnl_after: Option<f64>,
    pub worst_outcome_before: Option<f64>,
    pub worst_outcome_after: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("taker".parse::<Mode>().unwrap(), Mode::Taker);
        assert_eq!("MAKER".parse::<Mode>().unwrap(), Mode::Maker);
    }

    #[test]
    fn invalid_mode_is_a_config_error() {
        let err = "immediate".parse::<Mode>().unwrap_err();
        assert!(matches!(err, CashoutError::InvalidMode(m) if m == "immediate"));
    }
}
