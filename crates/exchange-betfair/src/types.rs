//! Raw wire types for the Betfair betting API, and their normalization
//! into core types.

use crate::error::{BetfairError, Result};
use bet_hedge_core::types::{Order, PriceSize, Side};
use serde::{Deserialize, Serialize};

// =============================================================================
// Session
// =============================================================================

/// Response from the interactive login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error: String,
}

// =============================================================================
// Market catalogue and books
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCatalogueRequest {
    pub filter: ApiMarketFilter,
    pub max_results: u32,
    pub market_projection: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarketFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_type_codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    pub market_id: String,
    #[serde(default)]
    pub total_matched: f64,
    pub market_start_time: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketBookRequest {
    pub market_ids: Vec<String>,
    pub price_projection: PriceProjection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceProjection {
    pub price_data: Vec<String>,
    pub virtualise: bool,
}

impl Default for PriceProjection {
    fn default() -> Self {
        Self {
            price_data: vec!["EX_BEST_OFFERS".to_string()],
            virtualise: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMarketBook {
    pub market_id: String,
    #[serde(default)]
    pub runners: Vec<RawRunner>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRunner {
    pub selection_id: u64,
    #[serde(default)]
    pub ex: RawExchangePrices,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExchangePrices {
    #[serde(default)]
    pub available_to_back: Vec<RawPriceSize>,
    #[serde(default)]
    pub available_to_lay: Vec<RawPriceSize>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawPriceSize {
    pub price: f64,
    pub size: f64,
}

impl From<RawPriceSize> for PriceSize {
    fn from(raw: RawPriceSize) -> Self {
        Self {
            price: raw.price,
            size: raw.size,
        }
    }
}

// =============================================================================
// Current orders
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrdersRequest {
    pub from_record: u32,
    pub record_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrdersResponse {
    #[serde(default)]
    pub current_orders: Vec<CurrentOrderSummary>,
    #[serde(default)]
    pub more_available: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrderSummary {
    pub bet_id: String,
    pub market_id: String,
    pub selection_id: u64,
    pub price_size: RawPriceSize,
    #[serde(default)]
    pub size_matched: f64,
    #[serde(default)]
    pub size_remaining: f64,
    pub side: String,
}

impl CurrentOrderSummary {
    /// Normalizes a wire order into the core representation.
    ///
    /// # Errors
    ///
    /// Returns [`BetfairError::Malformed`] when the side string is not
    /// BACK/LAY.
    pub fn into_order(self) -> Result<Order> {
        let side: Side = self
            .side
            .parse()
            .map_err(|_| BetfairError::Malformed(format!("side {:?}", self.side)))?;
        Ok(Order {
            market_id: self.market_id,
            selection_id: self.selection_id,
            price: self.price_size.price,
            size_remaining: self.size_remaining,
            size_matched: self.size_matched,
            side,
            bet_id: Some(self.bet_id),
        })
    }
}

// =============================================================================
// Order instructions
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrdersRequest {
    pub market_id: String,
    pub instructions: Vec<PlaceInstruction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInstruction {
    pub selection_id: u64,
    pub side: String,
    pub order_type: String,
    pub limit_order: LimitOrder,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitOrder {
    pub size: f64,
    pub price: f64,
    pub persistence_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrdersRequest {
    pub market_id: String,
    pub instructions: Vec<CancelInstruction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelInstruction {
    pub bet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_reduction: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOrdersRequest {
    pub market_id: String,
    pub instructions: Vec<ReplaceInstruction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceInstruction {
    pub bet_id: String,
    pub new_price: f64,
}

/// Execution report shared by place/cancel/replace responses; only the
/// overall status is inspected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionReport {
    #[serde(default)]
    pub status: String,
}

impl InstructionReport {
    /// Whether the exchange accepted the instruction batch.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "SUCCESS"
    }
}
