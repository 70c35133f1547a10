//! Collaborator seams the engine depends on.
//!
//! The exchange crate implements these; the report and CLI layers consume
//! them, so the core never touches HTTP directly.

use crate::book::BookSnapshot;
use crate::types::{Market, MarketId, Order, SelectionId};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Filter for selecting active markets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketFilter {
    pub event_type_ids: Vec<String>,
    pub market_type_codes: Vec<String>,
    pub min_volume: f64,
    /// When set, restrict to exactly these markets.
    pub market_ids: Option<Vec<MarketId>>,
}

/// Cancel / replace / place instructions for one evaluation cycle.
///
/// Execution is best-effort and non-transactional: each instruction is
/// attempted independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub cancel: Vec<Order>,
    pub replace: Vec<Order>,
    pub place: Vec<Order>,
}

/// Outcome counts of a best-effort execution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub succeeded: usize,
    pub failed: usize,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Active markets matching the filter, ordered by start time.
    async fn active_markets(&self, filter: &MarketFilter) -> Result<Vec<Market>>;

    /// Normalized book snapshot for one market.
    async fn book_snapshot(
        &self,
        market: &Market,
        levels: usize,
        selection_ids: Option<&[SelectionId]>,
    ) -> Result<BookSnapshot>;
}

#[async_trait]
pub trait OrderProvider: Send + Sync {
    /// All currently placed orders, complete and order-preserving across
    /// pagination.
    async fn current_orders(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Attempts every instruction in the plan, logging failures without
    /// aborting the rest.
    async fn execute(&self, plan: &ExecutionPlan) -> ExecutionReport;
}
