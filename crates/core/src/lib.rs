pub mod book;
pub mod config;
pub mod config_loader;
pub mod pnl;
pub mod positions;
pub mod traits;
pub mod types;

pub use book::{BookSnapshot, MAX_LAY_PRICE, MIN_BACK_PRICE};
pub use config::{AppConfig, BetfairConfig, CashoutConfig, MarketFilterConfig};
pub use config_loader::ConfigLoader;
pub use pnl::{pnl_outcomes, PnlOutcomes};
pub use positions::{
    fill_missing_selections, matched_amount, MatchedBySide, MatchedPositions, OpenPositions,
    PositionLedger,
};
pub use traits::{
    ExecutionGateway, ExecutionPlan, ExecutionReport, MarketDataProvider, MarketFilter,
    OrderProvider,
};
pub use types::{Market, MarketId, Order, PriceSize, Runner, SelectionId, Side};
