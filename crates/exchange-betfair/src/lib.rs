//! Betfair exchange integration.
//!
//! A thin REST client over Betfair's betting API: interactive session
//! login, market catalogue/book fetching, paginated current-orders
//! retrieval, and a best-effort execution gateway. Everything is
//! normalized into `bet-hedge-core` types at this boundary.

pub mod client;
pub mod error;
pub mod executor;
pub mod types;

pub use client::BetfairClient;
pub use error::BetfairError;
pub use executor::BetfairExecutor;
