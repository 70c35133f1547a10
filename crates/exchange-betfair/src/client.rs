//! Betfair REST client.
//!
//! Holds an immutable session token obtained once at login; the client is
//! then passed by reference into whatever needs exchange data.

use crate::error::{BetfairError, Result};
use crate::types::{
    ApiMarketFilter, CatalogueEntry, CurrentOrdersRequest, CurrentOrdersResponse, LoginResponse,
    MarketBookRequest, MarketCatalogueRequest, PriceProjection, RawMarketBook,
};
use bet_hedge_core::types::{Market, Order, Runner, SelectionId};
use bet_hedge_core::{BetfairConfig, BookSnapshot, MarketDataProvider, MarketFilter, OrderProvider};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Market-data request limit: `listMarketBook` accepts at most this many
/// ids per call.
const MAX_BOOK_BATCH: usize = 40;

/// Page size for `listCurrentOrders`.
const ORDERS_PAGE_SIZE: u32 = 1000;

/// Authenticated Betfair client.
#[derive(Debug)]
pub struct BetfairClient {
    http: reqwest::Client,
    config: BetfairConfig,
    session_token: String,
}

impl BetfairClient {
    /// Logs in via the interactive endpoint and returns an authenticated
    /// client.
    ///
    /// # Errors
    ///
    /// Returns [`BetfairError::Login`] when the exchange rejects the
    /// credentials, or a network error.
    pub async fn login(config: BetfairConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let response: LoginResponse = http
            .post(&config.login_url)
            .header("X-Application", &config.app_key)
            .form(&[
                ("username", config.username.as_str()),
                ("password", config.password.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "SUCCESS" {
            return Err(BetfairError::Login(response.error));
        }
        info!("betfair session established");

        Ok(Self {
            http,
            config,
            session_token: response.token,
        })
    }

    /// Builds a client around an existing session token.
    #[must_use]
    pub fn with_session(config: BetfairConfig, session_token: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            http,
            config,
            session_token,
        }
    }

    /// POSTs a typed request to one of the betting endpoints.
    pub(crate) async fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        method: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}/{method}/", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .header("X-Application", &self.config.app_key)
            .header("X-Authentication", &self.session_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BetfairError::Api {
                status_code: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// Market catalogue entries matching the filter, keyed by market id
    /// and filtered by matched volume.
    pub async fn list_market_catalogue(
        &self,
        filter: &MarketFilter,
    ) -> Result<HashMap<String, CatalogueEntry>> {
        let mut catalogue = HashMap::new();

        // One call per (event type, market type code) pair, like the
        // exchange's own request limits encourage; a market-id restriction
        // collapses to a single call.
        let api_filters: Vec<ApiMarketFilter> = if let Some(ids) = &filter.market_ids {
            vec![ApiMarketFilter {
                market_ids: Some(ids.clone()),
                ..ApiMarketFilter::default()
            }]
        } else {
            filter
                .event_type_ids
                .iter()
                .flat_map(|event_type| {
                    filter.market_type_codes.iter().map(move |code| ApiMarketFilter {
                        event_type_ids: Some(vec![event_type.clone()]),
                        market_type_codes: Some(vec![code.clone()]),
                        ..ApiMarketFilter::default()
                    })
                })
                .collect()
        };

        for api_filter in api_filters {
            let request = MarketCatalogueRequest {
                filter: api_filter,
                max_results: 1000,
                market_projection: vec!["MARKET_START_TIME".to_string()],
            };
            let entries: Vec<CatalogueEntry> =
                self.call("listMarketCatalogue", &request).await?;
            for entry in entries {
                if entry.total_matched > filter.min_volume {
                    catalogue.insert(entry.market_id.clone(), entry);
                }
            }
        }
        Ok(catalogue)
    }

    /// Market books for the given ids, batched to the API's limit.
    pub async fn list_market_books(&self, market_ids: &[String]) -> Result<Vec<RawMarketBook>> {
        let mut books = Vec::with_capacity(market_ids.len());
        for batch in market_ids.chunks(MAX_BOOK_BATCH) {
            let request = MarketBookRequest {
                market_ids: batch.to_vec(),
                price_projection: PriceProjection::default(),
            };
            let mut batch_books: Vec<RawMarketBook> =
                self.call("listMarketBook", &request).await?;
            books.append(&mut batch_books);
        }
        Ok(books)
    }

    /// All current orders, concatenated across pages in exchange order.
    pub async fn list_current_orders(&self) -> Result<Vec<Order>> {
        let mut orders = Vec::new();
        let mut from_record = 0;
        loop {
            let request = CurrentOrdersRequest {
                from_record,
                record_count: ORDERS_PAGE_SIZE,
            };
            let page: CurrentOrdersResponse = self.call("listCurrentOrders", &request).await?;
            let fetched = page.current_orders.len() as u32;
            for summary in page.current_orders {
                orders.push(summary.into_order()?);
            }
            if !page.more_available || fetched == 0 {
                break;
            }
            from_record += fetched;
        }
        debug!(count = orders.len(), "fetched current orders");
        Ok(orders)
    }

    /// Catalogue + books joined into core markets, sorted by start time.
    pub async fn fetch_active_markets(&self, filter: &MarketFilter) -> Result<Vec<Market>> {
        let catalogue = self.list_market_catalogue(filter).await?;
        let market_ids: Vec<String> = catalogue.keys().cloned().collect();
        let books = self.list_market_books(&market_ids).await?;

        let mut markets = Vec::with_capacity(books.len());
        for book in books {
            let Some(entry) = catalogue.get(&book.market_id) else {
                continue;
            };
            let runners: Vec<Runner> = book
                .runners
                .into_iter()
                .map(|raw| Runner {
                    selection_id: raw.selection_id,
                    available_to_back: raw.ex.available_to_back.into_iter().map(Into::into).collect(),
                    available_to_lay: raw.ex.available_to_lay.into_iter().map(Into::into).collect(),
                })
                .collect();
            if runners.is_empty() {
                continue;
            }
            markets.push(Market {
                market_id: book.market_id,
                start_time: entry.market_start_time,
                total_matched: entry.total_matched,
                runners,
            });
        }
        markets.sort_by_key(|m| m.start_time);
        Ok(markets)
    }
}

#[async_trait]
impl MarketDataProvider for BetfairClient {
    async fn active_markets(&self, filter: &MarketFilter) -> anyhow::Result<Vec<Market>> {
        Ok(self.fetch_active_markets(filter).await?)
    }

    async fn book_snapshot(
        &self,
        market: &Market,
        levels: usize,
        selection_ids: Option<&[SelectionId]>,
    ) -> anyhow::Result<BookSnapshot> {
        Ok(BookSnapshot::from_market(market, levels, selection_ids))
    }
}

#[async_trait]
impl OrderProvider for BetfairClient {
    async fn current_orders(&self) -> anyhow::Result<Vec<Order>> {
        Ok(self.list_current_orders().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> BetfairConfig {
        BetfairConfig {
            base_url: server.uri(),
            login_url: format!("{}/api/login", server.uri()),
            app_key: "test-key".to_string(),
            username: "user".to_string(),
            password: "pass".to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn login_success_captures_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "session-abc",
                "status": "SUCCESS",
                "error": ""
            })))
            .mount(&server)
            .await;

        let client = BetfairClient::login(config(&server)).await.unwrap();
        assert_eq!(client.session_token, "session-abc");
    }

    #[tokio::test]
    async fn login_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "",
                "status": "FAIL",
                "error": "INVALID_USERNAME_OR_PASSWORD"
            })))
            .mount(&server)
            .await;

        let err = BetfairClient::login(config(&server)).await.unwrap_err();
        assert!(matches!(err, BetfairError::Login(msg) if msg.contains("INVALID")));
    }

    fn order_json(bet_id: &str) -> serde_json::Value {
        json!({
            "betId": bet_id,
            "marketId": "1.1",
            "selectionId": 42,
            "priceSize": {"price": 2.0, "size": 10.0},
            "sizeMatched": 5.0,
            "sizeRemaining": 5.0,
            "side": "BACK"
        })
    }

    #[tokio::test]
    async fn current_orders_concatenates_pages_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/listCurrentOrders/"))
            .and(body_partial_json(json!({"fromRecord": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "currentOrders": [order_json("1"), order_json("2")],
                "moreAvailable": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/listCurrentOrders/"))
            .and(body_partial_json(json!({"fromRecord": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "currentOrders": [order_json("3")],
                "moreAvailable": false
            })))
            .mount(&server)
            .await;

        let client = BetfairClient::with_session(config(&server), "tok".to_string());
        let orders = client.list_current_orders().await.unwrap();
        let bet_ids: Vec<_> = orders
            .iter()
            .map(|o| o.bet_id.clone().unwrap())
            .collect();
        assert_eq!(bet_ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn api_error_carries_status_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/listCurrentOrders/"))
            .respond_with(ResponseTemplate::new(403).set_body_string("DENIED"))
            .mount(&server)
            .await;

        let client = BetfairClient::with_session(config(&server), "tok".to_string());
        let err = client.list_current_orders().await.unwrap_err();
        assert!(matches!(err, BetfairError::Api { status_code: 403, .. }));
    }

    #[tokio::test]
    async fn active_markets_joins_catalogue_and_books() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/listMarketCatalogue/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "marketId": "1.10",
                    "totalMatched": 5000.0,
                    "marketStartTime": "2026-09-01T12:00:00Z"
                },
                {
                    "marketId": "1.11",
                    "totalMatched": 10.0,
                    "marketStartTime": "2026-09-01T13:00:00Z"
                }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/listMarketBook/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "marketId": "1.10",
                    "runners": [
                        {"selectionId": 1, "ex": {
                            "availableToBack": [{"price": 2.0, "size": 100.0}],
                            "availableToLay": [{"price": 2.2, "size": 90.0}]
                        }},
                        {"selectionId": 2, "ex": {
                            "availableToBack": [{"price": 1.8, "size": 50.0}],
                            "availableToLay": [{"price": 1.9, "size": 60.0}]
                        }}
                    ]
                }
            ])))
            .mount(&server)
            .await;

        let client = BetfairClient::with_session(config(&server), "tok".to_string());
        let filter = MarketFilter {
            event_type_ids: vec!["1".to_string()],
            market_type_codes: vec!["MATCH_ODDS".to_string()],
            min_volume: 1000.0,
            market_ids: None,
        };
        let markets = client.fetch_active_markets(&filter).await.unwrap();

        // 1.11 is filtered out by volume before books are even requested.
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].market_id, "1.10");
        assert_eq!(markets[0].runners.len(), 2);
        assert_eq!(markets[0].runners[0].available_to_back[0].price, 2.0);
        assert!((markets[0].total_matched - 5000.0).abs() < f64::EPSILON);
    }
}
