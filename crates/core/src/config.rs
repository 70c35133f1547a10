use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub betfair: BetfairConfig,
    pub cashout: CashoutConfig,
    pub filters: MarketFilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetfairConfig {
    pub base_url: String,
    pub login_url: String,
    pub app_key: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashoutConfig {
    /// `"maker"` or `"taker"`; parsed by the cashout engine, anything else
    /// is a fatal configuration error there.
    pub mode: String,
    pub max_std_allowed: f64,
    pub constrain_by_volume: bool,
    /// Order-book depth used when normalizing snapshots.
    pub book_levels: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketFilterConfig {
    pub event_type_ids: Vec<String>,
    pub market_type_codes: Vec<String>,
    pub min_volume: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            betfair: BetfairConfig {
                base_url: "https://api.betfair.com/exchange/betting/rest/v1.0".to_string(),
                login_url: "https://identitysso.betfair.com/api/login".to_string(),
                app_key: String::new(),
                username: String::new(),
                password: String::new(),
                timeout_secs: 30,
            },
            cashout: CashoutConfig {
                mode: "taker".to_string(),
                max_std_allowed: 0.05,
                constrain_by_volume: true,
                book_levels: 3,
            },
            filters: MarketFilterConfig {
                event_type_ids: vec!["1".to_string()], // soccer
                market_type_codes: vec![
                    "MATCH_ODDS".to_string(),
                    "BOTH_TEAMS_TO_SCORE".to_string(),
                    "OVER_UNDER_25".to_string(),
                ],
                min_volume: 1000.0,
            },
        }
    }
}
