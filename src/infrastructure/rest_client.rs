//! REST implementation of the trading store client
//!
//! Speaks the simulation backend's JSON contract:
//! - `GET  /api/user/balance/{user_id}`   -> `{ "virtual_balance": f64 }`
//! - `GET  /api/user/portfolio/{user_id}` -> `[{ id, ticker, quantity, purchase_price }]`
//! - `POST /api/trade/buy`                -> 2xx, or non-2xx with `{ "detail": str }`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SimulationConfig;
use crate::domain::entities::order::BuyOrder;
use crate::domain::entities::position::Position;
use crate::domain::errors::ClientError;
use crate::domain::repositories::trading_client::{ClientResult, TradingClient};

const USER_AGENT: &str = concat!("bvmt-sim/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    virtual_balance: f64,
}

#[derive(Debug, Deserialize)]
struct PositionDto {
    id: i64,
    ticker: String,
    quantity: f64,
    purchase_price: f64,
}

#[derive(Debug, Serialize)]
struct BuyRequest<'a> {
    user_id: u64,
    ticker: &'a str,
    quantity: f64,
    purchase_price: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

pub struct RestTradingClient {
    client: Client,
    api_base: String,
}

impl RestTradingClient {
    pub fn new(config: &SimulationConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Decode portfolio rows, skipping those that violate domain invariants
    ///
    /// The store is trusted but unverified; one bad row must not blank the
    /// whole view, so it is dropped with a warning instead.
    fn decode_positions(rows: Vec<PositionDto>) -> Vec<Position> {
        rows.into_iter()
            .filter_map(|row| {
                match Position::new(row.id, &row.ticker, row.quantity, row.purchase_price) {
                    Ok(position) => Some(position),
                    Err(e) => {
                        warn!(id = row.id, ticker = %row.ticker, "Position ignorée: {}", e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Map a non-2xx response to a rejection carrying the backend's `detail`
    async fn into_rejection(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => format!("HTTP {}", status),
        };
        ClientError::Rejected { status, detail }
    }
}

#[async_trait]
impl TradingClient for RestTradingClient {
    fn name(&self) -> &str {
        "BVMT-Sim"
    }

    async fn virtual_balance(&self, user_id: u64) -> ClientResult<f64> {
        let url = format!("{}/api/user/balance/{}", self.api_base, user_id);
        debug!(%url, "GET balance");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::into_rejection(response).await);
        }

        let body: BalanceResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(body.virtual_balance)
    }

    async fn portfolio(&self, user_id: u64) -> ClientResult<Vec<Position>> {
        let url = format!("{}/api/user/portfolio/{}", self.api_base, user_id);
        debug!(%url, "GET portfolio");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::into_rejection(response).await);
        }

        let rows: Vec<PositionDto> = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(Self::decode_positions(rows))
    }

    async fn buy(&self, user_id: u64, order: &BuyOrder) -> ClientResult<()> {
        let url = format!("{}/api/trade/buy", self.api_base);
        let request = BuyRequest {
            user_id,
            ticker: &order.ticker,
            quantity: order.quantity.value(),
            purchase_price: order.purchase_price.value(),
        };
        debug!(%url, ticker = %order.ticker, "POST buy");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::into_rejection(response).await);
        }

        Ok(())
    }
}
