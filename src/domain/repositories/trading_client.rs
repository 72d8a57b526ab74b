//! Trading Client Trait
//!
//! Common interface for the remote simulated trading store. The application
//! layer depends on this abstraction only, which keeps the coordinator and
//! trade service independent of the HTTP implementation and easy to mock in
//! tests.

use async_trait::async_trait;

use crate::domain::entities::order::BuyOrder;
use crate::domain::entities::position::Position;
use crate::domain::errors::ClientError;

/// Common result type for trading store operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Client for the remote store that owns balances and positions
///
/// All reads are idempotent GETs; the store is the single source of truth and
/// the client never merges results optimistically.
#[async_trait]
pub trait TradingClient: Send + Sync {
    /// Name of this backend, for logging
    fn name(&self) -> &str;

    /// Current simulated cash balance for a user
    async fn virtual_balance(&self, user_id: u64) -> ClientResult<f64>;

    /// Full list of currently open positions for a user
    async fn portfolio(&self, user_id: u64) -> ClientResult<Vec<Position>>;

    /// Submit a buy order; the store persists the resulting position
    async fn buy(&self, user_id: u64, order: &BuyOrder) -> ClientResult<()>;
}
