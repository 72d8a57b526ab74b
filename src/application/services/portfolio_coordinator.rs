//! PortfolioCoordinator - owns the balance and position fetch loop
//!
//! A single task fetches both datasets and publishes one snapshot on a watch
//! channel, instead of each display component running its own polling loop.
//! Triggers: once at start, every poll interval, and on every refresh-token
//! bump. The two fetches race independently; each applies its own latest
//! response and a failure in one never blocks the other.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use crate::application::refresh::RefreshToken;
use crate::application::session::Session;
use crate::domain::entities::position::Position;
use crate::domain::repositories::price_source::PriceSource;
use crate::domain::repositories::trading_client::TradingClient;
use crate::domain::services::metrics::{
    portfolio_metrics, total_roi_percent, PositionMetrics,
};
use crate::domain::value_objects::pnl::PnL;

/// Latest published state of the virtual ledger
///
/// `balance` stays `None` until the first successful balance fetch; on later
/// failures the previous value is retained rather than cleared.
#[derive(Debug, Clone)]
pub struct PortfolioView {
    pub balance: Option<f64>,
    pub positions: Vec<Position>,
    pub lines: Vec<PositionMetrics>,
    pub total_pnl: PnL,
    pub total_roi: f64,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Default for PortfolioView {
    fn default() -> Self {
        Self {
            balance: None,
            positions: Vec::new(),
            lines: Vec::new(),
            total_pnl: PnL::zero(),
            total_roi: 0.0,
            fetched_at: None,
        }
    }
}

/// Coordinates periodic and refresh-driven synchronization with the store
pub struct PortfolioCoordinator {
    client: Arc<dyn TradingClient>,
    prices: Arc<dyn PriceSource>,
    session: Session,
    poll_interval: Duration,
    refresh: RefreshToken,
}

/// Handle to a running coordinator task
///
/// All view writes happen inside the task, so once `stop` resolves no
/// in-flight response can mutate the published snapshot.
pub struct CoordinatorHandle {
    view_rx: watch::Receiver<PortfolioView>,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl CoordinatorHandle {
    /// Subscribe to snapshot updates (push-style; resolves on each publish)
    pub fn subscribe(&self) -> watch::Receiver<PortfolioView> {
        self.view_rx.clone()
    }

    /// Latest published snapshot
    pub fn view(&self) -> PortfolioView {
        self.view_rx.borrow().clone()
    }

    /// Signal shutdown and wait for the task to finish
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            if !e.is_cancelled() {
                error!("Coordinator task terminated abnormally: {}", e);
            }
        }
    }
}

impl PortfolioCoordinator {
    pub fn new(
        client: Arc<dyn TradingClient>,
        prices: Arc<dyn PriceSource>,
        session: Session,
        poll_interval: Duration,
        refresh: RefreshToken,
    ) -> Self {
        Self {
            client,
            prices,
            session,
            poll_interval,
            refresh,
        }
    }

    /// Spawn the synchronization task
    pub fn spawn(self) -> CoordinatorHandle {
        let (view_tx, view_rx) = watch::channel(PortfolioView::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(self.run(view_tx, shutdown_rx));

        CoordinatorHandle {
            view_rx,
            shutdown_tx,
            join,
        }
    }

    async fn run(
        self,
        view_tx: watch::Sender<PortfolioView>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut refresh_rx = self.refresh.subscribe();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // First tick fires immediately, covering the fetch-on-start case
                _ = ticker.tick() => {}
                changed = refresh_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!(token = *refresh_rx.borrow_and_update(), "refresh demandé");
                }
                _ = shutdown_rx.changed() => break,
            }
            self.sync_once(&view_tx).await;
        }
        debug!("Coordinator task stopped");
    }

    /// Fetch both datasets concurrently and publish a recomputed snapshot
    async fn sync_once(&self, view_tx: &watch::Sender<PortfolioView>) {
        let user_id = self.session.user_id();

        let (balance_result, positions_result) = tokio::join!(
            self.client.virtual_balance(user_id),
            self.client.portfolio(user_id),
        );

        let mut view = view_tx.borrow().clone();

        match balance_result {
            Ok(balance) => view.balance = Some(balance),
            // Stale value retained; the next trigger is the only retry
            Err(e) => warn!("Échec de la lecture du solde: {}", e),
        }

        match positions_result {
            Ok(positions) => view.positions = positions,
            Err(e) => warn!("Échec de la lecture du portefeuille: {}", e),
        }

        match portfolio_metrics(&view.positions, self.prices.as_ref()) {
            Ok(metrics) => {
                view.lines = metrics.lines;
                view.total_pnl = metrics.total_pnl;
            }
            Err(e) => {
                error!("Calcul des métriques impossible: {}", e);
                return;
            }
        }

        view.total_roi = total_roi_percent(&view.total_pnl, view.balance.unwrap_or(0.0));
        view.fetched_at = Some(Utc::now());

        debug!(
            balance = ?view.balance,
            positions = view.positions.len(),
            total_pnl = view.total_pnl.value(),
            "snapshot publié"
        );
        view_tx.send_replace(view);
    }
}
