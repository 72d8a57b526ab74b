//! TradeService - buy order submission state machine
//!
//! One submission at a time: `Idle → Submitting → {Succeeded | Failed}`, then
//! back to `Idle` once the transient feedback expires. Local validation
//! failures and remote rejections travel the same feedback path so the UI
//! treats them identically. No automatic retries; the user resubmits.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::refresh::RefreshToken;
use crate::application::session::Session;
use crate::domain::entities::order::BuyOrder;
use crate::domain::errors::{ClientError, ValidationError};
use crate::domain::repositories::trading_client::TradingClient;

/// Default lifetime of transient feedback, matching the 3 s toast
pub const DEFAULT_FEEDBACK_TTL: Duration = Duration::from_secs(3);

const MSG_SUCCESS: &str = "Achat virtuel réussi !";
const MSG_GENERIC_FAILURE: &str = "Échec de la transaction";
const MSG_INVALID_QUANTITY: &str = "La quantité doit être supérieure à 0";

#[derive(Debug, Error)]
pub enum TradeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A submission is already in flight")]
    InFlight,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("State lock poisoned")]
    StatePoisoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// Transient user-facing message, auto-cleared after the feedback TTL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    pub kind: FeedbackKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded(Feedback),
    Failed(Feedback),
}

struct StateCell {
    state: SubmissionState,
    // Ties each settled feedback to its expiry timer, so an old timer never
    // clears a newer submission's feedback
    generation: u64,
}

pub struct TradeService {
    client: Arc<dyn TradingClient>,
    refresh: RefreshToken,
    feedback_ttl: Duration,
    cell: Arc<Mutex<StateCell>>,
}

impl TradeService {
    pub fn new(client: Arc<dyn TradingClient>, refresh: RefreshToken) -> Self {
        Self::with_feedback_ttl(client, refresh, DEFAULT_FEEDBACK_TTL)
    }

    pub fn with_feedback_ttl(
        client: Arc<dyn TradingClient>,
        refresh: RefreshToken,
        feedback_ttl: Duration,
    ) -> Self {
        Self {
            client,
            refresh,
            feedback_ttl,
            cell: Arc::new(Mutex::new(StateCell {
                state: SubmissionState::Idle,
                generation: 0,
            })),
        }
    }

    pub fn state(&self) -> SubmissionState {
        match self.cell.lock() {
            Ok(cell) => cell.state.clone(),
            Err(_) => SubmissionState::Idle,
        }
    }

    /// Current transient feedback, if any
    pub fn feedback(&self) -> Option<Feedback> {
        match self.state() {
            SubmissionState::Succeeded(feedback) | SubmissionState::Failed(feedback) => {
                Some(feedback)
            }
            _ => None,
        }
    }

    /// Validate and submit a buy order for the session's user
    ///
    /// On success the shared refresh token is bumped exactly once so the
    /// portfolio coordinator re-fetches balance and positions.
    pub async fn submit_buy(
        &self,
        session: &Session,
        ticker: &str,
        quantity: f64,
        purchase_price: f64,
    ) -> Result<(), TradeError> {
        // Guard, validate, and mark in-flight under one lock so concurrent
        // submissions cannot interleave
        let order = {
            let mut cell = self.cell.lock().map_err(|_| TradeError::StatePoisoned)?;
            if cell.state == SubmissionState::Submitting {
                debug!("Submission rejected: one already in flight");
                return Err(TradeError::InFlight);
            }

            match BuyOrder::new(ticker, quantity, purchase_price) {
                Ok(order) => {
                    cell.state = SubmissionState::Submitting;
                    order
                }
                Err(e) => {
                    let message = match &e {
                        ValidationError::InvalidQuantity(_) => MSG_INVALID_QUANTITY.to_string(),
                        other => other.to_string(),
                    };
                    warn!("Ordre refusé localement: {}", e);
                    let generation = Self::settle_cell(
                        &mut cell,
                        SubmissionState::Failed(Feedback {
                            message,
                            kind: FeedbackKind::Error,
                        }),
                    );
                    drop(cell);
                    self.schedule_clear(generation);
                    return Err(TradeError::Validation(e));
                }
            }
        };

        info!(
            ticker = %order.ticker,
            quantity = order.quantity.value(),
            cost = order.estimated_cost(),
            "Soumission d'un ordre d'achat"
        );

        let result = self.client.buy(session.user_id(), &order).await;

        match result {
            Ok(()) => {
                self.settle(SubmissionState::Succeeded(Feedback {
                    message: MSG_SUCCESS.to_string(),
                    kind: FeedbackKind::Success,
                }))?;
                let token = self.refresh.bump();
                info!(token, "Achat accepté, rafraîchissement signalé");
                Ok(())
            }
            Err(e) => {
                // A rejection displays the backend's detail verbatim; anything
                // else gets the generic message
                let message = if e.is_rejection() {
                    e.to_string()
                } else {
                    MSG_GENERIC_FAILURE.to_string()
                };
                warn!("Achat refusé: {}", e);
                self.settle(SubmissionState::Failed(Feedback {
                    message,
                    kind: FeedbackKind::Error,
                }))?;
                Err(TradeError::Client(e))
            }
        }
    }

    fn settle(&self, state: SubmissionState) -> Result<(), TradeError> {
        let generation = {
            let mut cell = self.cell.lock().map_err(|_| TradeError::StatePoisoned)?;
            Self::settle_cell(&mut cell, state)
        };
        self.schedule_clear(generation);
        Ok(())
    }

    fn settle_cell(cell: &mut StateCell, state: SubmissionState) -> u64 {
        cell.generation += 1;
        cell.state = state;
        cell.generation
    }

    /// Return to Idle after the feedback TTL, unless a newer submission settled
    fn schedule_clear(&self, generation: u64) {
        let cell = Arc::clone(&self.cell);
        let ttl = self.feedback_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Ok(mut cell) = cell.lock() {
                let expired = cell.generation == generation
                    && matches!(
                        cell.state,
                        SubmissionState::Succeeded(_) | SubmissionState::Failed(_)
                    );
                if expired {
                    cell.state = SubmissionState::Idle;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    use crate::domain::entities::position::Position;
    use crate::domain::repositories::trading_client::ClientResult;

    struct MockStore {
        buy_calls: AtomicUsize,
        reject_with: Option<String>,
        hold: Option<Arc<Notify>>,
    }

    impl MockStore {
        fn accepting() -> Arc<Self> {
            Arc::new(Self {
                buy_calls: AtomicUsize::new(0),
                reject_with: None,
                hold: None,
            })
        }

        fn rejecting(detail: &str) -> Arc<Self> {
            Arc::new(Self {
                buy_calls: AtomicUsize::new(0),
                reject_with: Some(detail.to_string()),
                hold: None,
            })
        }

        fn holding(notify: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                buy_calls: AtomicUsize::new(0),
                reject_with: None,
                hold: Some(notify),
            })
        }
    }

    #[async_trait]
    impl TradingClient for MockStore {
        fn name(&self) -> &str {
            "MockStore"
        }

        async fn virtual_balance(&self, _user_id: u64) -> ClientResult<f64> {
            Ok(0.0)
        }

        async fn portfolio(&self, _user_id: u64) -> ClientResult<Vec<Position>> {
            Ok(vec![])
        }

        async fn buy(&self, _user_id: u64, _order: &BuyOrder) -> ClientResult<()> {
            self.buy_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(notify) = &self.hold {
                notify.notified().await;
            }
            if let Some(detail) = &self.reject_with {
                return Err(ClientError::Rejected {
                    status: 400,
                    detail: detail.clone(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_successful_buy_bumps_refresh_once() {
        let store = MockStore::accepting();
        let refresh = RefreshToken::new();
        let service = TradeService::new(store.clone(), refresh.clone());
        let session = Session::new(1);

        let result = service.submit_buy(&session, "BIAT", 10.0, 94.8).await;
        assert!(result.is_ok());
        assert_eq!(refresh.current(), 1);
        assert_eq!(store.buy_calls.load(Ordering::SeqCst), 1);
        assert!(matches!(service.state(), SubmissionState::Succeeded(_)));
        assert_eq!(
            service.feedback().unwrap().message,
            "Achat virtuel réussi !"
        );
    }

    #[tokio::test]
    async fn test_non_positive_quantity_never_reaches_network() {
        let store = MockStore::accepting();
        let refresh = RefreshToken::new();
        let service = TradeService::new(store.clone(), refresh.clone());
        let session = Session::new(1);

        let result = service.submit_buy(&session, "BIAT", 0.0, 94.8).await;
        assert!(matches!(result, Err(TradeError::Validation(_))));
        assert_eq!(store.buy_calls.load(Ordering::SeqCst), 0);
        assert_eq!(refresh.current(), 0);

        let feedback = service.feedback().unwrap();
        assert_eq!(feedback.kind, FeedbackKind::Error);
        assert_eq!(feedback.message, "La quantité doit être supérieure à 0");
    }

    #[tokio::test]
    async fn test_remote_rejection_surfaces_detail_without_bump() {
        let store = MockStore::rejecting("insufficient funds");
        let refresh = RefreshToken::new();
        let service = TradeService::new(store, refresh.clone());
        let session = Session::new(1);

        let result = service.submit_buy(&session, "BIAT", 10.0, 94.8).await;
        assert!(matches!(result, Err(TradeError::Client(_))));
        assert_eq!(refresh.current(), 0);
        assert_eq!(service.feedback().unwrap().message, "insufficient funds");
    }

    #[tokio::test]
    async fn test_network_failure_uses_generic_message() {
        struct FailingStore;

        #[async_trait]
        impl TradingClient for FailingStore {
            fn name(&self) -> &str {
                "FailingStore"
            }
            async fn virtual_balance(&self, _user_id: u64) -> ClientResult<f64> {
                Err(ClientError::Network("down".to_string()))
            }
            async fn portfolio(&self, _user_id: u64) -> ClientResult<Vec<Position>> {
                Err(ClientError::Network("down".to_string()))
            }
            async fn buy(&self, _user_id: u64, _order: &BuyOrder) -> ClientResult<()> {
                Err(ClientError::Network("down".to_string()))
            }
        }

        let refresh = RefreshToken::new();
        let service = TradeService::new(Arc::new(FailingStore), refresh.clone());
        let session = Session::new(1);

        let result = service.submit_buy(&session, "BIAT", 10.0, 94.8).await;
        assert!(result.is_err());
        assert_eq!(refresh.current(), 0);
        assert_eq!(
            service.feedback().unwrap().message,
            "Échec de la transaction"
        );
    }

    #[tokio::test]
    async fn test_double_submission_guard() {
        let notify = Arc::new(Notify::new());
        let store = MockStore::holding(notify.clone());
        let refresh = RefreshToken::new();
        let service = Arc::new(TradeService::new(store.clone(), refresh));
        let session = Session::new(1);

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.submit_buy(&session, "BIAT", 10.0, 94.8).await })
        };
        // Let the first submission reach the in-flight await
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(service.state(), SubmissionState::Submitting);

        let second = service.submit_buy(&session, "SFBT", 5.0, 14.2).await;
        assert!(matches!(second, Err(TradeError::InFlight)));
        assert_eq!(store.buy_calls.load(Ordering::SeqCst), 1);

        notify.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(store.buy_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_feedback_expires_back_to_idle() {
        let store = MockStore::accepting();
        let refresh = RefreshToken::new();
        let service = TradeService::with_feedback_ttl(
            store,
            refresh,
            Duration::from_millis(50),
        );
        let session = Session::new(1);

        service
            .submit_buy(&session, "BIAT", 10.0, 94.8)
            .await
            .unwrap();
        assert!(service.feedback().is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(service.state(), SubmissionState::Idle);
        assert!(service.feedback().is_none());
    }

    #[tokio::test]
    async fn test_old_timer_does_not_clear_newer_feedback() {
        let store = MockStore::accepting();
        let refresh = RefreshToken::new();
        let service = TradeService::with_feedback_ttl(
            store,
            refresh,
            Duration::from_millis(80),
        );
        let session = Session::new(1);

        service
            .submit_buy(&session, "BIAT", 10.0, 94.8)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        // Second submission settles before the first timer fires
        service
            .submit_buy(&session, "SFBT", 5.0, 14.2)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // First timer has fired by now; the newer feedback must survive
        assert!(matches!(service.state(), SubmissionState::Succeeded(_)));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(service.state(), SubmissionState::Idle);
    }
}
