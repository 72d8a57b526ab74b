//! Refresh token - monotonic "re-fetch now" signal
//!
//! A successful trade bumps the counter; the portfolio coordinator re-fetches
//! whenever it observes a new value. The counter lives on a watch channel, is
//! purely in-memory, and is never persisted.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct RefreshToken {
    tx: Arc<watch::Sender<u64>>,
}

impl RefreshToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0u64);
        Self { tx: Arc::new(tx) }
    }

    /// Increment the counter and wake all subscribers
    pub fn bump(&self) -> u64 {
        self.tx.send_modify(|token| *token += 1);
        *self.tx.borrow()
    }

    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Receiver that resolves on every bump after subscription
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for RefreshToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_is_monotonic() {
        let token = RefreshToken::new();
        assert_eq!(token.current(), 0);
        assert_eq!(token.bump(), 1);
        assert_eq!(token.bump(), 2);
        assert_eq!(token.current(), 2);
    }

    #[test]
    fn test_clones_share_counter() {
        let token = RefreshToken::new();
        let clone = token.clone();
        token.bump();
        assert_eq!(clone.current(), 1);
    }

    #[tokio::test]
    async fn test_subscriber_sees_bump() {
        let token = RefreshToken::new();
        let mut rx = token.subscribe();

        token.bump();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }
}
