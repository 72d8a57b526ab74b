//! Position entity - an open simulated holding returned by the remote store

use crate::domain::errors::ValidationError;
use crate::domain::value_objects::{price::Price, quantity::Quantity};

/// An open simulated holding of a given ticker
///
/// The remote store assigns `id` on creation; the client never mutates a
/// position locally, it only re-fetches the full list after a trade.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub id: i64,
    pub ticker: String,
    pub quantity: Quantity,
    pub purchase_price: Price,
}

impl Position {
    /// Create a Position with validation
    ///
    /// Invariant: `quantity > 0`. The store is expected to omit closed
    /// positions entirely rather than returning them with zero quantity.
    pub fn new(
        id: i64,
        ticker: &str,
        quantity: f64,
        purchase_price: f64,
    ) -> Result<Self, ValidationError> {
        if ticker.trim().is_empty() {
            return Err(ValidationError::InvalidTicker(
                "must not be empty".to_string(),
            ));
        }
        let quantity = Quantity::positive(quantity)?;
        let purchase_price = Price::new(purchase_price)?;

        Ok(Position {
            id,
            ticker: ticker.to_string(),
            quantity,
            purchase_price,
        })
    }

    /// Acquisition cost of the holding
    pub fn cost_basis(&self) -> f64 {
        self.quantity.value() * self.purchase_price.value()
    }
}
