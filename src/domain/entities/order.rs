use chrono::{DateTime, Utc};

use crate::domain::errors::ValidationError;
use crate::domain::value_objects::{price::Price, quantity::Quantity};

/// A simulated buy order, validated client-side before any network call
#[derive(Debug, Clone, PartialEq)]
pub struct BuyOrder {
    pub ticker: String,
    pub quantity: Quantity,
    pub purchase_price: Price,
    pub placed_at: DateTime<Utc>,
}

impl BuyOrder {
    /// Create a BuyOrder with validation
    ///
    /// # Errors
    /// Rejects non-positive quantities and empty tickers without touching the
    /// network; the caller surfaces these exactly like remote rejections.
    pub fn new(ticker: &str, quantity: f64, purchase_price: f64) -> Result<Self, ValidationError> {
        if ticker.trim().is_empty() {
            return Err(ValidationError::InvalidTicker(
                "must not be empty".to_string(),
            ));
        }
        let quantity = Quantity::positive(quantity)?;
        let purchase_price = Price::new(purchase_price)?;

        Ok(BuyOrder {
            ticker: ticker.to_string(),
            quantity,
            purchase_price,
            placed_at: Utc::now(),
        })
    }

    /// Total order cost shown to the user before submitting
    pub fn estimated_cost(&self) -> f64 {
        self.quantity.value() * self.purchase_price.value()
    }
}
