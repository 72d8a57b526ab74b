//! Price Source Trait
//!
//! The metrics calculator looks prices up through this interface so a live
//! market feed can replace the demo quote table without touching the
//! calculator.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::value_objects::price::Price;

/// Reference prices used for the demo simulation, matching the fixed BVMT
/// universe the trade form offers.
static BVMT_DEMO_QUOTES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("BIAT", 94.8),
        ("SFBT", 14.2),
        ("SAH", 8.95),
        ("EURO-CYCLES", 13.7),
    ])
});

/// Lookup of the current reference price for a ticker
///
/// Returning `None` is not an error: callers fall back to the position's own
/// purchase price so P&L degrades to zero instead of failing the view.
pub trait PriceSource: Send + Sync {
    fn price_for(&self, ticker: &str) -> Option<Price>;
}

/// Static in-memory price table standing in for live market data
#[derive(Debug, Clone, Default)]
pub struct StaticPriceTable {
    prices: HashMap<String, Price>,
}

impl StaticPriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-loaded with the demo BVMT quotes
    pub fn bvmt_demo() -> Self {
        let prices = BVMT_DEMO_QUOTES
            .iter()
            .filter_map(|(ticker, value)| {
                Price::new(*value).ok().map(|p| (ticker.to_string(), p))
            })
            .collect();
        Self { prices }
    }

    pub fn insert(&mut self, ticker: &str, price: Price) {
        self.prices.insert(ticker.to_string(), price);
    }

    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.prices.keys().cloned().collect();
        tickers.sort();
        tickers
    }
}

impl PriceSource for StaticPriceTable {
    fn price_for(&self, ticker: &str) -> Option<Price> {
        self.prices.get(ticker).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_table_has_fixed_universe() {
        let table = StaticPriceTable::bvmt_demo();
        assert_eq!(table.price_for("BIAT").unwrap().value(), 94.8);
        assert_eq!(table.price_for("SFBT").unwrap().value(), 14.2);
        assert_eq!(table.price_for("SAH").unwrap().value(), 8.95);
        assert_eq!(table.price_for("EURO-CYCLES").unwrap().value(), 13.7);
    }

    #[test]
    fn test_missing_ticker_returns_none() {
        let table = StaticPriceTable::bvmt_demo();
        assert!(table.price_for("XYZ").is_none());
    }

    #[test]
    fn test_insert_overrides_quote() {
        let mut table = StaticPriceTable::new();
        table.insert("BIAT", Price::new(92.5).unwrap());
        assert_eq!(table.price_for("BIAT").unwrap().value(), 92.5);
    }

    #[test]
    fn test_tickers_sorted() {
        let table = StaticPriceTable::bvmt_demo();
        assert_eq!(
            table.tickers(),
            vec!["BIAT", "EURO-CYCLES", "SAH", "SFBT"]
        );
    }
}
