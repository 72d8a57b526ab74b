//! Derived-metrics calculator - pure functions, no I/O
//!
//! Turns (positions, price source) into per-line display metrics and an
//! aggregate P&L. A ticker missing from the price source falls back to the
//! position's own purchase price, so that line's P&L and ROI are exactly zero
//! rather than NaN.

use crate::domain::entities::position::Position;
use crate::domain::errors::ValidationError;
use crate::domain::repositories::price_source::PriceSource;
use crate::domain::value_objects::pnl::PnL;

/// Display metrics for a single position line
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMetrics {
    pub current_price: f64,
    pub current_value: f64,
    pub pnl: f64,
    pub roi_percent: f64,
}

/// Metrics for the whole portfolio, one line per position
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioMetrics {
    pub lines: Vec<PositionMetrics>,
    pub total_pnl: PnL,
}

/// Compute display metrics for one position against the price source
pub fn position_metrics(position: &Position, prices: &dyn PriceSource) -> PositionMetrics {
    let purchase_price = position.purchase_price.value();
    let quantity = position.quantity.value();

    let current_price = prices
        .price_for(&position.ticker)
        .map(|p| p.value())
        .unwrap_or(purchase_price);

    let cost_basis = position.cost_basis();
    let current_value = quantity * current_price;
    let pnl = current_value - cost_basis;

    // Guard: a free acquisition has no meaningful ROI
    let roi_percent = if cost_basis == 0.0 {
        0.0
    } else {
        pnl / cost_basis * 100.0
    };

    PositionMetrics {
        current_price,
        current_value,
        pnl,
        roi_percent,
    }
}

/// Compute per-line metrics and the aggregate P&L over an ordered position list
pub fn portfolio_metrics(
    positions: &[Position],
    prices: &dyn PriceSource,
) -> Result<PortfolioMetrics, ValidationError> {
    let lines: Vec<PositionMetrics> = positions
        .iter()
        .map(|position| position_metrics(position, prices))
        .collect();

    let mut total_pnl = PnL::zero();
    for line in &lines {
        total_pnl = total_pnl + PnL::new(line.pnl)?;
    }

    Ok(PortfolioMetrics { lines, total_pnl })
}

/// Aggregate ROI as a percentage of the cash balance
///
/// Yields 0 whenever `balance <= 0` instead of dividing by zero.
pub fn total_roi_percent(total_pnl: &PnL, balance: f64) -> f64 {
    if balance > 0.0 {
        total_pnl.value() / balance * 100.0
    } else {
        0.0
    }
}
