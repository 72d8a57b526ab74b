pub mod portfolio_coordinator;
pub mod trade_service;
