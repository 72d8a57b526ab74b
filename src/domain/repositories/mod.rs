pub mod price_source;
pub mod trading_client;
