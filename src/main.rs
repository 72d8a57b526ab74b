use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bvmt_sim::application::refresh::RefreshToken;
use bvmt_sim::application::services::portfolio_coordinator::{
    PortfolioCoordinator, PortfolioView,
};
use bvmt_sim::application::services::trade_service::{FeedbackKind, TradeService};
use bvmt_sim::application::session::Session;
use bvmt_sim::config::SimulationConfig;
use bvmt_sim::domain::repositories::price_source::{PriceSource, StaticPriceTable};
use bvmt_sim::domain::repositories::trading_client::TradingClient;
use bvmt_sim::infrastructure::rest_client::RestTradingClient;

fn log_view(view: &PortfolioView) {
    match view.balance {
        Some(balance) => info!(
            "Capital virtuel: {:.2} TND | P&L total: {} | ROI global: {:+.2}%",
            balance, view.total_pnl, view.total_roi
        ),
        None => info!("Capital virtuel: --- | P&L total: {}", view.total_pnl),
    }
    for (position, line) in view.positions.iter().zip(view.lines.iter()) {
        info!(
            "  {} x{} @ {} -> {:.2} (P&L {:+.1}, ROI {:+.1}%)",
            position.ticker,
            position.quantity.value(),
            position.purchase_price,
            line.current_price,
            line.pnl,
            line.roi_percent
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bvmt_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimulationConfig::from_env();

    info!("Simulateur BVMT démarrage...");
    info!("Backend: {}", config.api_base);
    info!("Valeurs disponibles: {}", config.tickers.join(", "));

    let session = Session::new(config.user_id);
    let client: Arc<dyn TradingClient> = Arc::new(RestTradingClient::new(&config)?);
    let prices: Arc<dyn PriceSource> = Arc::new(StaticPriceTable::bvmt_demo());
    let refresh = RefreshToken::new();

    let coordinator = PortfolioCoordinator::new(
        Arc::clone(&client),
        Arc::clone(&prices),
        session,
        config.poll_interval,
        refresh.clone(),
    );
    let handle = coordinator.spawn();
    let mut view_rx = handle.subscribe();

    let trade_service =
        TradeService::with_feedback_ttl(Arc::clone(&client), refresh, config.feedback_ttl);

    info!("Commandes: buy <VALEUR> <QUANTITÉ> | quit");
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Arrêt demandé");
                break;
            }
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = view_rx.borrow_and_update().clone();
                log_view(&view);
            }
            line = stdin.next_line() => {
                let Ok(Some(line)) = line else { break };
                let parts: Vec<&str> = line.split_whitespace().collect();
                match parts.as_slice() {
                    ["quit"] | ["exit"] => break,
                    ["buy", ticker, quantity] => {
                        let quantity: f64 = quantity.parse().unwrap_or(0.0);
                        // Pre-fill with the demo quote, as the trade form does
                        let price = prices
                            .price_for(ticker)
                            .map(|p| p.value())
                            .unwrap_or(0.0);
                        match trade_service.submit_buy(&session, ticker, quantity, price).await {
                            Ok(()) => {}
                            Err(e) => warn!("Ordre non exécuté: {}", e),
                        }
                        if let Some(feedback) = trade_service.feedback() {
                            match feedback.kind {
                                FeedbackKind::Success => info!("{}", feedback.message),
                                FeedbackKind::Error => error!("{}", feedback.message),
                            }
                        }
                    }
                    [] => {}
                    _ => warn!("Commande inconnue: {}", line),
                }
            }
        }
    }

    handle.stop().await;
    info!("Simulateur arrêté");
    Ok(())
}
