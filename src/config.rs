use std::time::Duration;
use url::Url;

/// Configuration for the simulation client
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Base URL of the simulation backend
    pub api_base: String,
    /// User whose virtual ledger this client follows
    pub user_id: u64,
    /// Interval between periodic balance/portfolio syncs
    pub poll_interval: Duration,
    /// Lifetime of transient trade feedback
    pub feedback_ttl: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Fixed ticker universe offered by the trade form
    pub tickers: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000".to_string(),
            user_id: 1,
            poll_interval: Duration::from_secs(10),
            feedback_ttl: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
            tickers: vec![
                "BIAT".to_string(),
                "SFBT".to_string(),
                "SAH".to_string(),
                "EURO-CYCLES".to_string(),
            ],
        }
    }
}

impl SimulationConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults (with a warning) on missing or out-of-range values
    pub fn from_env() -> SimulationConfig {
        let mut config = SimulationConfig::default();

        if let Ok(api_base) = std::env::var("BVMT_API_BASE") {
            match Url::parse(&api_base) {
                Ok(_) => config.api_base = api_base,
                Err(e) => {
                    tracing::warn!(
                        "Invalid BVMT_API_BASE '{}': {}, using default: {}",
                        api_base,
                        e,
                        config.api_base
                    );
                }
            }
        }

        if let Ok(user_id) = std::env::var("BVMT_USER_ID") {
            match user_id.parse::<u64>() {
                Ok(value) => config.user_id = value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse BVMT_USER_ID '{}': {}, using default: {}",
                        user_id,
                        e,
                        config.user_id
                    );
                }
            }
        }

        if let Ok(interval) = std::env::var("POLL_INTERVAL_SECONDS") {
            match interval.parse::<u64>() {
                Ok(value) if (1..=300).contains(&value) => {
                    config.poll_interval = Duration::from_secs(value);
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid POLL_INTERVAL_SECONDS value: {} (must be between 1 and 300), using default: {:?}",
                        value, config.poll_interval
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse POLL_INTERVAL_SECONDS '{}': {}, using default: {:?}",
                        interval,
                        e,
                        config.poll_interval
                    );
                }
            }
        }

        if let Ok(ttl) = std::env::var("FEEDBACK_TTL_MILLISECONDS") {
            match ttl.parse::<u64>() {
                Ok(value) if (500..=30_000).contains(&value) => {
                    config.feedback_ttl = Duration::from_millis(value);
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid FEEDBACK_TTL_MILLISECONDS value: {} (must be between 500 and 30000), using default: {:?}",
                        value, config.feedback_ttl
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse FEEDBACK_TTL_MILLISECONDS '{}': {}, using default: {:?}",
                        ttl,
                        e,
                        config.feedback_ttl
                    );
                }
            }
        }

        if let Ok(timeout) = std::env::var("REQUEST_TIMEOUT_MILLISECONDS") {
            match timeout.parse::<u64>() {
                Ok(value) if (1_000..=60_000).contains(&value) => {
                    config.request_timeout = Duration::from_millis(value);
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid REQUEST_TIMEOUT_MILLISECONDS value: {} (must be between 1000 and 60000), using default: {:?}",
                        value, config.request_timeout
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse REQUEST_TIMEOUT_MILLISECONDS '{}': {}, using default: {:?}",
                        timeout,
                        e,
                        config.request_timeout
                    );
                }
            }
        }

        config
    }
}
