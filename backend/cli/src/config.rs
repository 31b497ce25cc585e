use serde::Deserialize;

/// PostLens runtime configuration.
///
/// Secrets and endpoints are read from the hosting environment; everything is
/// optional except the listen parameters, which default sensibly. A missing
/// webhook URL disables the relay rather than failing.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Log level fallback when RUST_LOG is unset
    pub log_level: String,
    /// Directory for rolling NDJSON log files
    pub log_dir: String,
    /// OpenAI API key for the understanding service
    pub openai_api_key: Option<String>,
    /// Vision model identifier
    pub vision_model: Option<String>,
    /// Mattermost incoming webhook URL
    pub mattermost_webhook_url: Option<String>,
    /// Extraction fan-out width
    pub fanout_concurrency: usize,
    /// Per-call timeout for understanding requests, in seconds
    pub call_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            openai_api_key: None,
            vision_model: None,
            mattermost_webhook_url: None,
            fanout_concurrency: 4,
            call_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("POSTLENS_BIND")
                .unwrap_or(defaults.bind_address),
            port: std::env::var("POSTLENS_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: std::env::var("POSTLENS_LOG_DIR").unwrap_or(defaults.log_dir),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            vision_model: std::env::var("POSTLENS_VISION_MODEL").ok(),
            mattermost_webhook_url: std::env::var("MATTERMOST_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            fanout_concurrency: std::env::var("POSTLENS_FANOUT_CONCURRENCY")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.fanout_concurrency),
            call_timeout_secs: std::env::var("POSTLENS_CALL_TIMEOUT_SECS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.call_timeout_secs),
        }
    }
}
