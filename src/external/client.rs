use std::time::Duration;

use crate::config::MessagingConfig;
use crate::error::{AppError, AppResult};

/// User-Agent sent with every upstream request
pub fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), crate::pkg_version())
}

/// Build the HTTP client shared by the OAuth token exchange and FCM sends
///
/// One client per process keeps connections to Google pooled across
/// requests. Timeouts come from `[messaging]`.
pub fn build_http_client(config: &MessagingConfig) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        // Connection pooling
        .pool_max_idle_per_host(config.max_concurrency.min(64))
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        .gzip(true)
        .user_agent(user_agent())
        .build()
        .map_err(|e| {
            AppError::configuration("messaging", format!("Failed to build HTTP client: {}", e))
        })
}
