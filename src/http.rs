//! Shared HTTP client factory.
//!
//! Provider clients mirror the stock timeouts of the official SDKs.

use reqwest::Client;
use std::time::Duration;

/// Timeout for language-model completions (10 minutes).
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeout for billing API calls (80 seconds).
pub const BILLING_TIMEOUT: Duration = Duration::from_secs(80);

/// Create a new HTTP client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("essay-grader/", env!("CARGO_PKG_VERSION")))
        .build()
}
