//! Terminal logging of provider exchanges with configurable verbosity.
//!
//! Supports three verbosity levels:
//! - Minimal: One-liner nginx-style
//! - Compact: Request and outcome arrows on two lines
//! - Verbose: Full block with separators
//!
//! Essay text and API keys never reach these lines.

use crate::config::LogVerbosity;
use chrono::{DateTime, Utc};
use std::time::Instant;
use uuid::Uuid;

/// One outbound call made on behalf of an endpoint.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Inbound route that triggered the call, e.g. "/grade".
    pub endpoint: &'static str,
    /// Provider name, e.g. "openai".
    pub provider: &'static str,
    /// What was asked for, e.g. "History Paper 2 via gpt-4-turbo".
    pub subject: String,
    pub status: u16,
    pub total_ms: u64,
    /// Error category, e.g. "provider_error".
    pub error_type: Option<&'static str>,
    pub error: Option<String>,
    start_time: Instant,
}

impl Exchange {
    /// Start timing an exchange.
    pub fn start(endpoint: &'static str, provider: &'static str, subject: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            endpoint,
            provider,
            subject: subject.into(),
            status: 0,
            total_ms: 0,
            error_type: None,
            error: None,
            start_time: Instant::now(),
        }
    }

    /// Record the response status and elapsed time.
    pub fn finish(&mut self, status: u16) {
        self.total_ms = self.start_time.elapsed().as_millis() as u64;
        self.status = status;
    }

    /// Record a failed outcome along with its category and message.
    pub fn fail(&mut self, status: u16, error_type: &'static str, message: impl Into<String>) {
        self.finish(status);
        self.error_type = Some(error_type);
        self.error = Some(message.into());
    }

    pub fn succeeded(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Format duration in human-readable form.
fn format_duration(ms: u64) -> String {
    if ms >= 1000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{}ms", ms)
    }
}

/// Format an exchange for terminal output.
pub fn format_exchange(exchange: &Exchange, verbosity: &LogVerbosity) -> String {
    match verbosity {
        LogVerbosity::Minimal => format_minimal(exchange),
        LogVerbosity::Compact => format_compact(exchange),
        LogVerbosity::Verbose => format_verbose(exchange),
    }
}

fn format_minimal(exchange: &Exchange) -> String {
    let line = format!(
        "POST {} {} {} {} [{}]",
        exchange.endpoint,
        exchange.status,
        format_duration(exchange.total_ms),
        exchange.provider,
        exchange.subject
    );

    match exchange.error_type {
        Some(error_type) => format!("{} {}", line, error_type),
        None => line,
    }
}

/// "provider_error: message", or just the message when uncategorized.
fn describe_error(exchange: &Exchange) -> Option<String> {
    let message = exchange.error.as_deref()?;
    Some(match exchange.error_type {
        Some(error_type) => format!("{}: {}", error_type, message),
        None => message.to_string(),
    })
}

fn format_compact(exchange: &Exchange) -> String {
    let request_line = format!(
        "→ POST {} [{}] via {}",
        exchange.endpoint, exchange.subject, exchange.provider
    );

    let duration = format_duration(exchange.total_ms);
    let response_line = match describe_error(exchange) {
        None => format!("← {} OK ({})", exchange.status, duration),
        Some(error) => format!("← {} ERROR ({}): {}", exchange.status, duration, error),
    };

    format!("{}\n{}", request_line, response_line)
}

fn format_verbose(exchange: &Exchange) -> String {
    let separator = "────────────────────────────────────────";
    let status_text = if exchange.succeeded() { "OK" } else { "ERROR" };
    let error = describe_error(exchange).unwrap_or_else(|| "-".to_string());

    format!(
        "{separator}\n\
         POST {endpoint}\n\
         Request:  {id} at {timestamp}\n\
         Provider: {provider}\n\
         Subject:  {subject}\n\
         Status:   {status} {status_text}\n\
         Timing:   {duration} total\n\
         Error:    {error}\n\
         {separator}",
        separator = separator,
        endpoint = exchange.endpoint,
        id = exchange.id,
        timestamp = exchange.timestamp.to_rfc3339(),
        provider = exchange.provider,
        subject = exchange.subject,
        status = exchange.status,
        status_text = status_text,
        duration = format_duration(exchange.total_ms),
        error = error,
    )
}

/// Emit a finished exchange through `tracing`.
pub fn log_exchange(exchange: &Exchange, verbosity: &LogVerbosity) {
    let line = format_exchange(exchange, verbosity);
    if exchange.succeeded() {
        tracing::info!(request_id = %exchange.id, "{}", line);
    } else {
        tracing::warn!(
            request_id = %exchange.id,
            error_type = exchange.error_type.unwrap_or("-"),
            "{}",
            line
        );
    }
}
