//! HTTP surface of the essay grader.
//!
//! Endpoints:
//! - GET / - Submission form
//! - GET /success - Subscription confirmation
//! - GET /health - Health check
//! - POST /grade - Grade an essay (rate limited per client address)
//! - POST /create-checkout-session - Start a subscription checkout

mod handlers;
#[cfg(test)]
mod tests;
mod types;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_embed::Embed;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::limiter::{enforce_quota, RateLimiter};
use crate::providers::{BillingProvider, GradingProvider, OpenAiGrader, StripeBilling};

pub use handlers::SUCCESS_PAGE;
pub use types::*;

#[derive(Embed)]
#[folder = "static/"]
struct StaticAssets;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub grader: Arc<dyn GradingProvider>,
    pub billing: Arc<dyn BillingProvider>,
    pub limiter: RateLimiter,
}

impl AppState {
    /// Assemble state around the given providers.
    pub fn new(
        config: Config,
        grader: Arc<dyn GradingProvider>,
        billing: Arc<dyn BillingProvider>,
    ) -> Self {
        let limiter = RateLimiter::from_config(&config.rate_limit);
        Self {
            config: Arc::new(config),
            grader,
            billing,
            limiter,
        }
    }

    /// Build the OpenAI and Stripe clients from configuration.
    pub fn from_config(config: Config) -> reqwest::Result<Self> {
        let grader = OpenAiGrader::new(config.api_keys.openai.clone().unwrap_or_default())?
            .with_model(&config.grading.model)
            .with_base_url(&config.grading.openai_base_url);
        let billing = StripeBilling::new(config.api_keys.stripe_secret.clone().unwrap_or_default())?
            .with_base_url(&config.billing.stripe_base_url);

        Ok(Self::new(config, Arc::new(grader), Arc::new(billing)))
    }
}

/// Create the router with the given state.
pub fn create_router(state: AppState) -> Router {
    let quota = middleware::from_fn_with_state(state.limiter.clone(), enforce_quota);

    Router::new()
        .route("/", get(handlers::index))
        .route("/success", get(handlers::success))
        .route("/health", get(handlers::health_check))
        .route("/grade", post(handlers::grade).layer(quota))
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .fallback(static_handler)
        .with_state(Arc::new(state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Serve embedded static files
async fn static_handler(uri: axum::http::Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string();
            ([(header::CONTENT_TYPE, mime)], content.data.into_owned()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
