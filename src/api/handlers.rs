//! HTTP handlers for the grading API.

use super::types::*;
use super::{AppState, StaticAssets};
use crate::config::LogVerbosity;
use crate::error::GraderError;
use crate::logger::{log_exchange, Exchange};
use crate::prompt::Assessment;
use crate::providers::CheckoutRequest;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;

pub const SUCCESS_PAGE: &str =
    "<h2>Subscription successful!</h2><p>You now have unlimited access to IB Essay Grader.</p>";

// ============================================================================
// Pages
// ============================================================================

pub async fn index() -> Response {
    match StaticAssets::get("form.html") {
        Some(content) => Html(content.data.into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

pub async fn success() -> Html<&'static str> {
    Html(SUCCESS_PAGE)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app: "essay-grader",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Grading
// ============================================================================

pub async fn grade(
    State(state): State<Arc<AppState>>,
    submission: GradeSubmission,
) -> Result<Json<GradeResponse>, GraderError> {
    let request = submission.validate()?;

    let assessment = Assessment::classify(&request.subject, &request.paper);
    let prompt = assessment.render(&request.essay);

    let mut exchange = Exchange::start(
        "/grade",
        state.grader.name(),
        format!("{} via {}", assessment, state.grader.model()),
    );

    let result = state.grader.complete(&prompt).await.map_err(GraderError::Grading);
    finish(&mut exchange, &result, &state.config.app.log_verbosity);

    Ok(Json(GradeResponse { feedback: result? }))
}

// ============================================================================
// Checkout
// ============================================================================

pub async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CheckoutResponse>, GraderError> {
    let price_id = state
        .config
        .price_id()
        .ok_or_else(|| GraderError::Configuration(PRICE_NOT_SET.to_string()))?;

    let request = CheckoutRequest {
        price_id: price_id.to_string(),
        quantity: 1,
        success_url: state.config.billing.success_url.clone(),
        cancel_url: state.config.billing.cancel_url.clone(),
    };

    let mut exchange = Exchange::start(
        "/create-checkout-session",
        state.billing.name(),
        price_id.to_string(),
    );

    let result = state
        .billing
        .create_subscription_checkout(&request)
        .await
        .map_err(GraderError::Checkout);
    finish(&mut exchange, &result, &state.config.app.log_verbosity);

    let session = result?;
    Ok(Json(CheckoutResponse { url: session.url }))
}

/// Close out and log an exchange with the status the client will see.
fn finish<T>(exchange: &mut Exchange, result: &Result<T, GraderError>, verbosity: &LogVerbosity) {
    match result {
        Ok(_) => exchange.finish(StatusCode::OK.as_u16()),
        Err(e) => exchange.fail(e.status_code().as_u16(), e.error_type(), e.to_string()),
    }
    log_exchange(exchange, verbosity);
}
