//! Integration tests for the grading API endpoints.

use super::*;
use crate::config::{BillingConfig, Config};
use crate::error::ProviderError;
use crate::limiter::UNKNOWN_CLIENT;
use crate::providers::test_support::{RecordingBilling, RecordingGrader};
use axum::body::Bytes;
use axum_test::TestServer;
use serde_json::json;
use std::net::SocketAddr;

fn config_with_price(price_id: Option<&str>) -> Config {
    Config {
        billing: BillingConfig {
            price_id: price_id.map(str::to_string),
            success_url: "https://grader.example/success".to_string(),
            cancel_url: "https://grader.example/".to_string(),
            ..BillingConfig::default()
        },
        ..Config::default()
    }
}

struct Harness {
    server: TestServer,
    grader: RecordingGrader,
    billing: RecordingBilling,
}

fn harness_with(config: Config, grader: RecordingGrader, billing: RecordingBilling) -> Harness {
    let state = AppState::new(config, Arc::new(grader.clone()), Arc::new(billing.clone()));
    let server = TestServer::new(create_router(state)).unwrap();
    Harness {
        server,
        grader,
        billing,
    }
}

fn harness() -> Harness {
    harness_with(
        config_with_price(Some("price_123")),
        RecordingGrader::replying("Criterion A: 5/5"),
        RecordingBilling::issuing("https://checkout.stripe.com/c/pay/cs_test_fake"),
    )
}

// =========================================================================
// Pages
// =========================================================================

#[tokio::test]
async fn index_serves_submission_form() {
    let h = harness();

    let response = h.server.get("/").await;

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("<form"));
    assert!(body.contains("name=\"essay\""));
}

#[tokio::test]
async fn success_page_confirms_subscription() {
    let h = harness();

    let response = h.server.get("/success").await;

    response.assert_status_ok();
    assert_eq!(response.text(), SUCCESS_PAGE);
}

#[tokio::test]
async fn health_check_returns_ok() {
    let h = harness();

    let response = h.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["app"], "essay-grader");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let h = harness();

    let response = h.server.get("/missing.css").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pages_are_not_rate_limited() {
    let h = harness();

    for _ in 0..5 {
        h.server.get("/").await.assert_status_ok();
        h.server.get("/success").await.assert_status_ok();
    }
}

// =========================================================================
// POST /grade
// =========================================================================

#[tokio::test]
async fn grade_returns_feedback_for_json_submission() {
    let h = harness();

    let response = h
        .server
        .post("/grade")
        .json(&json!({
            "essay": "The poem contrasts light and dark.",
            "subject": "English A",
            "paper": "Paper 1"
        }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({"feedback": "Criterion A: 5/5"}));

    let prompts = h.grader.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Criterion D: Language"));
    assert!(prompts[0].contains("\"\"\"\nThe poem contrasts light and dark.\n\"\"\""));
}

#[tokio::test]
async fn grade_accepts_form_submission() {
    let h = harness();

    let response = h
        .server
        .post("/grade")
        .form(&[
            ("essay", "Causes of the Cold War"),
            ("subject", "History"),
            ("paper", "Paper 3"),
        ])
        .await;

    response.assert_status_ok();
    assert!(h.grader.prompts()[0].contains("Paper 3 essay"));
}

#[tokio::test]
async fn grade_accepts_multipart_submission() {
    use axum_test::multipart::MultipartForm;

    let h = harness();
    let form = MultipartForm::new()
        .add_text("essay", "Market failure and merit goods")
        .add_text("subject", "Economics")
        .add_text("paper", "Paper 1");

    let response = h.server.post("/grade").multipart(form).await;

    response.assert_status_ok();
    response.assert_json(&json!({"feedback": "Criterion A: 5/5"}));
    let prompts = h.grader.prompts();
    assert!(prompts[0].contains("IB Economics examiner"));
    assert!(prompts[0].contains("Market failure and merit goods"));
}

#[tokio::test]
async fn grade_rejects_multipart_missing_field() {
    use axum_test::multipart::MultipartForm;

    let h = harness();
    let form = MultipartForm::new()
        .add_text("essay", "Text")
        .add_text("subject", "History");

    let response = h.server.post("/grade").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"error": "Essay, subject, or paper missing."}));
    assert!(h.grader.prompts().is_empty());
}

#[tokio::test]
async fn grade_without_content_type_reports_missing_fields() {
    let h = harness();

    let response = h.server.post("/grade").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"error": "Essay, subject, or paper missing."}));
    assert!(h.grader.prompts().is_empty());
}

#[tokio::test]
async fn grade_with_unsupported_content_type_reports_missing_fields() {
    let h = harness();

    let response = h
        .server
        .post("/grade")
        .text("essay=Text&subject=History&paper=Paper 2")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"error": "Essay, subject, or paper missing."}));
    assert!(h.grader.prompts().is_empty());
}

#[tokio::test]
async fn grade_rejects_empty_essay_without_calling_provider() {
    let h = harness();

    let response = h
        .server
        .post("/grade")
        .json(&json!({"essay": "", "subject": "History", "paper": "Paper 2"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"error": "Essay, subject, or paper missing."}));
    assert!(h.grader.prompts().is_empty());
}

#[tokio::test]
async fn grade_rejects_missing_form_field() {
    let h = harness();

    let response = h
        .server
        .post("/grade")
        .form(&[("essay", "Text"), ("subject", "Economics")])
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(h.grader.prompts().is_empty());
}

#[tokio::test]
async fn grade_treats_null_json_field_as_missing() {
    let h = harness();

    let response = h
        .server
        .post("/grade")
        .json(&json!({"essay": "Text", "subject": null, "paper": "Essay"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"error": "Essay, subject, or paper missing."}));
}

#[tokio::test]
async fn grade_rejects_malformed_json() {
    let h = harness();

    let response = h
        .server
        .post("/grade")
        .bytes(Bytes::from_static(b"{\"essay\": "))
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());
    assert!(h.grader.prompts().is_empty());
}

#[tokio::test]
async fn grade_accepts_whitespace_only_fields() {
    let h = harness();

    let response = h
        .server
        .post("/grade")
        .json(&json!({"essay": " ", "subject": " ", "paper": " "}))
        .await;

    response.assert_status_ok();
    assert!(h.grader.prompts()[0].contains("appropriate IB criteria"));
}

#[tokio::test]
async fn grade_surfaces_provider_error_as_server_error() {
    let h = harness_with(
        config_with_price(None),
        RecordingGrader::failing(ProviderError::Api {
            status: 429,
            message: "Error code: 429 - Rate limit reached for gpt-4-turbo".to_string(),
        }),
        RecordingBilling::issuing("unused"),
    );

    let response = h
        .server
        .post("/grade")
        .json(&json!({"essay": "Text", "subject": "Economics", "paper": "Paper 1"}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"error": "Error code: 429 - Rate limit reached for gpt-4-turbo"}));
}

#[tokio::test]
async fn fourth_grade_request_in_a_day_is_throttled() {
    let h = harness();
    let submission = json!({"essay": "Text", "subject": "History", "paper": "Paper 2"});

    for _ in 0..3 {
        h.server.post("/grade").json(&submission).await.assert_status_ok();
    }

    let response = h.server.post("/grade").json(&submission).await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(h.grader.prompts().len(), 3);
}

#[tokio::test]
async fn quota_is_keyed_by_peer_address_over_real_connections() {
    let grader = RecordingGrader::replying("ok");
    let state = AppState::new(
        config_with_price(None),
        Arc::new(grader.clone()),
        Arc::new(RecordingBilling::issuing("unused")),
    );
    let limiter = state.limiter.clone();
    let app = create_router(state).into_make_service_with_connect_info::<SocketAddr>();
    let server = TestServer::builder().http_transport().build(app).unwrap();
    let submission = json!({"essay": "Text", "subject": "History", "paper": "Paper 2"});

    for _ in 0..3 {
        server.post("/grade").json(&submission).await.assert_status_ok();
    }
    server
        .post("/grade")
        .json(&submission)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(limiter.remaining("127.0.0.1").await, 0);
    assert_eq!(limiter.remaining(UNKNOWN_CLIENT).await, 3);
    assert_eq!(grader.prompts().len(), 3);
}

#[tokio::test]
async fn rejected_submissions_still_count_against_quota() {
    let h = harness();

    for _ in 0..3 {
        h.server
            .post("/grade")
            .json(&json!({"essay": ""}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    let response = h
        .server
        .post("/grade")
        .json(&json!({"essay": "Text", "subject": "History", "paper": "Paper 2"}))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(h.grader.prompts().is_empty());
}

#[tokio::test]
async fn configured_quota_is_respected() {
    let mut config = config_with_price(None);
    config.rate_limit.requests = 1;
    let h = harness_with(
        config,
        RecordingGrader::replying("ok"),
        RecordingBilling::issuing("unused"),
    );
    let submission = json!({"essay": "Text", "subject": "History", "paper": "Paper 2"});

    h.server.post("/grade").json(&submission).await.assert_status_ok();
    h.server
        .post("/grade")
        .json(&submission)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

// =========================================================================
// POST /create-checkout-session
// =========================================================================

#[tokio::test]
async fn checkout_returns_session_url() {
    let h = harness();

    let response = h.server.post("/create-checkout-session").await;

    response.assert_status_ok();
    response.assert_json(&json!({"url": "https://checkout.stripe.com/c/pay/cs_test_fake"}));

    let request = h.billing.last_request().unwrap();
    assert_eq!(request.price_id, "price_123");
    assert_eq!(request.quantity, 1);
    assert_eq!(request.success_url, "https://grader.example/success");
    assert_eq!(request.cancel_url, "https://grader.example/");
}

#[tokio::test]
async fn checkout_without_price_id_is_client_error() {
    let h = harness_with(
        config_with_price(None),
        RecordingGrader::replying("unused"),
        RecordingBilling::issuing("unused"),
    );

    let response = h.server.post("/create-checkout-session").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"error": "Stripe Price ID not set."}));
    assert_eq!(h.billing.calls(), 0);
}

#[tokio::test]
async fn checkout_surfaces_provider_error_as_client_error() {
    let h = harness_with(
        config_with_price(Some("price_gone")),
        RecordingGrader::replying("unused"),
        RecordingBilling::failing(ProviderError::Api {
            status: 400,
            message: "No such price: 'price_gone'".to_string(),
        }),
    );

    let response = h.server.post("/create-checkout-session").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"error": "No such price: 'price_gone'"}));
    assert_eq!(h.billing.calls(), 1);
}

#[tokio::test]
async fn checkout_is_not_rate_limited() {
    let h = harness();

    for _ in 0..5 {
        h.server.post("/create-checkout-session").await.assert_status_ok();
    }
    assert_eq!(h.billing.calls(), 5);
}
