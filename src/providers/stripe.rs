//! Stripe Checkout client.
//!
//! Stripe takes form-encoded bodies with bracketed keys for nested fields,
//! e.g. `line_items[0][price]`.

use super::{BillingProvider, CheckoutRequest, CheckoutSession};
use crate::config::DEFAULT_STRIPE_BASE_URL;
use crate::error::ProviderError;
use crate::http::{create_client_with_timeout, BILLING_TIMEOUT};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

/// Billing backed by Stripe hosted checkout.
#[derive(Clone)]
pub struct StripeBilling {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeBilling {
    pub fn new(secret_key: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(BILLING_TIMEOUT)?,
            base_url: DEFAULT_STRIPE_BASE_URL.to_string(),
            secret_key: secret_key.into(),
        })
    }

    /// Override the API host, e.g. "https://api.stripe.com".
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/checkout/sessions", self.base_url)
    }
}

/// Form fields for a card-only subscription checkout with one line item.
fn session_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "subscription".to_string()),
        ("payment_method_types[0]", "card".to_string()),
        ("line_items[0][price]", request.price_id.clone()),
        ("line_items[0][quantity]", request.quantity.to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
    ]
}

#[async_trait]
impl BillingProvider for StripeBilling {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_subscription_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ProviderError> {
        let response = self
            .client
            .post(self.sessions_url())
            .bearer_auth(&self.secret_key)
            .form(&session_form(request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| format!("Request failed with status {}: {}", status.as_u16(), text.trim()));
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(format!("Invalid checkout session: {}", e)))?;

        let url = session.url.ok_or_else(|| {
            ProviderError::MalformedResponse(format!("Checkout session {} has no URL", session.id))
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}
