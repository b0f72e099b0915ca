//! External providers the service forwards to.
//!
//! - `GradingProvider`: turns a finished prompt into feedback text (OpenAI)
//! - `BillingProvider`: issues hosted subscription checkouts (Stripe)
//!
//! Handlers only see the traits, so tests swap in fakes from `test_support`.

pub mod openai;
pub mod stripe;

#[cfg(test)]
pub(crate) mod test_support;

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiGrader;
pub use stripe::StripeBilling;

/// Language-model service that produces feedback for a prompt.
#[async_trait]
pub trait GradingProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Submit a single-turn completion and return the first choice's text.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Parameters for a subscription checkout with a single line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub quantity: u32,
    pub success_url: String,
    pub cancel_url: String,
}

/// Hosted checkout session issued by the billing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Payment service that issues hosted subscription checkouts.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    async fn create_subscription_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ProviderError>;
}
