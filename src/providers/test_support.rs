use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BillingProvider, CheckoutRequest, CheckoutSession, GradingProvider};
use crate::error::ProviderError;

// Grader that replays a canned result and records every prompt it receives.
#[derive(Clone)]
pub(crate) struct RecordingGrader {
    reply: Result<String, ProviderError>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl RecordingGrader {
    pub(crate) fn replying(feedback: impl Into<String>) -> Self {
        Self {
            reply: Ok(feedback.into()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts mutex poisoned").clone()
    }
}

#[async_trait]
impl GradingProvider for RecordingGrader {
    fn name(&self) -> &'static str {
        "fake-grader"
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts
            .lock()
            .expect("prompts mutex poisoned")
            .push(prompt.to_string());
        self.reply.clone()
    }
}

// Billing fake that counts calls and keeps the last request.
#[derive(Clone)]
pub(crate) struct RecordingBilling {
    reply: Result<CheckoutSession, ProviderError>,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<CheckoutRequest>>>,
}

impl RecordingBilling {
    pub(crate) fn issuing(url: impl Into<String>) -> Self {
        Self {
            reply: Ok(CheckoutSession {
                id: "cs_test_fake".to_string(),
                url: url.into(),
            }),
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            ..Self::issuing("")
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<CheckoutRequest> {
        self.last_request
            .lock()
            .expect("request mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl BillingProvider for RecordingBilling {
    fn name(&self) -> &'static str {
        "fake-billing"
    }

    async fn create_subscription_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("request mutex poisoned") = Some(request.clone());
        self.reply.clone()
    }
}
