//! Request and response types for the grading API.

use crate::error::GraderError;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form, Json,
};
use serde::{Deserialize, Serialize};

pub const MISSING_FIELDS: &str = "Essay, subject, or paper missing.";
pub const PRICE_NOT_SET: &str = "Stripe Price ID not set.";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app: &'static str,
    pub version: &'static str,
}

/// Raw grading submission as posted by the form or a JSON client.
///
/// Absent (or JSON `null`) fields read as empty.
#[derive(Debug, Default, Deserialize)]
pub struct GradeSubmission {
    #[serde(default)]
    pub essay: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub paper: Option<String>,
}

/// A submission with all three fields present.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingRequest {
    pub subject: String,
    pub paper: String,
    pub essay: String,
}

impl GradeSubmission {
    /// Require non-empty fields. Whitespace-only values are accepted as-is.
    pub fn validate(self) -> Result<GradingRequest, GraderError> {
        let essay = self.essay.unwrap_or_default();
        let subject = self.subject.unwrap_or_default();
        let paper = self.paper.unwrap_or_default();

        if essay.is_empty() || subject.is_empty() || paper.is_empty() {
            return Err(GraderError::Validation(MISSING_FIELDS.to_string()));
        }

        Ok(GradingRequest {
            subject,
            paper,
            essay,
        })
    }
}

/// How a submission body is encoded, judged from its `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    UrlEncoded,
    Multipart,
    Other,
}

fn body_kind(request: &Request) -> BodyKind {
    let mime = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("application/json") => BodyKind::Json,
        Some(mime) if mime.starts_with("application/") && mime.ends_with("+json") => BodyKind::Json,
        Some("application/x-www-form-urlencoded") => BodyKind::UrlEncoded,
        Some("multipart/form-data") => BodyKind::Multipart,
        _ => BodyKind::Other,
    }
}

/// Collect the three text fields from a multipart form. Other parts are skipped.
async fn read_multipart(mut multipart: Multipart) -> Result<GradeSubmission, GraderError> {
    let mut submission = GradeSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GraderError::Validation(e.body_text()))?
    {
        let slot = match field.name() {
            Some("essay") => &mut submission.essay,
            Some("subject") => &mut submission.subject,
            Some("paper") => &mut submission.paper,
            _ => continue,
        };
        // First value wins for repeated names.
        if slot.is_some() {
            continue;
        }
        *slot = Some(
            field
                .text()
                .await
                .map_err(|e| GraderError::Validation(e.body_text()))?,
        );
    }

    Ok(submission)
}

/// Accept a JSON, url-encoded or multipart body.
///
/// Any other body (or none) carries no fields, so it reads as an empty
/// submission and fails `validate()` with the usual message.
impl<S> FromRequest<S> for GradeSubmission
where
    S: Send + Sync,
{
    type Rejection = GraderError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Json => {
                let Json(submission) = Json::<GradeSubmission>::from_request(req, state)
                    .await
                    .map_err(|rejection| GraderError::Validation(rejection.body_text()))?;
                Ok(submission)
            }
            BodyKind::UrlEncoded => {
                let Form(submission) = Form::<GradeSubmission>::from_request(req, state)
                    .await
                    .map_err(|rejection| GraderError::Validation(rejection.body_text()))?;
                Ok(submission)
            }
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|rejection| GraderError::Validation(rejection.body_text()))?;
                read_multipart(multipart).await
            }
            BodyKind::Other => Ok(GradeSubmission::default()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradeResponse {
    pub feedback: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub url: String,
}
