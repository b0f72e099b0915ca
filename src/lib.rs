//! Essay Grader - IB essay feedback from a hosted language model.
//!
//! Features:
//! - Rubric-specific prompts per subject and paper
//! - Per-address daily quota on grading
//! - Stripe subscription checkout
//! - Embedded submission form

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod limiter;
pub mod logger;
pub mod prompt;
pub mod providers;
