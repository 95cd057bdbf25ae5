// Multi-round mock-interview orchestration.
// All LLM calls go through llm_client — no direct generation-API calls here.

pub mod engine;
pub mod evaluation;
pub mod export;
pub mod models;
pub mod phase;
pub mod prompts;
pub mod retry;
pub mod roles;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Errors terminating one interview run. Cancellation is modeled as its own
/// variant because it is a distinct terminal outcome, never routed through
/// the caller's error callback.
#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("interview run cancelled")]
    Cancelled,

    #[error("generation service error: {0}")]
    Llm(#[from] LlmError),

    #[error("invalid interview state: {0}")]
    InvalidState(String),
}
