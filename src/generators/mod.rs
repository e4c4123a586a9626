//! Candidate rewrite generators
//!
//! Every rewriting strategy — an LLM behind an API, a local seq2seq server,
//! a rule engine — is one implementation of the [`Generator`] capability.
//! Adding a strategy means adding one implementation, not new control flow.

mod client;
mod llm;
mod prompts;

pub use client::{LlmBackend, LlmClient, LlmConfig};
pub use llm::LlmRewriter;
pub use prompts::{detox_prompt, refinement_prompt};

use crate::models::MatchSet;
use thiserror::Error;

/// Errors from a generation attempt. The refinement loop recovers from all
/// of these by treating the pass as a no-op; they never reach the caller of
/// the pipeline.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("missing API key: {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to parse API response: {0}")]
    Parse(String),
}

pub type GenResult<T> = Result<T, GenError>;

/// A producer of candidate rewrites.
///
/// `hint`, when present, names the residual lexicon matches left by an
/// earlier pass; implementations use it to narrow the second attempt.
pub trait Generator: Send + Sync {
    fn label(&self) -> &str;

    fn generate(&self, original: &str, hint: Option<&MatchSet>) -> GenResult<String>;
}
