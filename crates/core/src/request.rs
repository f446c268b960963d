//! Text generation request type.
//!
//! `GenerationRequest` is an immutable value built once per request.
//! Sanitization never mutates in place: `truncated_to()` returns a new
//! request with a shortened prompt.

use crate::error::{Error, Result};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Hard ceiling on prompt length, in characters.
pub const MAX_PROMPT_CHARS: usize = 10_000;
/// Upper bound on the requested output length, in tokens.
pub const MAX_OUTPUT_TOKENS: u32 = 4_096;

/// A single text generation request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationRequest {
    /// The user prompt.
    pub prompt: String,

    /// Optional system prompt. Never truncated by budgeting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Model hint passed through to the executing backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<CompactString>,

    /// Requested output length in tokens.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling bound.
    pub top_p: f32,

    /// Top-k sampling bound.
    pub top_k: u32,

    /// Force local execution, overriding mode and heuristics.
    #[serde(default)]
    pub force_local: bool,

    /// Force cloud execution, overriding mode and heuristics.
    #[serde(default)]
    pub force_cloud: bool,

    /// Bearer credential for the cloud backend, when the caller
    /// supplies their own key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl GenerationRequest {
    /// Create a request with default generation parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            model: None,
            max_tokens: 800,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            force_local: false,
            force_cloud: false,
            api_key: None,
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Set the model hint.
    pub fn with_model(mut self, model: impl Into<CompactString>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the requested output length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Force local execution.
    pub fn force_local(mut self) -> Self {
        self.force_local = true;
        self
    }

    /// Force cloud execution.
    pub fn force_cloud(mut self) -> Self {
        self.force_cloud = true;
        self
    }

    /// Attach a caller-supplied cloud credential.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Check the input invariants. Fails fast before any backend call.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::Validation("prompt is empty".into()));
        }
        if self.prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(Error::Validation(format!(
                "prompt exceeds {MAX_PROMPT_CHARS} characters"
            )));
        }
        if self.max_tokens == 0 || self.max_tokens > MAX_OUTPUT_TOKENS {
            return Err(Error::Validation(format!(
                "max_tokens must be in 1..={MAX_OUTPUT_TOKENS}, got {}",
                self.max_tokens
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Validation(format!(
                "temperature must be in [0, 2], got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Total characters profiled for token estimation: prompt plus
    /// system prompt.
    pub fn profiled_chars(&self) -> usize {
        self.prompt.chars().count()
            + self
                .system_prompt
                .as_deref()
                .map(|s| s.chars().count())
                .unwrap_or(0)
    }

    /// Return a copy with the prompt truncated to at most
    /// `max_chars` characters. The system prompt is left untouched.
    pub fn truncated_to(&self, max_chars: usize) -> Self {
        let mut copy = self.clone();
        if copy.prompt.chars().count() > max_chars {
            copy.prompt = copy.prompt.chars().take(max_chars).collect();
        }
        copy
    }

    /// Return a copy with `max_tokens` clamped to `limit`.
    pub fn clamped_to(&self, limit: u32) -> Self {
        let mut copy = self.clone();
        copy.max_tokens = copy.max_tokens.min(limit);
        copy
    }
}
