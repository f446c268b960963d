//! Router configuration loaded from TOML.
//!
//! The configured mode, local backend location, and token-limit
//! overrides are injected into the router; nothing in the router reads
//! ambient global state.

use crate::limits::TokenLimits;
use anyhow::{Context, Result};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://localhost:11434";
/// Default generic local inference server base URL.
pub const GENERIC_URL: &str = "http://localhost:8000";

/// Configured execution mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceMode {
    /// Always execute locally; failures surface directly.
    Local,
    /// Always execute in the cloud; failures surface directly.
    Cloud,
    /// Pick per request, with a one-shot silent fallback on failure.
    #[default]
    Hybrid,
}

/// Which wire protocol the co-located backend speaks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalKind {
    /// Ollama-style API (`/api/generate`, `/api/tags`, `/api/pull`).
    #[default]
    Ollama,
    /// Self-hosted inference server with a fixed `/generate` endpoint.
    Generic,
}

/// Top-level router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Default execution mode for callers that don't pass one.
    pub mode: ServiceMode,
    /// Base URL of the active local backend.
    pub local_url: String,
    /// Protocol of the active local backend.
    pub local_kind: LocalKind,
    /// Default cloud provider identity.
    pub cloud_provider: CompactString,
    /// Per-provider token-limit overrides.
    pub limits: TokenLimits,
    /// Consecutive download-poll failures tolerated before the
    /// tracker transitions to Error.
    pub poll_failure_budget: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            mode: ServiceMode::Hybrid,
            local_url: OLLAMA_URL.to_owned(),
            local_kind: LocalKind::Ollama,
            cloud_provider: "huggingface".into(),
            limits: TokenLimits::new(),
            poll_failure_budget: 5,
        }
    }
}

impl RouterConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}
