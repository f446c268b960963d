//! Per-provider token limits.
//!
//! A static prefix-matched map of known provider/model families plus a
//! configurable overlay, so deployments can adjust limits without a
//! code change. The limit bounds both prompt budgeting and the
//! requested output length in the router.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Returns the default token limit for a known provider or model ID.
///
/// Uses prefix matching against known families. Unknown providers get
/// a conservative 4096.
pub fn default_token_limit(provider: &str) -> u32 {
    // GPT-4o / GPT-4-turbo family
    if provider.starts_with("gpt-4o") || provider.starts_with("gpt-4-turbo") {
        return 128_000;
    }
    // GPT-4 (non-turbo)
    if provider.starts_with("gpt-4") || provider.starts_with("openai-gpt4") {
        return 8_192;
    }
    // GPT-3.5
    if provider.starts_with("gpt-3.5") || provider.starts_with("openai-gpt35") {
        return 16_385;
    }
    // Claude family
    if provider.starts_with("claude") || provider.starts_with("anthropic") {
        return 200_000;
    }
    // DeepSeek family
    if provider.starts_with("deepseek") {
        return 64_000;
    }
    // Mistral family
    if provider.starts_with("mistral") || provider.starts_with("mixtral") {
        return 32_768;
    }
    // Hosted Hugging Face inference
    if provider.starts_with("huggingface") || provider.starts_with("hf") {
        return 4_096;
    }
    // Unknown provider, conservative default
    4_096
}

/// Token-limit table: configured overrides layered over the static
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenLimits {
    overrides: BTreeMap<CompactString, u32>,
}

impl TokenLimits {
    /// Empty table: every lookup falls through to the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from explicit overrides.
    pub fn with_overrides(
        overrides: impl IntoIterator<Item = (CompactString, u32)>,
    ) -> Self {
        Self {
            overrides: overrides.into_iter().collect(),
        }
    }

    /// Set one override.
    pub fn set(&mut self, provider: impl Into<CompactString>, limit: u32) {
        self.overrides.insert(provider.into(), limit);
    }

    /// Resolve the token limit for a provider: exact override first,
    /// then the prefix-matched defaults.
    pub fn limit_for(&self, provider: &str) -> u32 {
        self.overrides
            .get(provider)
            .copied()
            .unwrap_or_else(|| default_token_limit(provider))
    }
}
