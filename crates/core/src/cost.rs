//! Per-provider cost accounting rates.
//!
//! Approximate USD per token, input and output averaged. Same prefix
//! matching as the token-limit table; unknown providers fall back to a
//! default rate rather than zero, so usage events never under-report.

/// Default USD-per-token rate for unknown providers.
pub const DEFAULT_RATE: f64 = 0.000_01;

/// Returns the estimated cost per token, in USD, for a provider.
pub fn cost_per_token(provider: &str) -> f64 {
    if provider.contains("gpt-4") {
        return 0.000_03;
    }
    if provider.contains("gpt-3") {
        return 0.000_005;
    }
    if provider.contains("claude") || provider.contains("anthropic") {
        return 0.000_02;
    }
    if provider.contains("mistral") || provider.contains("mixtral") {
        return 0.000_007;
    }
    if provider.contains("hugging") || provider.contains("hf") {
        return 0.000_002;
    }
    if provider.contains("deepseek") {
        return 0.000_008;
    }
    DEFAULT_RATE
}

/// Estimate the USD cost of a call from its total token count.
pub fn estimate_cost(total_tokens: usize, provider: &str) -> f64 {
    total_tokens as f64 * cost_per_token(provider)
}
