//! Usage accounting events.
//!
//! Append-only values handed to the ledger collaborator: once built
//! they are never mutated or deleted by this subsystem.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// What kind of operation produced a usage event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Interactive chat generation.
    Chat,
    /// Document-grounded generation.
    Document,
}

/// One token/cost accounting record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Owning user, when known.
    pub user_id: Option<CompactString>,
    /// Provider that served (or would have served) the call.
    pub provider_id: CompactString,
    /// Estimated input tokens.
    pub input_tokens: usize,
    /// Estimated output tokens.
    pub output_tokens: usize,
    /// Estimated USD cost. Zero for cache hits.
    pub estimated_cost: f64,
    /// Whether the response came from the response cache.
    pub from_cache: bool,
    /// Operation class for reporting.
    pub operation_type: OperationType,
    /// When the event was produced.
    pub created_at: DateTime<Utc>,
}

impl UsageEvent {
    /// Build an event for a metered cloud call.
    pub fn metered(
        provider: impl Into<CompactString>,
        input_tokens: usize,
        output_tokens: usize,
    ) -> Self {
        let provider_id = provider.into();
        let estimated_cost =
            crate::cost::estimate_cost(input_tokens + output_tokens, &provider_id);
        Self {
            user_id: None,
            provider_id,
            input_tokens,
            output_tokens,
            estimated_cost,
            from_cache: false,
            operation_type: OperationType::Chat,
            created_at: Utc::now(),
        }
    }

    /// Build an event for a cache hit: same token counts, zero cost.
    pub fn cached(
        provider: impl Into<CompactString>,
        input_tokens: usize,
        output_tokens: usize,
    ) -> Self {
        Self {
            user_id: None,
            provider_id: provider.into(),
            input_tokens,
            output_tokens,
            estimated_cost: 0.0,
            from_cache: true,
            operation_type: OperationType::Chat,
            created_at: Utc::now(),
        }
    }

    /// Attach the owning user.
    pub fn with_user(mut self, user_id: impl Into<CompactString>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}
