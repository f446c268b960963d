//! Request profiling: token estimation and complexity classification.
//!
//! The token estimate is a chars/4 heuristic, not a real tokenizer.
//! It only needs to be monotonic and cheap: the profile drives the
//! local/cloud decision, never billing.

use serde::{Deserialize, Serialize};

/// Execution strategy for one specific request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Co-located inference backend, free of per-call cost.
    Local,
    /// Remote metered inference backend.
    Cloud,
}

impl Strategy {
    /// The opposite strategy, used by the hybrid fallback.
    pub fn opposite(self) -> Self {
        match self {
            Self::Local => Self::Cloud,
            Self::Cloud => Self::Local,
        }
    }
}

/// Coarse execution-cost bucket for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Short conversational request.
    Low,
    /// Mid-size request, or a short one containing a complexity marker.
    Medium,
    /// Long-form analysis, generation, or translation work.
    High,
}

impl Complexity {
    /// Promote one level: Low becomes Medium, Medium becomes High.
    fn promoted(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }
}

/// Derived per-request profile. Computed fresh per request, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestProfile {
    /// Estimated token count of prompt plus system prompt.
    pub estimated_tokens: usize,
    /// Complexity class after marker promotion.
    pub complexity: Complexity,
    /// Strategy the profile alone would pick.
    pub suggested: Strategy,
}

/// Substrings whose presence promotes the complexity class one level.
/// Matched case-insensitively; the product UI is French/English, so
/// both forms appear.
const COMPLEXITY_MARKERS: &[&str] = &[
    // deep analysis
    "analyse",
    "analyze",
    "résume",
    "summarize",
    // translation
    "traduire",
    "traduis",
    "translate",
    // document generation
    "génère un document",
    "generate a document",
    "rédige",
    // code generation
    "write code",
    "génère du code",
    "generate code",
];

/// Estimate the token count of a text as `ceil(chars / 4)`.
///
/// A heuristic, not a tokenizer: roughly four characters per token
/// holds for the model families this router dispatches to, and the
/// estimate is monotonic in input length, which is all the decision
/// rules rely on.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Profile a prompt/system-prompt pair.
///
/// Pure and side-effect-free: no network, no disk, no clock.
pub fn profile(prompt: &str, system_prompt: Option<&str>) -> RequestProfile {
    let chars = prompt.chars().count()
        + system_prompt.map(|s| s.chars().count()).unwrap_or(0);
    let estimated_tokens = chars.div_ceil(4);

    let mut complexity = if estimated_tokens > 8_000 {
        Complexity::High
    } else if estimated_tokens > 2_000 {
        Complexity::Medium
    } else {
        Complexity::Low
    };

    let lowered = prompt.to_lowercase();
    if COMPLEXITY_MARKERS.iter().any(|m| lowered.contains(m)) {
        complexity = complexity.promoted();
    }

    let suggested = match complexity {
        Complexity::High => Strategy::Cloud,
        Complexity::Medium if estimated_tokens > 2_000 => Strategy::Cloud,
        _ if estimated_tokens > 6_000 => Strategy::Cloud,
        _ => Strategy::Local,
    };

    RequestProfile {
        estimated_tokens,
        complexity,
        suggested,
    }
}
