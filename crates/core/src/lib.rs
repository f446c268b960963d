//! Core types and pure decision logic for the rudder execution router.
//!
//! Everything in this crate is side-effect-free apart from the
//! capability probe, which reads host environment signals. Network and
//! persistence live in `rudder-backend` and `rudder-router`.

pub use config::{LocalKind, RouterConfig, ServiceMode};
pub use error::{Error, Result};
pub use limits::{TokenLimits, default_token_limit};
pub use probe::{CapabilityCache, CapabilitySnapshot, probe};
pub use profile::{Complexity, RequestProfile, Strategy, estimate_tokens, profile};
pub use request::{GenerationRequest, MAX_OUTPUT_TOKENS, MAX_PROMPT_CHARS};
pub use usage::{OperationType, UsageEvent};

pub mod config;
pub mod cost;
pub mod error;
pub mod limits;
pub mod probe;
pub mod profile;
pub mod request;
pub mod usage;
