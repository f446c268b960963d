//! Backend adapters for the rudder execution router.
//!
//! Three interchangeable clients behind one contract: Ollama and a
//! generic self-hosted server on the local side, a hosted inference
//! API on the cloud side. Each adapter owns exactly one wire protocol
//! and never retries internally — recovery belongs to the router.

pub use cloud::Cloud;
pub use generic::{DownloadProgress, GenericLocal};
pub use http::{HttpTransport, GENERATE_TIMEOUT, PROBE_TIMEOUT};
pub use local::LocalBackend;
pub use ollama::Ollama;

use rudder_core::{GenerationRequest, Result};

pub mod cloud;
pub mod generic;
pub mod http;
pub mod local;
pub mod ollama;

/// A completed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The generated text.
    pub text: String,
}

/// Common backend contract.
///
/// `generate` performs exactly one call (the cloud adapter's
/// documented secondary endpoint is part of that one call);
/// cancellation propagates by dropping the returned future, which
/// abandons the underlying connection.
pub trait Generate: Send + Sync {
    /// Execute a generation request against this backend.
    fn generate(
        &self,
        req: &GenerationRequest,
    ) -> impl Future<Output = Result<Completion>> + Send;

    /// Cheap liveness probe, bounded by [`PROBE_TIMEOUT`].
    /// Never errors: any failure reads as "not alive".
    fn is_alive(&self) -> impl Future<Output = bool> + Send;
}
