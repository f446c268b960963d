//! Unified local backend with enum dispatch.
//!
//! The router is monomorphized on `LocalBackend`; the variant is
//! chosen from configuration at construction time.

use crate::generic::DownloadProgress;
use crate::{Completion, Generate, GenericLocal, Ollama};
use compact_str::CompactString;
use rudder_core::{GenerationRequest, LocalKind, Result, RouterConfig};

/// A co-located inference backend, one of the two local protocols.
#[derive(Debug, Clone)]
pub enum LocalBackend {
    /// Ollama-style API.
    Ollama(Ollama),
    /// Self-hosted inference server with a fixed endpoint set.
    Generic(GenericLocal),
}

impl LocalBackend {
    /// Build the backend named by the configuration.
    pub fn from_config(config: &RouterConfig) -> Self {
        match config.local_kind {
            LocalKind::Ollama => Self::Ollama(Ollama::new(config.local_url.clone())),
            LocalKind::Generic => Self::Generic(GenericLocal::new(config.local_url.clone())),
        }
    }

    /// Models the backend has installed or can serve.
    pub async fn models(&self) -> Result<Vec<CompactString>> {
        match self {
            Self::Ollama(b) => b.models().await,
            Self::Generic(b) => b.models().await,
        }
    }

    /// Ask the backend to begin downloading a model.
    pub async fn begin_download(&self, model: &str) -> Result<()> {
        match self {
            Self::Ollama(b) => b.pull(model).await,
            Self::Generic(b) => b.start_download(model).await,
        }
    }

    /// Query current download progress for a model.
    ///
    /// The generic server reports real percentages. Ollama has no
    /// progress endpoint, so presence in `/api/tags` maps to 100% and
    /// absence to 0% while the pull runs.
    pub async fn download_progress(&self, model: &str) -> Result<DownloadProgress> {
        match self {
            Self::Generic(b) => b.download_progress().await,
            Self::Ollama(b) => {
                let done = b.installed(model).await?;
                Ok(DownloadProgress {
                    status: if done { "completed".into() } else { "downloading".into() },
                    model: Some(model.into()),
                    progress: if done { 100.0 } else { 0.0 },
                    error: None,
                })
            }
        }
    }
}

impl Generate for LocalBackend {
    async fn generate(&self, req: &GenerationRequest) -> Result<Completion> {
        match self {
            Self::Ollama(b) => b.generate(req).await,
            Self::Generic(b) => b.generate(req).await,
        }
    }

    async fn is_alive(&self) -> bool {
        match self {
            Self::Ollama(b) => b.is_alive().await,
            Self::Generic(b) => b.is_alive().await,
        }
    }
}
