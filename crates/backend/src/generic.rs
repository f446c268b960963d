//! Generic self-hosted inference server adapter.
//!
//! Fixed endpoint set: `/generate` for completion, `/status` for
//! liveness, `/models` for the available-model list, and
//! `/download-model` / `/download-progress` for model downloads.

use crate::http::{GENERATE_TIMEOUT, HttpTransport, PROBE_TIMEOUT};
use crate::{Completion, Generate};
use compact_str::CompactString;
use rudder_core::{GenerationRequest, Result};
use serde::{Deserialize, Serialize};

/// Client for one generic local inference server.
#[derive(Debug, Clone)]
pub struct GenericLocal {
    transport: HttpTransport,
    base_url: String,
}

/// Request body for `/generate`.
#[derive(Debug, Serialize)]
pub struct Body {
    /// User prompt.
    pub prompt: String,
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Model name, when the request hints one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<CompactString>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Body {
    /// Translate a router request into the server's wire format.
    pub fn from_request(req: &GenerationRequest) -> Self {
        Self {
            prompt: req.prompt.clone(),
            system_prompt: req.system_prompt.clone(),
            model: req.model.clone(),
            max_tokens: req.max_tokens,
            temperature: req.temperature,
            top_p: req.top_p,
            top_k: req.top_k,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    available: Vec<CompactString>,
}

#[derive(Debug, Serialize)]
struct DownloadBody<'a> {
    model: &'a str,
    consent: bool,
}

/// Wire form of the server's download progress report.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadProgress {
    /// One of `idle`, `downloading`, `completed`, `error`.
    pub status: CompactString,
    /// Model being downloaded, when one is.
    #[serde(default)]
    pub model: Option<CompactString>,
    /// Percentage in [0, 100].
    #[serde(default)]
    pub progress: f32,
    /// Server-reported failure detail.
    #[serde(default)]
    pub error: Option<String>,
}

impl GenericLocal {
    /// Create a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            transport: HttpTransport::no_auth(),
            base_url: crate::ollama::trim_slash(base_url.into()),
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Models the server can serve or download, from `/models`.
    pub async fn models(&self) -> Result<Vec<CompactString>> {
        let response: ModelsResponse = self
            .transport
            .get_json(&format!("{}/models", self.base_url), PROBE_TIMEOUT)
            .await?;
        Ok(response.available)
    }

    /// Ask the server to begin downloading a model.
    pub async fn start_download(&self, model: &str) -> Result<()> {
        let body = DownloadBody {
            model,
            consent: true,
        };
        let _: serde_json::Value = self
            .transport
            .post_json(
                &format!("{}/download-model", self.base_url),
                &body,
                PROBE_TIMEOUT,
            )
            .await?;
        Ok(())
    }

    /// Read the server's current download state.
    pub async fn download_progress(&self) -> Result<DownloadProgress> {
        self.transport
            .get_json(&format!("{}/download-progress", self.base_url), PROBE_TIMEOUT)
            .await
    }
}

impl Generate for GenericLocal {
    async fn generate(&self, req: &GenerationRequest) -> Result<Completion> {
        let body = Body::from_request(req);
        let response: GenerateResponse = self
            .transport
            .post_json(
                &format!("{}/generate", self.base_url),
                &body,
                GENERATE_TIMEOUT,
            )
            .await?;
        Ok(Completion {
            text: response.generated_text,
        })
    }

    async fn is_alive(&self) -> bool {
        self.transport
            .probe(&format!("{}/status", self.base_url))
            .await
    }
}
