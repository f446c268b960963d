//! Local Ollama adapter.
//!
//! Speaks the native Ollama API: `/api/generate` for non-streaming
//! generation, `/api/tags` for liveness and installed models,
//! `/api/pull` to begin a model download.

use crate::http::{GENERATE_TIMEOUT, HttpTransport, PROBE_TIMEOUT};
use crate::{Completion, Generate};
use compact_str::CompactString;
use rudder_core::{Error, GenerationRequest, Result};
use serde::{Deserialize, Serialize};

/// Default model when the request carries no hint.
pub const DEFAULT_MODEL: &str = "mistral";

/// Client for one Ollama instance.
#[derive(Debug, Clone)]
pub struct Ollama {
    transport: HttpTransport,
    base_url: String,
}

/// Request body for `/api/generate`.
#[derive(Debug, Serialize)]
pub struct Body {
    /// Model name.
    pub model: CompactString,
    /// User prompt.
    pub prompt: String,
    /// System prompt, passed through Ollama's dedicated field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Sampling options.
    pub options: Options,
    /// Always false: the router contract is non-streaming.
    pub stream: bool,
}

/// Sampling options for `/api/generate`.
#[derive(Debug, Serialize)]
pub struct Options {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub num_predict: u32,
}

impl Body {
    /// Translate a router request into the Ollama wire format.
    pub fn from_request(req: &GenerationRequest) -> Self {
        Self {
            model: req.model.clone().unwrap_or_else(|| DEFAULT_MODEL.into()),
            prompt: req.prompt.clone(),
            system: req.system_prompt.clone(),
            options: Options {
                temperature: req.temperature,
                top_p: req.top_p,
                top_k: req.top_k,
                num_predict: req.max_tokens,
            },
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: CompactString,
}

#[derive(Debug, Serialize)]
struct PullBody<'a> {
    name: &'a str,
    stream: bool,
}

impl Ollama {
    /// Create a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            transport: HttpTransport::no_auth(),
            base_url: trim_slash(base_url.into()),
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Installed model names, from `/api/tags`.
    pub async fn models(&self) -> Result<Vec<CompactString>> {
        let tags: TagsResponse = self
            .transport
            .get_json(&format!("{}/api/tags", self.base_url), PROBE_TIMEOUT)
            .await?;
        Ok(tags.models.into_iter().map(|t| t.name).collect())
    }

    /// Whether a model (by exact name or `name:tag` prefix) is
    /// installed.
    pub async fn installed(&self, model: &str) -> Result<bool> {
        let models = self.models().await?;
        Ok(models
            .iter()
            .any(|m| m == model || m.split(':').next() == Some(model)))
    }

    /// Ask Ollama to pull a model. Returns as soon as the pull is
    /// accepted; progress is observed through [`Ollama::installed`].
    pub async fn pull(&self, model: &str) -> Result<()> {
        let body = PullBody {
            name: model,
            stream: false,
        };
        // Pull can take a long while; the serverside keeps working even
        // if we stop waiting, so only the accept round trip is bounded.
        let _: serde_json::Value = self
            .transport
            .post_json(
                &format!("{}/api/pull", self.base_url),
                &body,
                GENERATE_TIMEOUT,
            )
            .await?;
        Ok(())
    }
}

impl Generate for Ollama {
    async fn generate(&self, req: &GenerationRequest) -> Result<Completion> {
        let body = Body::from_request(req);
        let result: Result<GenerateResponse> = self
            .transport
            .post_json(
                &format!("{}/api/generate", self.base_url),
                &body,
                GENERATE_TIMEOUT,
            )
            .await;

        match result {
            Ok(response) => Ok(Completion {
                text: response.response,
            }),
            // A 404 with a model complaint means the model is not
            // installed; name it so the caller can start a download.
            Err(Error::Backend { status: 404, message })
                if message.contains("not found") =>
            {
                Err(Error::backend(
                    404,
                    format!("model {} is not installed: {message}", body.model),
                ))
            }
            Err(e) => Err(e),
        }
    }

    async fn is_alive(&self) -> bool {
        self.transport
            .probe(&format!("{}/api/tags", self.base_url))
            .await
    }
}

pub(crate) fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
