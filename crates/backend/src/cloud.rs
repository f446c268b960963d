//! Hosted inference ("cloud") adapter.
//!
//! Posts to a provider-selectable hosted inference endpoint. A Bearer
//! credential is attached only when the request carries one. On a
//! failed primary call the adapter tries one documented secondary URL
//! before surfacing the primary error; the router treats the pair as a
//! single backend attempt.

use crate::http::{GENERATE_TIMEOUT, HttpTransport};
use crate::{Completion, Generate};
use compact_str::CompactString;
use rudder_core::{GenerationRequest, Result};
use serde::{Deserialize, Serialize};

/// Hosted inference host serving the per-model generate route.
pub const PRIMARY_HOST: &str = "https://api-inference.huggingface.co/models";
/// Documented secondary route on the same service, used once as a
/// fallback when the primary call fails.
pub const FALLBACK_HOST: &str =
    "https://api-inference.huggingface.co/pipeline/text-generation";

/// Default hosted model when neither the request nor the provider
/// pins one.
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

/// Client for the hosted inference API.
#[derive(Debug, Clone)]
pub struct Cloud {
    transport: HttpTransport,
    provider: CompactString,
}

/// Request body for the hosted inference endpoint.
#[derive(Debug, Serialize)]
pub struct Body {
    /// System prompt and user prompt, separated by a blank line.
    pub inputs: String,
    pub parameters: Parameters,
}

/// Generation parameters in the hosted inference format.
#[derive(Debug, Serialize)]
pub struct Parameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub return_full_text: bool,
}

impl Body {
    /// Translate a router request into the hosted wire format.
    pub fn from_request(req: &GenerationRequest) -> Self {
        let inputs = match req.system_prompt.as_deref() {
            Some(system) => format!("{system}\n\n{}", req.prompt),
            None => req.prompt.clone(),
        };
        Self {
            inputs,
            parameters: Parameters {
                max_new_tokens: req.max_tokens,
                temperature: req.temperature,
                top_p: req.top_p,
                top_k: req.top_k,
                return_full_text: false,
            },
        }
    }
}

/// Hosted inference responses come as either a bare object or a
/// one-element array of objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Many(Vec<Generated>),
    One(Generated),
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

impl GenerateResponse {
    fn into_text(self) -> String {
        match self {
            Self::One(g) => g.generated_text,
            Self::Many(mut v) => {
                if v.is_empty() {
                    String::new()
                } else {
                    v.swap_remove(0).generated_text
                }
            }
        }
    }
}

impl Cloud {
    /// Create a client for a provider identity.
    pub fn new(provider: impl Into<CompactString>) -> Self {
        Self {
            transport: HttpTransport::no_auth(),
            provider: provider.into(),
        }
    }

    /// The provider identity this client was built for.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Model served by this call: request hint first, then the
    /// provider default.
    pub fn model_for(&self, req: &GenerationRequest) -> CompactString {
        req.model.clone().unwrap_or_else(|| DEFAULT_MODEL.into())
    }

    /// Primary endpoint for a model.
    pub fn primary_url(&self, model: &str) -> String {
        format!("{PRIMARY_HOST}/{model}")
    }

    /// Secondary endpoint for a model.
    pub fn fallback_url(&self, model: &str) -> String {
        format!("{FALLBACK_HOST}/{model}")
    }
}

impl Generate for Cloud {
    async fn generate(&self, req: &GenerationRequest) -> Result<Completion> {
        let transport = match req.api_key.as_deref() {
            Some(key) => self.transport.with_bearer(key)?,
            None => self.transport.clone(),
        };
        let model = self.model_for(req);
        let body = Body::from_request(req);

        let primary: Result<GenerateResponse> = transport
            .post_json(&self.primary_url(&model), &body, GENERATE_TIMEOUT)
            .await;

        let response = match primary {
            Ok(response) => response,
            Err(primary_err) => {
                tracing::warn!(
                    provider = %self.provider,
                    error = %primary_err,
                    "primary cloud endpoint failed, trying secondary"
                );
                match transport
                    .post_json(&self.fallback_url(&model), &body, GENERATE_TIMEOUT)
                    .await
                {
                    Ok(response) => response,
                    // Surface the primary error; the secondary is an
                    // implementation detail of this adapter.
                    Err(_) => return Err(primary_err),
                }
            }
        };

        Ok(Completion {
            text: response.into_text(),
        })
    }

    async fn is_alive(&self) -> bool {
        self.transport.probe(PRIMARY_HOST).await
    }
}
