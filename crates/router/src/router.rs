//! The execution router.
//!
//! Single entry point for text generation: validates, budgets,
//! consults the response cache, picks a strategy, dispatches to one
//! backend, recovers once in hybrid mode, and writes through to the
//! cache and usage ledger. At most one backend call beyond the initial
//! attempt ever happens.
//!
//! `execute` calls are independent and safe to run concurrently; the
//! only shared state is read-mostly (capability snapshot, download
//! state). Dropping the returned future cancels the in-flight backend
//! call; cache and ledger writes from an already-completed call are
//! still applied.

use crate::cache::{ResponseCache, Store};
use crate::download::{DownloadHandle, DownloadStatus, DownloadTracker};
use crate::strategy;
use crate::usage::{Ledger, UsageRecorder};
use rudder_backend::{Cloud, Generate, LocalBackend};
use rudder_core::{
    CapabilityCache, Error, GenerationRequest, Result, RouterConfig, ServiceMode, Strategy,
    UsageEvent, estimate_tokens, profile,
};
use std::sync::Arc;

/// Hybrid local/cloud execution router.
pub struct Router<LB, CB, S, L> {
    local: LB,
    cloud: CB,
    config: RouterConfig,
    cache: ResponseCache<S>,
    usage: UsageRecorder<L>,
    caps: CapabilityCache,
    download: DownloadHandle,
}

/// Diagnostic mode recommendation for status displays.
#[derive(Debug, Clone)]
pub struct ModeRecommendation {
    /// The mode this host and backend set support best.
    pub mode: ServiceMode,
    /// Human-readable reason.
    pub reason: String,
    /// Whether the local backend answered its liveness probe.
    pub local_alive: bool,
    /// Whether the cloud backend answered its liveness probe.
    pub cloud_alive: bool,
    /// Whether the host scores favor local execution.
    pub host_capable: bool,
}

impl<LB, CB, S, L> Router<LB, CB, S, L>
where
    LB: Generate,
    CB: Generate,
    S: Store,
    L: Ledger,
{
    /// Assemble a router from its collaborators.
    pub fn new(local: LB, cloud: CB, config: RouterConfig, store: S, ledger: Arc<L>) -> Self {
        Self {
            local,
            cloud,
            config,
            cache: ResponseCache::new(store),
            usage: UsageRecorder::new(ledger),
            caps: CapabilityCache::new(),
            download: DownloadHandle::idle(),
        }
    }

    /// Attach the download tracker's read handle so strategy
    /// selection sees in-flight downloads.
    pub fn with_download(mut self, download: DownloadHandle) -> Self {
        self.download = download;
        self
    }

    /// The configuration this router was built with.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The download handle this router consults when routing.
    pub fn download(&self) -> &DownloadHandle {
        &self.download
    }

    /// Fresh (TTL-cached) capability snapshot, for diagnostics.
    pub fn capabilities(&self) -> rudder_core::CapabilitySnapshot {
        self.caps.snapshot()
    }

    /// Execute one generation request.
    ///
    /// `mode` is the configured service mode for this call and
    /// `provider` the cloud provider identity used for budgeting,
    /// caching, and accounting.
    pub async fn execute(
        &self,
        req: &GenerationRequest,
        mode: ServiceMode,
        provider: &str,
    ) -> Result<String> {
        req.validate()?;
        let req = self.budgeted(req, provider)?;

        // Cache consultation is skipped when the caller insists on
        // local execution: cached entries are cloud responses.
        if !req.force_local
            && let Some(entry) =
                self.cache
                    .lookup(&req.prompt, req.system_prompt.as_deref(), provider)
        {
            tracing::debug!(provider, "response cache hit");
            let input = estimate_tokens(&req.prompt)
                + req.system_prompt.as_deref().map(estimate_tokens).unwrap_or(0);
            self.usage
                .record(UsageEvent::cached(provider, input, entry.tokens_used));
            return Ok(entry.response_text);
        }

        let profile = profile(&req.prompt, req.system_prompt.as_deref());
        let caps = self.caps.snapshot();
        let mut chosen = strategy::select(&req, mode, &profile, &caps, self.download.status());

        // A download occupies the local backend; divert this call only,
        // without touching the configured mode.
        if chosen == Strategy::Local && self.download.status() == DownloadStatus::Downloading {
            tracing::debug!("local backend busy downloading, diverting to cloud");
            chosen = Strategy::Cloud;
        }

        tracing::debug!(
            ?chosen,
            ?mode,
            tokens = profile.estimated_tokens,
            complexity = ?profile.complexity,
            "dispatching generation"
        );

        let (text, used) = match self.dispatch(&req, chosen).await {
            Ok(text) => (text, chosen),
            Err(original) => {
                if mode != ServiceMode::Hybrid || !original.recoverable() {
                    return Err(original);
                }
                let opposite = chosen.opposite();
                tracing::warn!(
                    error = %original,
                    ?opposite,
                    "backend failed in hybrid mode, trying opposite strategy"
                );
                match self.dispatch(&req, opposite).await {
                    Ok(text) => (text, opposite),
                    // Both sides failed: the original error is the one
                    // callers care about.
                    Err(_) => return Err(original),
                }
            }
        };

        // Local execution is neither metered nor cached.
        if used == Strategy::Cloud {
            let input = estimate_tokens(&req.prompt)
                + req.system_prompt.as_deref().map(estimate_tokens).unwrap_or(0);
            let output = estimate_tokens(&text);
            if let Err(e) = self.cache.store(
                &req.prompt,
                req.system_prompt.as_deref(),
                provider,
                &text,
                output,
            ) {
                tracing::warn!("response cache write failed: {e}");
            }
            self.usage
                .record(UsageEvent::metered(provider, input, output));
        }

        Ok(text)
    }

    /// Diagnostic: which mode this host and backend set support best.
    pub async fn recommend_mode(&self) -> ModeRecommendation {
        let caps = self.caps.snapshot();
        let host_capable = caps.recommends_local();
        let local_alive = self.local.is_alive().await;
        let cloud_alive = self.cloud.is_alive().await;

        let (mode, reason) = if local_alive && host_capable {
            (
                ServiceMode::Local,
                "local backend reachable and host resources are sufficient".to_owned(),
            )
        } else if local_alive {
            (
                ServiceMode::Cloud,
                "local backend reachable but host resources are limited".to_owned(),
            )
        } else if cloud_alive {
            (
                ServiceMode::Cloud,
                "no local backend detected, cloud service reachable".to_owned(),
            )
        } else {
            (
                ServiceMode::Cloud,
                "no backend reachable, defaulting to cloud".to_owned(),
            )
        };

        ModeRecommendation {
            mode,
            reason,
            local_alive,
            cloud_alive,
            host_capable,
        }
    }

    async fn dispatch(&self, req: &GenerationRequest, strategy: Strategy) -> Result<String> {
        let completion = match strategy {
            Strategy::Local => self.local.generate(req).await?,
            Strategy::Cloud => self.cloud.generate(req).await?,
        };
        Ok(completion.text)
    }

    /// Apply the provider token budget: truncate an oversized prompt
    /// (never the system prompt) and clamp the requested output
    /// length. A system prompt that exhausts the budget on its own is
    /// rejected rather than silently dispatching an empty prompt.
    fn budgeted(&self, req: &GenerationRequest, provider: &str) -> Result<GenerationRequest> {
        let limit = self.config.limits.limit_for(provider);
        let estimated = req.profiled_chars().div_ceil(4);

        let req = if estimated > 2 * limit as usize {
            let system_chars = req
                .system_prompt
                .as_deref()
                .map(|s| s.chars().count())
                .unwrap_or(0);
            let budget_chars = (limit as usize * 4).saturating_sub(system_chars);
            if budget_chars == 0 {
                return Err(Error::Validation(format!(
                    "system prompt alone exceeds the {limit}-token budget for {provider}"
                )));
            }
            tracing::warn!(
                provider,
                estimated,
                limit,
                "prompt exceeds twice the provider budget, truncating"
            );
            req.truncated_to(budget_chars)
        } else {
            req.clone()
        };

        Ok(req.clamped_to(limit))
    }
}

/// Router wired to the real backends named by a configuration.
pub type ConfiguredRouter<S, L> = Router<LocalBackend, Cloud, S, L>;

impl<S: Store, L: Ledger> ConfiguredRouter<S, L> {
    /// Build a router whose backends come from the configuration,
    /// together with the download tracker for its local backend.
    ///
    /// The tracker's read handle is already attached, so downloads
    /// started through the returned tracker divert routing while they
    /// run. The tracker's consecutive-failure budget comes from
    /// `config.poll_failure_budget`.
    pub fn from_config(
        config: RouterConfig,
        store: S,
        ledger: Arc<L>,
    ) -> (Self, DownloadTracker<LocalBackend>) {
        let local = LocalBackend::from_config(&config);
        let tracker = DownloadTracker::new(local.clone(), config.poll_failure_budget);
        let cloud = Cloud::new(config.cloud_provider.clone());
        let router =
            Self::new(local, cloud, config, store, ledger).with_download(tracker.handle());
        (router, tracker)
    }
}
