//! Model download tracking.
//!
//! One tracker per local backend. A single background poller writes
//! the state; strategy evaluation and progress UIs read it
//! concurrently. The poll loop is bound to the Downloading state: it
//! starts when a download is accepted and exits deterministically on
//! the first tick after the state leaves Downloading.

use compact_str::CompactString;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rudder_backend::{DownloadProgress, LocalBackend};
use rudder_core::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// How often the poller queries the backend while Downloading.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Where a tracked download currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// No download requested.
    Idle,
    /// A download is in flight; the local backend is busy.
    Downloading,
    /// The last download finished.
    Completed,
    /// The last download failed.
    Error,
}

/// Snapshot of the tracked download.
#[derive(Debug, Clone)]
pub struct DownloadState {
    /// Current phase.
    pub status: DownloadStatus,
    /// Model being (or last) downloaded.
    pub model: Option<CompactString>,
    /// Progress percentage in [0, 100].
    pub progress: f32,
    /// When the download was accepted.
    pub started_at: Option<DateTime<Utc>>,
    /// When it reached Completed or Error.
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure detail, for Error.
    pub error: Option<String>,
}

impl Default for DownloadState {
    fn default() -> Self {
        Self {
            status: DownloadStatus::Idle,
            model: None,
            progress: 0.0,
            started_at: None,
            completed_at: None,
            error: None,
        }
    }
}

/// Read handle over the shared download state.
///
/// The router holds one of these; it never blocks on the poller.
#[derive(Debug, Clone, Default)]
pub struct DownloadHandle {
    state: Arc<RwLock<DownloadState>>,
}

impl DownloadHandle {
    /// A handle that always reads Idle; for routers without a tracker.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Current status.
    pub fn status(&self) -> DownloadStatus {
        self.state.read().status
    }

    /// Full state snapshot.
    pub fn state(&self) -> DownloadState {
        self.state.read().clone()
    }

    /// Whether two handles observe the same download.
    pub fn is_same(&self, other: &DownloadHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Backend operations the tracker needs; implemented by
/// [`LocalBackend`] and by test fakes.
pub trait DownloadOps: Send + Sync + Clone + 'static {
    /// Ask the backend to begin downloading a model.
    fn begin(&self, model: &str) -> impl Future<Output = Result<()>> + Send;
    /// Query current progress for a model.
    fn progress(&self, model: &str) -> impl Future<Output = Result<DownloadProgress>> + Send;
}

impl DownloadOps for LocalBackend {
    async fn begin(&self, model: &str) -> Result<()> {
        self.begin_download(model).await
    }

    async fn progress(&self, model: &str) -> Result<DownloadProgress> {
        self.download_progress(model).await
    }
}

/// Tracks one local backend's model download.
#[derive(Debug)]
pub struct DownloadTracker<B> {
    backend: B,
    handle: DownloadHandle,
    failures: Arc<AtomicU32>,
    failure_budget: u32,
}

impl<B> Clone for DownloadTracker<B>
where
    B: Clone,
{
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            handle: self.handle.clone(),
            failures: self.failures.clone(),
            failure_budget: self.failure_budget,
        }
    }
}

impl<B: DownloadOps> DownloadTracker<B> {
    /// Create a tracker for a backend. `failure_budget` is how many
    /// consecutive poll failures are absorbed before the state
    /// transitions to Error.
    pub fn new(backend: B, failure_budget: u32) -> Self {
        Self {
            backend,
            handle: DownloadHandle::default(),
            failures: Arc::new(AtomicU32::new(0)),
            failure_budget,
        }
    }

    /// Read handle for strategy evaluation and progress UIs.
    pub fn handle(&self) -> DownloadHandle {
        self.handle.clone()
    }

    /// Consecutive poll failures tolerated before giving up.
    pub fn failure_budget(&self) -> u32 {
        self.failure_budget
    }

    /// Current state snapshot.
    pub fn status(&self) -> DownloadState {
        self.handle.state()
    }

    /// Request a model download.
    ///
    /// Rejects with [`Error::DownloadInProgress`] while one is already
    /// Downloading; a previous Completed or Error state is replaced.
    /// On acceptance, spawns the background poller bound to this
    /// download.
    pub async fn start_download(&self, model: &str) -> Result<()> {
        // Reserve the Downloading slot before the backend call so two
        // concurrent requests cannot both proceed.
        {
            let mut state = self.handle.state.write();
            if state.status == DownloadStatus::Downloading {
                let current = state.model.clone().unwrap_or_default();
                return Err(Error::DownloadInProgress(current));
            }
            *state = DownloadState {
                status: DownloadStatus::Downloading,
                model: Some(model.into()),
                progress: 0.0,
                started_at: Some(Utc::now()),
                completed_at: None,
                error: None,
            };
        }
        self.failures.store(0, Ordering::Relaxed);

        if let Err(e) = self.backend.begin(model).await {
            let mut state = self.handle.state.write();
            *state = DownloadState::default();
            return Err(e);
        }

        tracing::info!(model, "model download accepted");
        self.spawn_poller();
        Ok(())
    }

    /// Advance the state by querying the backend once.
    ///
    /// Transient failures leave the state unchanged until the
    /// consecutive-failure budget runs out, then transition to Error.
    /// Never returns an error into the caller.
    pub async fn poll(&self) {
        let model = {
            let state = self.handle.state.read();
            if state.status != DownloadStatus::Downloading {
                return;
            }
            state.model.clone().unwrap_or_default()
        };

        match self.backend.progress(&model).await {
            Ok(progress) => {
                self.failures.store(0, Ordering::Relaxed);
                self.apply(progress);
            }
            Err(e) => {
                let failed = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
                if failed >= self.failure_budget {
                    tracing::warn!(model = %model, "download polling gave up: {e}");
                    let mut state = self.handle.state.write();
                    state.status = DownloadStatus::Error;
                    state.completed_at = Some(Utc::now());
                    state.error = Some(format!("progress polling failed: {e}"));
                } else {
                    tracing::debug!(
                        model = %model,
                        failed,
                        budget = self.failure_budget,
                        "transient download poll failure: {e}"
                    );
                }
            }
        }
    }

    fn apply(&self, progress: DownloadProgress) {
        let mut state = self.handle.state.write();
        if state.status != DownloadStatus::Downloading {
            return;
        }
        match progress.status.as_str() {
            "completed" => {
                state.status = DownloadStatus::Completed;
                state.progress = 100.0;
                state.completed_at = Some(Utc::now());
            }
            "error" => {
                state.status = DownloadStatus::Error;
                state.completed_at = Some(Utc::now());
                state.error = progress.error;
            }
            _ => {
                state.progress = progress.progress.clamp(0.0, 100.0);
                if state.progress >= 100.0 {
                    state.status = DownloadStatus::Completed;
                    state.completed_at = Some(Utc::now());
                }
            }
        }
    }

    /// Background poll loop. Ticks every [`POLL_INTERVAL`] and exits
    /// as soon as the state leaves Downloading, so no timer outlives
    /// its download.
    fn spawn_poller(&self) {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            // The first tick fires immediately; skip it so begin() has
            // a full interval before the first progress query.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tracker.handle.status() != DownloadStatus::Downloading {
                    break;
                }
                tracker.poll().await;
            }
            tracing::debug!("download poller exited");
        });
    }
}
