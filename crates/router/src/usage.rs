//! Usage accounting.
//!
//! Events are appended to an external ledger off the request path:
//! recording never blocks or fails the surrounding generation. Ledger
//! failures are logged and swallowed.

use parking_lot::Mutex;
use rudder_core::UsageEvent;
use std::sync::Arc;

/// Append-only ledger collaborator.
pub trait Ledger: Send + Sync + 'static {
    /// Append one event.
    fn append(&self, event: UsageEvent) -> anyhow::Result<()>;
}

/// In-memory ledger for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    events: Mutex<Vec<UsageEvent>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<UsageEvent> {
        self.events.lock().clone()
    }
}

impl Ledger for MemoryLedger {
    fn append(&self, event: UsageEvent) -> anyhow::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Fire-and-forget recorder around a [`Ledger`].
#[derive(Debug)]
pub struct UsageRecorder<L> {
    ledger: Arc<L>,
}

impl<L> Clone for UsageRecorder<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
        }
    }
}

impl<L: Ledger> UsageRecorder<L> {
    /// Wrap a ledger.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Shared handle to the underlying ledger.
    pub fn ledger(&self) -> Arc<L> {
        self.ledger.clone()
    }

    /// Record an event without blocking the caller. Append failures
    /// are logged, never surfaced.
    pub fn record(&self, event: UsageEvent) {
        let ledger = self.ledger.clone();
        tokio::spawn(async move {
            if let Err(e) = ledger.append(event) {
                tracing::warn!("usage ledger append failed: {e}");
            }
        });
    }
}
