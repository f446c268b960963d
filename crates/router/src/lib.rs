//! Hybrid execution routing.
//!
//! Orchestration layer on top of the backend adapters: strategy
//! selection, response caching, usage accounting, model download
//! tracking, and the [`Router`] that ties them together.

pub mod cache;
pub mod download;
pub mod router;
pub mod strategy;
pub mod usage;

pub use cache::{CacheEntry, InMemoryStore, ResponseCache, Store, cache_key};
pub use download::{
    DownloadHandle, DownloadOps, DownloadState, DownloadStatus, DownloadTracker,
};
pub use router::{ConfiguredRouter, ModeRecommendation, Router};
pub use strategy::select;
pub use usage::{Ledger, MemoryLedger, UsageRecorder};
