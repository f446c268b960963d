//! Host capability probe.
//!
//! Measures the executing environment once and scores it for local
//! inference. Every signal that cannot be read degrades to a neutral
//! value instead of erroring: the probe itself never fails.
//!
//! Four host capabilities are required for local execution at all:
//! parallel compute (≥2 logical CPUs), background worker threads, a
//! usable network socket primitive, and a writable platform data
//! directory. A missing one is recorded as a critical
//! incompatibility and clears `host_compatible`.

use compact_str::CompactString;
use parking_lot::RwLock;
use std::time::{Duration, Instant};
use sysinfo::System;

/// How long a snapshot stays fresh.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(5 * 60);

/// Memory size treated as a full score, in bytes (8 GiB).
const FULL_MEMORY: u64 = 8 * 1024 * 1024 * 1024;
/// Core count treated as a full score.
const FULL_CORES: usize = 8;

/// Point-in-time measurement of the host environment.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilitySnapshot {
    /// Normalized memory score in [0, 1].
    pub memory_score: f64,
    /// Normalized CPU score in [0, 1].
    pub cpu_score: f64,
    /// Whether a GPU acceleration path was detected.
    pub gpu_available: bool,
    /// Whether all required host capabilities are present.
    pub host_compatible: bool,
    /// Reasons for required capabilities that are missing.
    pub critical_incompatibilities: Vec<CompactString>,
}

impl CapabilitySnapshot {
    /// A conservative snapshot used when nothing can be measured.
    pub fn neutral() -> Self {
        Self {
            memory_score: 0.5,
            cpu_score: 0.5,
            gpu_available: false,
            host_compatible: true,
            critical_incompatibilities: Vec::new(),
        }
    }

    /// Whether the combined scores favor local execution.
    pub fn recommends_local(&self) -> bool {
        if !self.host_compatible {
            return false;
        }
        let combined = self.memory_score * 0.5 + self.cpu_score * 0.5;
        combined > 0.6 || (self.gpu_available && combined > 0.5)
    }
}

/// Measure the host environment.
///
/// Synchronous and cheap; suitable for the request path when the
/// cached snapshot has gone stale. Callers should prefer
/// [`CapabilityCache::snapshot`].
pub fn probe() -> CapabilitySnapshot {
    let mut critical = Vec::new();

    let cores = std::thread::available_parallelism().ok().map(|n| n.get());
    let (cpu_score, cpu_flag) = cpu_signal(cores);
    if let Some(flag) = cpu_flag {
        critical.push(flag);
    }

    let mut sys = System::new();
    sys.refresh_memory();
    let total = sys.total_memory();
    let memory_score = if total == 0 {
        0.5
    } else {
        (total as f64 / FULL_MEMORY as f64).min(1.0)
    };

    if !worker_threads_available() {
        critical.push(CompactString::const_new(
            "background worker threads unavailable",
        ));
    }
    if !socket_available() {
        critical.push(CompactString::const_new(
            "network socket primitive unavailable",
        ));
    }
    if !data_dir_writable() {
        critical.push(CompactString::const_new(
            "no writable platform data directory",
        ));
    }

    let snapshot = CapabilitySnapshot {
        memory_score,
        cpu_score,
        gpu_available: detect_gpu(),
        host_compatible: critical.is_empty(),
        critical_incompatibilities: critical,
    };
    tracing::debug!(
        memory = snapshot.memory_score,
        cpu = snapshot.cpu_score,
        gpu = snapshot.gpu_available,
        compatible = snapshot.host_compatible,
        "capability probe"
    );
    snapshot
}

/// Score the logical-CPU signal. An unreadable count defaults to the
/// neutral score with no incompatibility; only a count that was read
/// and is below 2 flags the host.
fn cpu_signal(cores: Option<usize>) -> (f64, Option<CompactString>) {
    match cores {
        None => (0.5, None),
        Some(n) => {
            let score = (n as f64 / FULL_CORES as f64).min(1.0);
            let flag = (n < 2).then(|| {
                CompactString::const_new(
                    "parallel execution unavailable (fewer than 2 logical CPUs)",
                )
            });
            (score, flag)
        }
    }
}

fn worker_threads_available() -> bool {
    std::thread::Builder::new()
        .name("rudder-probe".into())
        .spawn(|| {})
        .map(|h| h.join().is_ok())
        .unwrap_or(false)
}

fn socket_available() -> bool {
    std::net::UdpSocket::bind(("127.0.0.1", 0)).is_ok()
}

fn data_dir_writable() -> bool {
    let Some(dir) = dirs::data_dir() else {
        return false;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return false;
    }
    !std::fs::metadata(&dir)
        .map(|m| m.permissions().readonly())
        .unwrap_or(true)
}

/// Coarse GPU detection: Apple Silicon, a CUDA installation, or a DRM
/// render node. Wrong in exotic setups, which only costs a suboptimal
/// strategy suggestion.
fn detect_gpu() -> bool {
    #[cfg(target_os = "macos")]
    {
        if std::env::consts::ARCH == "aarch64" {
            return true;
        }
    }
    if std::env::var_os("CUDA_VISIBLE_DEVICES").is_some()
        || std::path::Path::new("/dev/nvidia0").exists()
    {
        return true;
    }
    std::path::Path::new("/dev/dri").exists()
}

/// TTL cache around [`probe`].
///
/// Concurrent recomputation is acceptable: probing is idempotent and
/// cheap, so the lock is never held across a probe.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    cached: RwLock<Option<(Instant, CapabilitySnapshot)>>,
}

impl CapabilityCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fresh snapshot, probing if the cached one is older
    /// than [`SNAPSHOT_TTL`].
    pub fn snapshot(&self) -> CapabilitySnapshot {
        if let Some((at, snap)) = self.cached.read().as_ref()
            && at.elapsed() < SNAPSHOT_TTL
        {
            return snap.clone();
        }
        let snap = probe();
        *self.cached.write() = Some((Instant::now(), snap.clone()));
        snap
    }

    /// Drop the cached snapshot so the next call probes again.
    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }
}
