//! Strategy selection.
//!
//! One ordered decision list producing the Local/Cloud strategy for a
//! request. Pure given its inputs; the router pre-fetches the profile,
//! capability snapshot, and download state.

use crate::download::DownloadStatus;
use rudder_core::{CapabilitySnapshot, GenerationRequest, RequestProfile, ServiceMode, Strategy};

/// Pick the execution strategy for one request.
///
/// Decision order, first match wins:
/// 1. Explicit per-request overrides (`force_local`, `force_cloud`).
/// 2. Single-mode configuration (`Local` / `Cloud`).
/// 3. Hybrid: cloud while a download occupies the local backend, cloud
///    on an incompatible host, otherwise whatever the profile
///    suggests.
/// 4. Cloud as the final default.
pub fn select(
    req: &GenerationRequest,
    mode: ServiceMode,
    profile: &RequestProfile,
    caps: &CapabilitySnapshot,
    download: DownloadStatus,
) -> Strategy {
    if req.force_local {
        return Strategy::Local;
    }
    if req.force_cloud {
        return Strategy::Cloud;
    }

    match mode {
        ServiceMode::Local => Strategy::Local,
        ServiceMode::Cloud => Strategy::Cloud,
        ServiceMode::Hybrid => {
            if download == DownloadStatus::Downloading {
                // Local backend is busy pulling weights.
                return Strategy::Cloud;
            }
            if !caps.host_compatible {
                return Strategy::Cloud;
            }
            profile.suggested
        }
    }
}
