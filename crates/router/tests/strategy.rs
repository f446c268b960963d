use rudder_core::{CapabilitySnapshot, GenerationRequest, ServiceMode, Strategy, profile};
use rudder_router::download::DownloadStatus;
use rudder_router::select;

fn small_request() -> GenerationRequest {
    GenerationRequest::new("bonjour")
}

fn small_profile() -> rudder_core::RequestProfile {
    profile("bonjour", None)
}

fn incompatible_host() -> CapabilitySnapshot {
    CapabilitySnapshot {
        host_compatible: false,
        critical_incompatibilities: vec!["insufficient cpu cores".into()],
        ..CapabilitySnapshot::neutral()
    }
}

#[test]
fn force_local_beats_everything() {
    let req = small_request().force_local();
    let got = select(
        &req,
        ServiceMode::Cloud,
        &small_profile(),
        &incompatible_host(),
        DownloadStatus::Downloading,
    );
    assert_eq!(got, Strategy::Local);
}

#[test]
fn force_cloud_beats_mode() {
    let req = small_request().force_cloud();
    let got = select(
        &req,
        ServiceMode::Local,
        &small_profile(),
        &CapabilitySnapshot::neutral(),
        DownloadStatus::Idle,
    );
    assert_eq!(got, Strategy::Cloud);
}

#[test]
fn single_modes_map_directly() {
    let req = small_request();
    let caps = CapabilitySnapshot::neutral();
    assert_eq!(
        select(&req, ServiceMode::Local, &small_profile(), &caps, DownloadStatus::Idle),
        Strategy::Local
    );
    assert_eq!(
        select(&req, ServiceMode::Cloud, &small_profile(), &caps, DownloadStatus::Idle),
        Strategy::Cloud
    );
}

#[test]
fn hybrid_diverts_while_downloading() {
    let req = small_request();
    let got = select(
        &req,
        ServiceMode::Hybrid,
        &small_profile(),
        &CapabilitySnapshot::neutral(),
        DownloadStatus::Downloading,
    );
    assert_eq!(got, Strategy::Cloud);
}

#[test]
fn hybrid_diverts_on_incompatible_host() {
    let req = small_request();
    let got = select(
        &req,
        ServiceMode::Hybrid,
        &small_profile(),
        &incompatible_host(),
        DownloadStatus::Idle,
    );
    assert_eq!(got, Strategy::Cloud);
}

#[test]
fn hybrid_follows_profile_suggestion() {
    let req = small_request();
    let caps = CapabilitySnapshot::neutral();

    let light = profile("bonjour", None);
    assert_eq!(light.suggested, Strategy::Local);
    assert_eq!(
        select(&req, ServiceMode::Hybrid, &light, &caps, DownloadStatus::Idle),
        Strategy::Local
    );

    let heavy_prompt = format!("analyze this: {}", "x".repeat(9_000));
    let heavy = profile(&heavy_prompt, None);
    assert_eq!(heavy.suggested, Strategy::Cloud);
    assert_eq!(
        select(&req, ServiceMode::Hybrid, &heavy, &caps, DownloadStatus::Idle),
        Strategy::Cloud
    );
}

#[test]
fn completed_download_does_not_divert() {
    let req = small_request();
    let got = select(
        &req,
        ServiceMode::Hybrid,
        &small_profile(),
        &CapabilitySnapshot::neutral(),
        DownloadStatus::Completed,
    );
    assert_eq!(got, Strategy::Local);
}
