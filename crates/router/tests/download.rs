use parking_lot::Mutex;
use rudder_backend::DownloadProgress;
use rudder_core::{Error, Result};
use rudder_router::download::{DownloadOps, DownloadStatus, DownloadTracker};
use std::collections::VecDeque;
use std::sync::Arc;

/// Scripted backend for the tracker: each poll consumes one step.
#[derive(Clone)]
struct FakeOps {
    begin_ok: bool,
    steps: Arc<Mutex<VecDeque<Step>>>,
}

enum Step {
    Progress(&'static str, f32),
    ProgressError(&'static str),
    Fail,
}

impl FakeOps {
    fn new(begin_ok: bool, steps: Vec<Step>) -> Self {
        Self {
            begin_ok,
            steps: Arc::new(Mutex::new(steps.into())),
        }
    }
}

impl DownloadOps for FakeOps {
    async fn begin(&self, _model: &str) -> Result<()> {
        if self.begin_ok {
            Ok(())
        } else {
            Err(Error::Unavailable("backend offline".into()))
        }
    }

    async fn progress(&self, model: &str) -> Result<DownloadProgress> {
        match self.steps.lock().pop_front() {
            Some(Step::Progress(status, progress)) => Ok(DownloadProgress {
                status: status.into(),
                model: Some(model.into()),
                progress,
                error: None,
            }),
            Some(Step::ProgressError(detail)) => Ok(DownloadProgress {
                status: "error".into(),
                model: Some(model.into()),
                progress: 0.0,
                error: Some(detail.to_owned()),
            }),
            Some(Step::Fail) | None => Err(Error::Unavailable("progress endpoint down".into())),
        }
    }
}

#[tokio::test]
async fn start_marks_downloading() {
    let tracker = DownloadTracker::new(FakeOps::new(true, vec![]), 5);
    tracker.start_download("mistral").await.unwrap();

    let state = tracker.status();
    assert_eq!(state.status, DownloadStatus::Downloading);
    assert_eq!(state.model.as_deref(), Some("mistral"));
    assert_eq!(state.progress, 0.0);
    assert!(state.started_at.is_some());
}

#[tokio::test]
async fn concurrent_start_is_rejected() {
    let tracker = DownloadTracker::new(FakeOps::new(true, vec![]), 5);
    tracker.start_download("mistral").await.unwrap();

    let err = tracker.start_download("llama3").await.unwrap_err();
    match err {
        Error::DownloadInProgress(model) => assert_eq!(model, "mistral"),
        other => panic!("unexpected error: {other}"),
    }
    // The first download is untouched.
    assert_eq!(tracker.status().model.as_deref(), Some("mistral"));
}

#[tokio::test]
async fn failed_begin_resets_to_idle() {
    let tracker = DownloadTracker::new(FakeOps::new(false, vec![]), 5);
    assert!(tracker.start_download("mistral").await.is_err());
    assert_eq!(tracker.status().status, DownloadStatus::Idle);
}

#[tokio::test]
async fn poll_advances_progress_then_completes() {
    let ops = FakeOps::new(
        true,
        vec![
            Step::Progress("downloading", 40.0),
            Step::Progress("completed", 100.0),
        ],
    );
    let tracker = DownloadTracker::new(ops, 5);
    tracker.start_download("mistral").await.unwrap();

    tracker.poll().await;
    let state = tracker.status();
    assert_eq!(state.status, DownloadStatus::Downloading);
    assert_eq!(state.progress, 40.0);

    tracker.poll().await;
    let state = tracker.status();
    assert_eq!(state.status, DownloadStatus::Completed);
    assert_eq!(state.progress, 100.0);
    assert!(state.completed_at.is_some());
}

#[tokio::test]
async fn hundred_percent_implies_completed() {
    let ops = FakeOps::new(true, vec![Step::Progress("downloading", 100.0)]);
    let tracker = DownloadTracker::new(ops, 5);
    tracker.start_download("mistral").await.unwrap();

    tracker.poll().await;
    assert_eq!(tracker.status().status, DownloadStatus::Completed);
}

#[tokio::test]
async fn backend_error_status_is_recorded() {
    let ops = FakeOps::new(true, vec![Step::ProgressError("disk full")]);
    let tracker = DownloadTracker::new(ops, 5);
    tracker.start_download("mistral").await.unwrap();

    tracker.poll().await;
    let state = tracker.status();
    assert_eq!(state.status, DownloadStatus::Error);
    assert_eq!(state.error.as_deref(), Some("disk full"));
}

#[tokio::test]
async fn transient_poll_failures_are_absorbed_until_budget() {
    let ops = FakeOps::new(true, vec![Step::Fail, Step::Fail]);
    let tracker = DownloadTracker::new(ops, 2);
    tracker.start_download("mistral").await.unwrap();

    tracker.poll().await;
    assert_eq!(tracker.status().status, DownloadStatus::Downloading);

    tracker.poll().await;
    let state = tracker.status();
    assert_eq!(state.status, DownloadStatus::Error);
    assert!(state.error.as_deref().unwrap().contains("polling failed"));
}

#[tokio::test]
async fn successful_poll_resets_failure_count() {
    let ops = FakeOps::new(
        true,
        vec![
            Step::Fail,
            Step::Progress("downloading", 10.0),
            Step::Fail,
        ],
    );
    let tracker = DownloadTracker::new(ops, 2);
    tracker.start_download("mistral").await.unwrap();

    tracker.poll().await;
    tracker.poll().await;
    tracker.poll().await;
    // Two failures total, but never two in a row.
    assert_eq!(tracker.status().status, DownloadStatus::Downloading);
}

#[tokio::test]
async fn terminal_state_allows_restart() {
    let ops = FakeOps::new(true, vec![Step::Progress("completed", 100.0)]);
    let tracker = DownloadTracker::new(ops, 5);
    tracker.start_download("mistral").await.unwrap();
    tracker.poll().await;
    assert_eq!(tracker.status().status, DownloadStatus::Completed);

    tracker.start_download("llama3").await.unwrap();
    let state = tracker.status();
    assert_eq!(state.status, DownloadStatus::Downloading);
    assert_eq!(state.model.as_deref(), Some("llama3"));
}

#[tokio::test]
async fn poll_outside_downloading_is_a_no_op() {
    let ops = FakeOps::new(true, vec![]);
    let tracker = DownloadTracker::new(ops, 5);
    tracker.poll().await;
    assert_eq!(tracker.status().status, DownloadStatus::Idle);
}
