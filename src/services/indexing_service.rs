use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, interval_at, Instant};

use crate::error::AppError;
use crate::models::indexing::{IndexingJobStatus, JobState};
use crate::services::library_api::{LibraryApi, StartOutcome};
use crate::state::IndexingMonitorState;

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const ELAPSED_TICK: Duration = Duration::from_secs(1);
const TIP_ROTATION: Duration = Duration::from_secs(5);

/// Seconds of observed indexing time before the user is offered the option
/// to continue in the background.
const BACKGROUND_CONTINUE_AFTER_SECS: u64 = 5;

/// Assumed throughput divisor for the ETA estimate. This is a deliberate
/// rough guess, not a measured rate; the buckets below keep it honest.
const ETA_THROUGHPUT_DIVISOR: f64 = 30.0;

const TIPS: &[&str] = &[
    "You can keep using your computer while photos are indexed.",
    "Search understands what is in a photo, not just its file name.",
    "Text inside photos becomes searchable once indexing finishes.",
    "New photos in your folders are picked up automatically later.",
];

pub fn tip_at(index: usize) -> &'static str {
    TIPS[index % TIPS.len()]
}

/// Human label for a backend-reported phase. Unknown phases pass through
/// as-is; an empty phase gets a generic label.
pub fn phase_label(phase: &str) -> String {
    match phase {
        "" => "Working…".to_string(),
        "discovery" => "Finding your photos".to_string(),
        "scanning" => "Scanning photos".to_string(),
        "thumbnails" => "Creating thumbnails".to_string(),
        "metadata" => "Reading photo details".to_string(),
        "ocr" => "Reading text in photos".to_string(),
        "embeddings" => "Understanding photo content".to_string(),
        "faces" => "Finding faces".to_string(),
        "tagging" => "Tagging photos".to_string(),
        "completed" | "complete" => "Finishing up".to_string(),
        other => other.to_string(),
    }
}

/// Whole percentage of processed files, or None while the total is still
/// unknown (the display stays indeterminate rather than dividing by zero).
pub fn percent(processed: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    Some((processed.saturating_mul(100) / total).min(100) as u8)
}

/// Bucketed completion estimate. Assumes `processed / 30` items per second
/// and reports a coarse range; never a precise forecast.
pub fn eta_text(processed: u64, total: u64) -> Option<String> {
    if processed == 0 || total == 0 {
        return None;
    }
    let per_second = processed as f64 / ETA_THROUGHPUT_DIVISOR;
    let remaining_secs = total.saturating_sub(processed) as f64 / per_second;

    let text = if remaining_secs < 60.0 {
        "Less than a minute left"
    } else if remaining_secs < 300.0 {
        "A few minutes left"
    } else if remaining_secs < 900.0 {
        "Less than 15 minutes left"
    } else if remaining_secs < 3600.0 {
        "Less than an hour left"
    } else {
        "This may take a while"
    };
    Some(text.to_string())
}

/// Replaces the held snapshot and recomputes every derived field. The
/// elapsed counter, the background-continue latch and the rotating tip are
/// owned by the timers and are left untouched.
pub fn apply_snapshot(state: &mut IndexingMonitorState, status: IndexingJobStatus) {
    state.phase_label = phase_label(&status.progress.current_phase);
    state.percent = percent(status.progress.processed_files, status.progress.total_files);
    state.indeterminate = status.progress.total_files == 0;
    state.eta = eta_text(status.progress.processed_files, status.progress.total_files);
    state.active_error = status.active_error().map(str::to_string);
    state.finished = status.is_finished();
    state.last_polled_at = Some(chrono::Utc::now().to_rfc3339());
    state.snapshot = Some(status);
}

/// One second of wall time has passed. Accumulates elapsed indexing time and
/// sets the background-continue latch once enough has passed. The latch is
/// monotonic: once visible it stays visible for the life of the monitor.
/// Returns whether anything changed.
pub fn tick_elapsed(state: &mut IndexingMonitorState) -> bool {
    let actively_indexing = matches!(
        state.snapshot.as_ref().map(|s| s.status),
        Some(JobState::Indexing)
    ) && !state.finished;
    if !actively_indexing {
        return false;
    }

    state.elapsed_secs += 1;
    if state.elapsed_secs >= BACKGROUND_CONTINUE_AFTER_SECS {
        state.background_continue_available = true;
    }
    true
}

/// Configures the job's scan roots, then requests a full scan. A job that is
/// already running counts as a successful launch.
pub async fn launch(api: &LibraryApi, roots: &[String]) -> Result<StartOutcome, AppError> {
    api.set_scan_roots(roots).await?;
    let outcome = api.start_indexing(true).await?;
    if outcome == StartOutcome::AlreadyRunning {
        log::info!("indexing job already running, treating launch as successful");
    }
    Ok(outcome)
}

/// Cancellation handle for a running monitor. Dropping it (or calling
/// `stop_monitor`) tears the task down; no poll request outlives it.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: tauri::async_runtime::JoinHandle<()>,
}

pub fn start_monitor<F>(
    api: LibraryApi,
    state: Arc<Mutex<IndexingMonitorState>>,
    on_update: F,
) -> MonitorHandle
where
    F: Fn(&IndexingMonitorState) + Send + 'static,
{
    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tauri::async_runtime::spawn(run_monitor(api, state, on_update, shutdown_rx));
    MonitorHandle { shutdown, task }
}

pub fn stop_monitor(handle: MonitorHandle) {
    let _ = handle.shutdown.send(true);
    // abort as well, so an in-flight status request cannot outlive the step
    handle.task.abort();
}

/// The monitor loop. Three timers run until shutdown: the status poll (2s),
/// the elapsed-seconds ticker (1s) and the rotating tip (5s). They share the
/// monitor state and nothing else. A failed poll is logged and retried on
/// the next tick, unbounded.
pub async fn run_monitor<F>(
    api: LibraryApi,
    state: Arc<Mutex<IndexingMonitorState>>,
    on_update: F,
    mut shutdown: watch::Receiver<bool>,
) where
    F: Fn(&IndexingMonitorState) + Send + 'static,
{
    let mut poll = interval(POLL_INTERVAL);
    // delay the first tick of the slower timers so t=0 does not count as
    // elapsed time or rotate the tip away from its initial value
    let mut elapsed = interval_at(Instant::now() + ELAPSED_TICK, ELAPSED_TICK);
    let mut tips = interval_at(Instant::now() + TIP_ROTATION, TIP_ROTATION);
    let mut tip_index = 0usize;

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = poll.tick() => {
                match api.fetch_status().await {
                    Ok(status) => {
                        let mut guard = lock_state(&state);
                        apply_snapshot(&mut guard, status);
                        on_update(&guard);
                    }
                    Err(e) => {
                        log::warn!("status poll failed, retrying on next tick: {e}");
                    }
                }
            }
            _ = elapsed.tick() => {
                let mut guard = lock_state(&state);
                if tick_elapsed(&mut guard) {
                    on_update(&guard);
                }
            }
            _ = tips.tick() => {
                let mut guard = lock_state(&state);
                tip_index += 1;
                guard.tip = tip_at(tip_index).to_string();
                on_update(&guard);
            }
        }
    }
}

fn lock_state(state: &Mutex<IndexingMonitorState>) -> MutexGuard<'_, IndexingMonitorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::indexing::JobProgress;

    fn indexing_status(phase: &str, processed: u64, total: u64) -> IndexingJobStatus {
        IndexingJobStatus {
            status: JobState::Indexing,
            progress: JobProgress {
                total_files: total,
                processed_files: processed,
                current_phase: phase.to_string(),
            },
            errors: Vec::new(),
            started_at: None,
            estimated_completion: None,
        }
    }

    #[test]
    fn phase_labels_cover_known_phases() {
        assert_eq!(phase_label("discovery"), "Finding your photos");
        assert_eq!(phase_label("ocr"), "Reading text in photos");
        assert_eq!(phase_label("completed"), "Finishing up");
        assert_eq!(phase_label("complete"), "Finishing up");
    }

    #[test]
    fn unknown_phase_passes_through_and_empty_is_generic() {
        assert_eq!(phase_label("defragmenting"), "defragmenting");
        assert_eq!(phase_label(""), "Working…");
    }

    #[test]
    fn percent_avoids_dividing_by_zero() {
        assert_eq!(percent(0, 0), None);
        assert_eq!(percent(120, 500), Some(24));
        assert_eq!(percent(500, 500), Some(100));
        // a backend overshoot never reads as more than 100
        assert_eq!(percent(600, 500), Some(100));
    }

    #[test]
    fn eta_buckets_cover_all_five_ranges() {
        assert_eq!(eta_text(120, 140).as_deref(), Some("Less than a minute left"));
        assert_eq!(eta_text(120, 500).as_deref(), Some("A few minutes left"));
        assert_eq!(eta_text(30, 900).as_deref(), Some("Less than 15 minutes left"));
        assert_eq!(eta_text(30, 2000).as_deref(), Some("Less than an hour left"));
        assert_eq!(eta_text(30, 10000).as_deref(), Some("This may take a while"));
    }

    #[test]
    fn eta_needs_both_counters() {
        assert_eq!(eta_text(0, 500), None);
        assert_eq!(eta_text(120, 0), None);
    }

    #[test]
    fn discovery_then_scanning_scenario() {
        let mut state = IndexingMonitorState::idle();

        // first poll: nothing counted yet, display stays indeterminate
        apply_snapshot(&mut state, indexing_status("discovery", 0, 0));
        assert!(state.indeterminate);
        assert_eq!(state.percent, None);
        assert_eq!(state.phase_label, "Finding your photos");
        assert_eq!(state.eta, None);

        // second poll: totals known, percentage and ETA appear
        apply_snapshot(&mut state, indexing_status("scanning", 120, 500));
        assert!(!state.indeterminate);
        assert_eq!(state.percent, Some(24));
        assert_eq!(state.phase_label, "Scanning photos");
        assert_eq!(state.eta.as_deref(), Some("A few minutes left"));
        assert!(!state.finished);
    }

    #[test]
    fn reported_errors_supersede_progress() {
        let mut state = IndexingMonitorState::idle();
        let mut status = indexing_status("scanning", 10, 100);
        status.errors = vec!["cannot read /pics".to_string()];
        apply_snapshot(&mut state, status);
        assert_eq!(state.active_error.as_deref(), Some("cannot read /pics"));
    }

    #[test]
    fn background_continue_latches_after_five_seconds() {
        let mut state = IndexingMonitorState::idle();
        apply_snapshot(&mut state, indexing_status("scanning", 10, 100));

        for _ in 0..4 {
            tick_elapsed(&mut state);
        }
        assert!(!state.background_continue_available);
        tick_elapsed(&mut state);
        assert!(state.background_continue_available);
    }

    #[test]
    fn background_continue_stays_visible_after_errors() {
        let mut state = IndexingMonitorState::idle();
        apply_snapshot(&mut state, indexing_status("scanning", 10, 100));
        for _ in 0..5 {
            tick_elapsed(&mut state);
        }
        assert!(state.background_continue_available);

        let mut failed = indexing_status("scanning", 10, 100);
        failed.status = JobState::Error;
        failed.errors = vec!["indexer crashed".to_string()];
        apply_snapshot(&mut state, failed);
        assert!(state.background_continue_available);

        // the ticker no longer accumulates, but the latch holds
        assert!(!tick_elapsed(&mut state));
        assert!(state.background_continue_available);
    }

    #[test]
    fn elapsed_only_accumulates_while_indexing() {
        let mut state = IndexingMonitorState::idle();
        assert!(!tick_elapsed(&mut state));

        let mut done = indexing_status("completed", 100, 100);
        done.status = JobState::Completed;
        apply_snapshot(&mut state, done);
        assert!(!tick_elapsed(&mut state));
        assert_eq!(state.elapsed_secs, 0);
    }

    #[test]
    fn tips_rotate_through_the_list() {
        assert_eq!(tip_at(0), TIPS[0]);
        assert_eq!(tip_at(TIPS.len()), TIPS[0]);
        assert_ne!(tip_at(1), tip_at(0));
    }

    mod monitor_loop {
        use super::*;
        use mockito::Server;
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[tokio::test]
        async fn first_poll_applies_the_snapshot_and_notifies() {
            let mut server = Server::new_async().await;
            server
                .mock("GET", "/index/status")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(
                    r#"{"status":"indexing",
                        "progress":{"total_files":500,"processed_files":120,"current_phase":"scanning"},
                        "errors":[]}"#,
                )
                .create_async()
                .await;

            let api = LibraryApi::new(server.url()).unwrap();
            let state = Arc::new(Mutex::new(IndexingMonitorState::idle()));
            let updates = Arc::new(AtomicUsize::new(0));
            let updates_in_loop = updates.clone();
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            let task = tokio::spawn(run_monitor(
                api,
                state.clone(),
                move |_| {
                    updates_in_loop.fetch_add(1, Ordering::Relaxed);
                },
                shutdown_rx,
            ));

            tokio::time::sleep(Duration::from_millis(400)).await;
            shutdown_tx.send(true).unwrap();
            task.await.unwrap();

            let guard = state.lock().unwrap();
            assert_eq!(guard.percent, Some(24));
            assert_eq!(guard.phase_label, "Scanning photos");
            assert!(updates.load(Ordering::Relaxed) >= 1);
        }

        #[tokio::test]
        async fn failed_polls_do_not_halt_the_loop() {
            let mut server = Server::new_async().await;
            let mock = server
                .mock("GET", "/index/status")
                .with_status(500)
                .expect_at_least(2)
                .create_async()
                .await;

            let api = LibraryApi::new(server.url()).unwrap();
            let state = Arc::new(Mutex::new(IndexingMonitorState::idle()));
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            let task = tokio::spawn(run_monitor(api, state.clone(), |_| {}, shutdown_rx));

            // the loop polls every two seconds; wait out at least two failing ticks
            tokio::time::sleep(Duration::from_millis(2300)).await;
            assert!(!task.is_finished());
            shutdown_tx.send(true).unwrap();
            task.await.unwrap();

            // it kept polling despite the failures and never took a snapshot
            mock.assert_async().await;
            assert!(state.lock().unwrap().snapshot.is_none());
        }

        #[tokio::test]
        async fn shutdown_stops_the_loop_promptly() {
            let mut server = Server::new_async().await;
            server
                .mock("GET", "/index/status")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"status":"idle","progress":{},"errors":[]}"#)
                .create_async()
                .await;

            let api = LibraryApi::new(server.url()).unwrap();
            let state = Arc::new(Mutex::new(IndexingMonitorState::idle()));
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            let task = tokio::spawn(run_monitor(api, state, |_| {}, shutdown_rx));
            shutdown_tx.send(true).unwrap();

            tokio::time::timeout(Duration::from_secs(1), task)
                .await
                .expect("monitor should stop on shutdown")
                .unwrap();
        }
    }
}
