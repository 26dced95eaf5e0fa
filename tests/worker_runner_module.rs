#![cfg(unix)]

use respcluster::config::{AdvancedOptions, AlgorithmSettings, FileSettings};
use respcluster::run::{RunState, RunStateStore};
use respcluster::worker::{WorkerConfig, WorkerError, WorkerLauncher};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

fn file_settings(root: &TempDir) -> FileSettings {
    FileSettings {
        path: root.path().join("responses.csv"),
        has_header: false,
        delimiter: ",".to_string(),
        selected_columns: vec![0],
    }
}

fn algorithm_settings() -> AlgorithmSettings {
    AlgorithmSettings {
        auto_cluster_count: false,
        max_clusters: None,
        cluster_count: Some(3),
        seed: Some(1),
        excluded_words: Vec::new(),
        advanced_options: AdvancedOptions {
            outlier_detection: false,
            nearest_neighbors: None,
            z_score_threshold: None,
            agglomerative_clustering: false,
            similarity_threshold: None,
            language_model: "BAAI/bge-large-en-v1.5".to_string(),
        },
    }
}

fn launcher_for(root: &TempDir, binary: PathBuf) -> (Arc<RunStateStore>, WorkerLauncher) {
    let store = Arc::new(RunStateStore::new());
    let config = WorkerConfig {
        python_binary: binary,
        script: root.path().join("main.py"),
        working_dir: root.path().to_path_buf(),
        output_dir: root.path().join("output"),
        log_dir: root.path().join("logs/worker"),
        log_level: None,
    };
    let launcher = WorkerLauncher::new(Arc::clone(&store), config, root.path().to_path_buf());
    (store, launcher)
}

#[test]
fn a_clean_exit_completes_the_run_with_folded_progress() {
    let root = tempfile::tempdir().expect("tempdir");
    let binary = write_script(
        root.path(),
        "worker.sh",
        concat!(
            "printf '%s\\n' '{\"type\":\"run_name\",\"name\":\"responses_1700000000\"}'\n",
            "printf '%s\\n' '{\"type\":\"progress\",\"step\":\"cluster\",\"status\":\"TODO\",\"timestamp\":\"2024-01-01T00:00:00Z\"}'\n",
            "printf '%s\\n' '{\"type\":\"progress\",\"step\":\"cluster\",\"status\":\"STARTED\",\"timestamp\":\"2024-01-01T00:00:01Z\"}'\n",
            "printf '%s\\n' '{\"type\":\"progress\",\"step\":\"cluster\",\"status\":\"DONE\",\"timestamp\":\"2024-01-01T00:00:02Z\"}'\n",
            "exit 0\n",
        ),
    );
    let (store, launcher) = launcher_for(&root, binary);

    let handle = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect("launch");
    handle.wait();

    let status = store.snapshot();
    assert_eq!(status.state, RunState::Completed);
    assert_eq!(status.name, "responses_1700000000");
    assert_eq!(status.progress.completed_tasks.len(), 1);
    assert_eq!(status.progress.completed_tasks[0].step, "cluster");
    assert!(status.progress.pending_tasks.is_empty());
    assert!(status.progress.current_task.is_none());
}

#[test]
fn a_nonzero_exit_marks_the_run_as_error() {
    let root = tempfile::tempdir().expect("tempdir");
    let binary = write_script(
        root.path(),
        "worker.sh",
        concat!(
            "printf '%s\\n' '{\"type\":\"progress\",\"step\":\"cluster\",\"status\":\"DONE\",\"timestamp\":\"2024-01-01T00:00:00Z\"}'\n",
            "exit 1\n",
        ),
    );
    let (store, launcher) = launcher_for(&root, binary);

    let handle = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect("launch");
    handle.wait();

    let status = store.snapshot();
    assert_eq!(status.state, RunState::Error);
    assert_eq!(status.progress.completed_tasks.len(), 1);
}

#[test]
fn the_exit_code_stays_authoritative_over_step_errors() {
    let root = tempfile::tempdir().expect("tempdir");
    let binary = write_script(
        root.path(),
        "worker.sh",
        concat!(
            "printf '%s\\n' '{\"type\":\"progress\",\"step\":\"detect_outliers\",\"status\":\"ERROR\",\"timestamp\":\"2024-01-01T00:00:00Z\"}'\n",
            "printf '%s\\n' '{\"type\":\"progress\",\"step\":\"cluster\",\"status\":\"DONE\",\"timestamp\":\"2024-01-01T00:00:01Z\"}'\n",
            "exit 0\n",
        ),
    );
    let (store, launcher) = launcher_for(&root, binary);

    let handle = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect("launch");
    handle.wait();

    let status = store.snapshot();
    assert_eq!(status.state, RunState::Completed);
    assert_eq!(status.progress.failed_tasks.len(), 1);
    assert_eq!(status.progress.failed_tasks[0].step, "detect_outliers");
}

#[test]
fn non_protocol_stdout_lines_are_ignored() {
    let root = tempfile::tempdir().expect("tempdir");
    let binary = write_script(
        root.path(),
        "worker.sh",
        concat!(
            "echo 'Downloading model weights...'\n",
            "printf '%s\\n' '{\"type\":\"progress\",\"step\":\"load_model\",\"status\":\"DONE\",\"timestamp\":\"2024-01-01T00:00:00Z\"}'\n",
            "exit 0\n",
        ),
    );
    let (store, launcher) = launcher_for(&root, binary);

    let handle = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect("launch");
    handle.wait();

    let status = store.snapshot();
    assert_eq!(status.state, RunState::Completed);
    assert_eq!(status.progress.completed_tasks.len(), 1);
    let host_log = fs::read_to_string(root.path().join("logs/host.log")).expect("host log");
    assert!(host_log.contains("worker protocol parse failure"));
}

#[test]
fn progress_is_observable_while_the_worker_runs() {
    let root = tempfile::tempdir().expect("tempdir");
    let binary = write_script(
        root.path(),
        "worker.sh",
        concat!(
            "printf '%s\\n' '{\"type\":\"progress\",\"step\":\"embed_responses\",\"status\":\"STARTED\",\"timestamp\":\"2024-01-01T00:00:00Z\"}'\n",
            "sleep 10\n",
        ),
    );
    let (store, launcher) = launcher_for(&root, binary);

    let handle = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect("launch");
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let status = store.snapshot();
        if let Some(current) = &status.progress.current_task {
            assert_eq!(current.step, "embed_responses");
            assert_eq!(status.state, RunState::Running);
            break;
        }
        assert!(Instant::now() < deadline, "no progress observed in time");
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(handle.is_running());
    handle.cancel();
    handle.wait();
    assert_eq!(store.snapshot().state, RunState::Error);
}

#[test]
fn cancel_kills_the_worker_and_clears_busy() {
    let root = tempfile::tempdir().expect("tempdir");
    let binary = write_script(root.path(), "worker.sh", "sleep 30\n");
    let (store, launcher) = launcher_for(&root, binary);

    let handle = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect("launch");
    handle.cancel();
    handle.wait();
    assert_eq!(store.snapshot().state, RunState::Error);
}

#[test]
fn stderr_is_captured_to_the_worker_log() {
    let root = tempfile::tempdir().expect("tempdir");
    let binary = write_script(
        root.path(),
        "worker.sh",
        "echo 'Traceback (most recent call last):' >&2\nexit 0\n",
    );
    let (_, launcher) = launcher_for(&root, binary);

    let handle = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect("launch");
    handle.wait();

    let log = fs::read_to_string(root.path().join("logs/worker/worker.stderr.log"))
        .expect("stderr log");
    assert!(log.contains("Traceback"));
}

#[test]
fn a_missing_binary_fails_fast_and_marks_the_run() {
    let root = tempfile::tempdir().expect("tempdir");
    let (store, launcher) = launcher_for(&root, root.path().join("no-such-python"));

    let err = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect_err("must fail");
    assert!(matches!(err, WorkerError::MissingBinary { .. }));
    assert_eq!(store.snapshot().state, RunState::Error);
}

#[test]
fn invalid_settings_never_spawn_a_worker() {
    let root = tempfile::tempdir().expect("tempdir");
    let binary = write_script(root.path(), "worker.sh", "exit 0\n");
    let (store, launcher) = launcher_for(&root, binary);

    let mut settings = algorithm_settings();
    settings.cluster_count = None;
    let err = launcher
        .launch(&file_settings(&root), &settings)
        .expect_err("must fail");
    assert!(matches!(err, WorkerError::InvalidSettings(_)));
    assert_eq!(store.snapshot().state, RunState::NotStarted);
}

#[test]
fn launching_again_resets_the_previous_run() {
    let root = tempfile::tempdir().expect("tempdir");
    let binary = write_script(
        root.path(),
        "worker.sh",
        concat!(
            "printf '%s\\n' '{\"type\":\"progress\",\"step\":\"cluster\",\"status\":\"DONE\",\"timestamp\":\"2024-01-01T00:00:00Z\"}'\n",
            "exit 0\n",
        ),
    );
    let (store, launcher) = launcher_for(&root, binary);

    let first = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect("first launch");
    first.wait();
    assert_eq!(store.snapshot().progress.completed_tasks.len(), 1);

    let second = launcher
        .launch(&file_settings(&root), &algorithm_settings())
        .expect("second launch");
    second.wait();
    let status = store.snapshot();
    assert_eq!(status.state, RunState::Completed);
    assert_eq!(status.progress.completed_tasks.len(), 1);
}
