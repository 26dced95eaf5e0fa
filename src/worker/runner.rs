use crate::config::{AlgorithmSettings, FileSettings};
use crate::run::store::RunStateStore;
use crate::shared::logging::append_host_log_line;
use crate::worker::invocation::{build_invocation, resolve_seed};
use crate::worker::protocol::decode_line;
use crate::worker::{io_error, WorkerConfig, WorkerError};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct WorkerLauncher {
    store: Arc<RunStateStore>,
    config: WorkerConfig,
    data_root: PathBuf,
}

#[derive(Debug)]
pub struct WorkerHandle {
    busy: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    monitor: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn is_running(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn wait(mut self) {
        if let Some(monitor) = self.monitor.take() {
            let _ = monitor.join();
        }
    }
}

impl WorkerLauncher {
    pub fn new(store: Arc<RunStateStore>, config: WorkerConfig, data_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            config,
            data_root: data_root.into(),
        }
    }

    pub fn launch(
        &self,
        file_settings: &FileSettings,
        algorithm_settings: &AlgorithmSettings,
    ) -> Result<WorkerHandle, WorkerError> {
        let seed = resolve_seed(algorithm_settings.seed);
        let invocation = build_invocation(file_settings, algorithm_settings, &self.config, seed)?;

        self.store.reset();

        let mut command = Command::new(&invocation.binary);
        command
            .current_dir(&self.config.working_dir)
            .args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.store.finalize(false);
                return Err(WorkerError::MissingBinary {
                    binary: invocation.binary.display().to_string(),
                });
            }
            Err(err) => {
                self.store.finalize(false);
                return Err(io_error(&invocation.binary, err));
            }
        };

        let stdout = child.stdout.take().ok_or_else(|| {
            io_error(
                &invocation.binary,
                std::io::Error::other("missing stdout pipe"),
            )
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            io_error(
                &invocation.binary,
                std::io::Error::other("missing stderr pipe"),
            )
        })?;

        let store = Arc::clone(&self.store);
        let data_root = self.data_root.clone();
        let stdout_reader = thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match decode_line(trimmed) {
                    Ok(message) => store.apply(&message),
                    Err(err) => {
                        let _ = append_host_log_line(
                            &data_root,
                            &format!("worker protocol parse failure: {err}: {trimmed}"),
                        );
                    }
                }
            }
        });

        let stderr_log = self.config.log_dir.join("worker.stderr.log");
        let stderr_reader = thread::spawn(move || {
            if let Some(parent) = stderr_log.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let mut sink = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&stderr_log)
                .ok();
            for line in BufReader::new(stderr).lines() {
                let Ok(line) = line else { break };
                if let Some(file) = sink.as_mut() {
                    let _ = writeln!(file, "{line}");
                }
            }
        });

        let busy = Arc::new(AtomicBool::new(true));
        let stop = Arc::new(AtomicBool::new(false));
        let store = Arc::clone(&self.store);
        let monitor_busy = Arc::clone(&busy);
        let monitor_stop = Arc::clone(&stop);
        let monitor = thread::spawn(move || {
            let status = loop {
                match child.try_wait() {
                    Ok(Some(status)) => break Some(status),
                    Ok(None) => {
                        if monitor_stop.load(Ordering::Relaxed) {
                            let _ = child.kill();
                            break child.wait().ok();
                        }
                        thread::sleep(EXIT_POLL_INTERVAL);
                    }
                    Err(_) => break None,
                }
            };
            let _ = stdout_reader.join();
            let _ = stderr_reader.join();
            store.finalize(status.map(|status| status.success()).unwrap_or(false));
            // busy is cleared unconditionally, whatever the exit code was
            monitor_busy.store(false, Ordering::Relaxed);
        });

        Ok(WorkerHandle {
            busy,
            stop,
            monitor: Some(monitor),
        })
    }
}
