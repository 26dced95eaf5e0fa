use crate::run::status::{apply_message, RunState, RunStatus};
use crate::worker::protocol::WorkerMessage;
use std::sync::{Mutex, MutexGuard};

/// Single point of truth for the run being tracked. One active run at a time;
/// the launcher owns the only path that starts a worker against this store.
#[derive(Debug, Default)]
pub struct RunStateStore {
    inner: Mutex<RunStatus>,
}

impl RunStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RunStatus> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> RunStatus {
        self.lock().clone()
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn set_name(&self, name: &str) {
        self.lock().name = name.to_string();
    }

    pub fn reset(&self) {
        *self.lock() = RunStatus::default();
    }

    pub fn load_completed(&self, name: &str) {
        let mut status = self.lock();
        *status = RunStatus::default();
        status.state = RunState::Completed;
        status.name = name.to_string();
    }

    pub fn apply(&self, message: &WorkerMessage) {
        apply_message(&mut self.lock(), message);
    }

    pub fn finalize(&self, success: bool) {
        self.lock().state = if success {
            RunState::Completed
        } else {
            RunState::Error
        };
    }
}
