use crate::worker::protocol::{parse_timestamp_millis, StepPhase, WorkerMessage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Error,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Error)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::NotStarted => write!(f, "NOT_STARTED"),
            RunState::Running => write!(f, "RUNNING"),
            RunState::Completed => write!(f, "COMPLETED"),
            RunState::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTask {
    pub step: String,
    pub started_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub step: String,
    pub completed_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedTask {
    pub step: String,
    pub failed_at_ms: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProgress {
    #[serde(default)]
    pub pending_tasks: Vec<String>,
    #[serde(default)]
    pub current_task: Option<CurrentTask>,
    #[serde(default)]
    pub completed_tasks: Vec<CompletedTask>,
    #[serde(default)]
    pub failed_tasks: Vec<FailedTask>,
}

impl RunProgress {
    pub fn tracks(&self, step: &str) -> bool {
        self.pending_tasks.iter().any(|pending| pending == step)
            || self
                .current_task
                .as_ref()
                .is_some_and(|current| current.step == step)
            || self
                .completed_tasks
                .iter()
                .any(|completed| completed.step == step)
            || self.failed_tasks.iter().any(|failed| failed.step == step)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    pub state: RunState,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub progress: RunProgress,
}

pub fn apply_message(status: &mut RunStatus, message: &WorkerMessage) {
    match message {
        WorkerMessage::RunName { name } => {
            status.name = name.clone();
        }
        WorkerMessage::Progress {
            step,
            status: phase,
            timestamp,
        } => {
            if !status.state.is_terminal() {
                status.state = RunState::Running;
            }
            let at_ms = parse_timestamp_millis(timestamp)
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
            let progress = &mut status.progress;
            match phase {
                StepPhase::Todo => {
                    if !progress.tracks(step) {
                        progress.pending_tasks.push(step.clone());
                    }
                }
                StepPhase::Started => {
                    progress.pending_tasks.retain(|pending| pending != step);
                    progress.current_task = Some(CurrentTask {
                        step: step.clone(),
                        started_at_ms: at_ms,
                    });
                }
                StepPhase::Done => {
                    progress.pending_tasks.retain(|pending| pending != step);
                    if progress
                        .current_task
                        .as_ref()
                        .is_some_and(|current| current.step == *step)
                    {
                        progress.current_task = None;
                    }
                    progress
                        .completed_tasks
                        .retain(|completed| completed.step != *step);
                    progress.completed_tasks.push(CompletedTask {
                        step: step.clone(),
                        completed_at_ms: at_ms,
                    });
                }
                StepPhase::Error => {
                    progress.pending_tasks.retain(|pending| pending != step);
                    if progress
                        .current_task
                        .as_ref()
                        .is_some_and(|current| current.step == *step)
                    {
                        progress.current_task = None;
                    }
                    progress.failed_tasks.retain(|failed| failed.step != *step);
                    progress.failed_tasks.push(FailedTask {
                        step: step.clone(),
                        failed_at_ms: at_ms,
                    });
                }
            }
        }
    }
}
