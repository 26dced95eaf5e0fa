use std::path::Path;

pub mod artifacts;
pub mod facade;
pub mod registry;
pub mod status;
pub mod store;

pub use artifacts::{
    ArgsSnapshot, ClusterAssignment, Merger, Mergers, Outlier, PairwiseSimilarities, TimeStamp,
    TimeStamps,
};
pub use facade::QueryFacade;
pub use registry::{list_previous_runs, PreviousRun};
pub use status::{
    apply_message, CompletedTask, CurrentTask, FailedTask, RunProgress, RunState, RunStatus,
};
pub use store::RunStateStore;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("no active run")]
    NoActiveRun,
    #[error("run `{name}` was not found under {root}")]
    UnknownRun { name: String, root: String },
    #[error("failed to rename run directory {from} -> {to}: {reason}")]
    Rename {
        from: String,
        to: String,
        reason: String,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid csv at {path} line {line}: {reason}")]
    Csv {
        path: String,
        line: usize,
        reason: String,
    },
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> RunError {
    RunError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub(crate) fn json_error(path: &Path, source: serde_json::Error) -> RunError {
    RunError::Json {
        path: path.display().to_string(),
        source,
    }
}
