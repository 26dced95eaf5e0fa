use std::path::{Path, PathBuf};

pub mod invocation;
pub mod protocol;
pub mod runner;

pub use invocation::{build_invocation, resolve_seed, WorkerInvocation};
pub use protocol::{decode_line, parse_timestamp_millis, ProtocolError, StepPhase, WorkerMessage};
pub use runner::{WorkerHandle, WorkerLauncher};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("worker binary missing: {binary}")]
    MissingBinary { binary: String },
    #[error("invalid run settings: {0}")]
    InvalidSettings(String),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<crate::config::ConfigError> for WorkerError {
    fn from(value: crate::config::ConfigError) -> Self {
        Self::InvalidSettings(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub python_binary: PathBuf,
    pub script: PathBuf,
    pub working_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: Option<String>,
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> WorkerError {
    WorkerError::Io {
        path: path.display().to_string(),
        source,
    }
}
