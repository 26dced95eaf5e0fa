pub mod paths;
pub mod preferences;
pub mod settings;

pub use paths::{bootstrap_data_root, default_data_root_path, DataPaths, DEFAULT_DATA_ROOT_DIR};
pub use preferences::AppPreferences;
pub use settings::{AdvancedOptions, AlgorithmSettings, FileSettings};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("settings validation failed: {0}")]
    Settings(String),
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to resolve home directory for data root")]
    HomeDirectoryUnavailable,
}
