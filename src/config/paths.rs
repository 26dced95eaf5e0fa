use super::ConfigError;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn required_directories(&self) -> Vec<PathBuf> {
        vec![
            self.root.join("output"),
            self.root.join("logs"),
            self.root.join("logs/worker"),
        ]
    }

    pub fn output_root(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn worker_log_dir(&self) -> PathBuf {
        self.root.join("logs/worker")
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    pub fn host_log_path(&self) -> PathBuf {
        self.root.join("logs/host.log")
    }
}

pub const DEFAULT_DATA_ROOT_DIR: &str = ".respcluster";

pub fn default_data_root_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(DEFAULT_DATA_ROOT_DIR))
}

pub fn bootstrap_data_root(paths: &DataPaths) -> Result<(), ConfigError> {
    for path in paths.required_directories() {
        fs::create_dir_all(&path).map_err(|source| ConfigError::CreateDir {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}
