use crate::config::DataPaths;
use crate::run::artifacts::{
    self, ArgsSnapshot, ClusterAssignment, Mergers, Outlier, PairwiseSimilarities, TimeStamps,
};
use crate::run::registry::{list_previous_runs, PreviousRun};
use crate::run::store::RunStateStore;
use crate::run::{io_error, json_error, RunError, RunStatus};
use crate::shared::logging::append_host_log_line;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Boundary handed to the presentation layer: polling, rename, historical
/// runs, and result-artifact reads. Never mutates artifacts on disk besides
/// the run-directory rename.
#[derive(Debug, Clone)]
pub struct QueryFacade {
    store: Arc<RunStateStore>,
    paths: DataPaths,
}

impl QueryFacade {
    pub fn new(store: Arc<RunStateStore>, paths: DataPaths) -> Self {
        Self { store, paths }
    }

    fn log(&self, message: &str) {
        let _ = append_host_log_line(&self.paths.root, message);
    }

    pub fn poll_run_status(&self) -> RunStatus {
        self.store.snapshot()
    }

    pub fn run_name(&self) -> String {
        let name = self.store.name();
        if name.is_empty() {
            self.log("run name requested but no run is active");
        }
        name
    }

    pub fn set_run_name(&self, new_name: &str) -> Result<(), RunError> {
        let current = self.store.name();
        if current.is_empty() {
            self.log("rename requested but no run is active");
            return Err(RunError::NoActiveRun);
        }
        let output_root = self.paths.output_root();
        let from = output_root.join(&current);
        let to = output_root.join(new_name);
        if !from.is_dir() {
            self.log(&format!("rename failed: run directory `{current}` missing"));
            return Err(RunError::UnknownRun {
                name: current,
                root: output_root.display().to_string(),
            });
        }
        if to.exists() {
            self.log(&format!("rename failed: `{new_name}` already exists"));
            return Err(RunError::Rename {
                from: current,
                to: new_name.to_string(),
                reason: "destination already exists".to_string(),
            });
        }
        if let Err(source) = fs::rename(&from, &to) {
            self.log(&format!("rename failed: {source}"));
            return Err(RunError::Rename {
                from: current,
                to: new_name.to_string(),
                reason: source.to_string(),
            });
        }
        self.store.set_name(new_name);
        Ok(())
    }

    pub fn results_dir(&self) -> Result<PathBuf, RunError> {
        let name = self.store.name();
        if name.is_empty() {
            return Err(RunError::NoActiveRun);
        }
        Ok(self.paths.output_root().join(name))
    }

    pub fn read_file(&self, path: &Path) -> Result<String, RunError> {
        fs::read_to_string(path).map_err(|source| io_error(path, source))
    }

    pub fn read_json_file(&self, path: &Path) -> Result<serde_json::Value, RunError> {
        let raw = self.read_file(path)?;
        serde_json::from_str(&raw).map_err(|source| json_error(path, source))
    }

    pub fn reset_cluster_progress(&self) {
        self.store.reset();
    }

    pub fn load_run(&self, name: &str) -> Result<(), RunError> {
        let run_dir = self.paths.output_root().join(name);
        if !run_dir.is_dir() {
            return Err(RunError::UnknownRun {
                name: name.to_string(),
                root: self.paths.output_root().display().to_string(),
            });
        }
        self.store.load_completed(name);
        Ok(())
    }

    pub fn previous_runs(&self) -> Result<Vec<PreviousRun>, RunError> {
        list_previous_runs(&self.paths.output_root())
    }

    pub fn args_snapshot(&self) -> Result<ArgsSnapshot, RunError> {
        artifacts::read_args(&self.results_dir()?)
    }

    pub fn cluster_assignments(&self) -> Result<Vec<ClusterAssignment>, RunError> {
        let run_dir = self.results_dir()?;
        let args = artifacts::read_args(&run_dir)?;
        let delimiter = args.file_settings.delimiter.chars().next().unwrap_or(',');
        artifacts::read_cluster_assignments(&run_dir, delimiter)
    }

    pub fn pairwise_similarities(&self) -> Result<PairwiseSimilarities, RunError> {
        artifacts::read_pairwise_similarities(&self.results_dir()?)
    }

    pub fn outliers(&self) -> Result<Vec<Outlier>, RunError> {
        artifacts::read_outliers(&self.results_dir()?)
    }

    pub fn merged_clusters(&self) -> Result<Mergers, RunError> {
        artifacts::read_merged_clusters(&self.results_dir()?)
    }

    pub fn timestamps(&self) -> Result<TimeStamps, RunError> {
        artifacts::read_timestamps(&self.results_dir()?)
    }
}
