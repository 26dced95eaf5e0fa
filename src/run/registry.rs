use crate::run::artifacts::{TimeStamps, TIMESTAMPS_FILE};
use crate::run::{io_error, RunError};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousRun {
    pub name: String,
    pub timestamp: i64,
}

/// Partial or corrupt run directories are invisible, not errors. Ordering is
/// the caller's concern.
pub fn list_previous_runs(output_root: &Path) -> Result<Vec<PreviousRun>, RunError> {
    let entries = match fs::read_dir(output_root) {
        Ok(entries) => entries,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(io_error(output_root, source)),
    };

    let mut runs = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|value| value.to_str()) else {
            continue;
        };
        let Ok(raw) = fs::read_to_string(path.join(TIMESTAMPS_FILE)) else {
            continue;
        };
        let Ok(stamps) = serde_json::from_str::<TimeStamps>(&raw) else {
            continue;
        };
        let Some(first) = stamps.time_stamps.first() else {
            continue;
        };
        runs.push(PreviousRun {
            name: name.to_string(),
            timestamp: first.time,
        });
    }
    Ok(runs)
}
