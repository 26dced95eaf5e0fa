use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn host_log_path(data_root: &Path) -> PathBuf {
    data_root.join("logs/host.log")
}

pub fn append_host_log_line(data_root: &Path, line: &str) -> std::io::Result<()> {
    let path = host_log_path(data_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    let now = chrono::Utc::now().timestamp_millis();
    writeln!(file, "ts={now} {line}")
}
