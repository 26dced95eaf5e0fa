use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepPhase {
    Todo,
    Started,
    Done,
    Error,
}

impl std::fmt::Display for StepPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepPhase::Todo => write!(f, "TODO"),
            StepPhase::Started => write!(f, "STARTED"),
            StepPhase::Done => write!(f, "DONE"),
            StepPhase::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage {
    Progress {
        step: String,
        status: StepPhase,
        timestamp: String,
    },
    RunName {
        name: String,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("invalid worker message: {source}")]
pub struct ProtocolError {
    #[from]
    source: serde_json::Error,
}

pub fn decode_line(line: &str) -> Result<WorkerMessage, ProtocolError> {
    Ok(serde_json::from_str(line.trim())?)
}

// The worker prints `datetime.now().isoformat()`, which carries no offset.
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp_millis());
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}
