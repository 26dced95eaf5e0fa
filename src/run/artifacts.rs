use crate::config::{AlgorithmSettings, FileSettings};
use crate::run::{io_error, json_error, RunError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const ARGS_FILE: &str = "args.json";
pub const CLUSTER_ASSIGNMENTS_FILE: &str = "cluster_assignments.csv";
pub const PAIRWISE_SIMILARITIES_FILE: &str = "pairwise_similarities.json";
pub const OUTLIERS_FILE: &str = "outliers.json";
pub const MERGED_CLUSTERS_FILE: &str = "merged_clusters.json";
pub const TIMESTAMPS_FILE: &str = "timestamps.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsSnapshot {
    pub file_settings: FileSettings,
    pub algorithm_settings: AlgorithmSettings,
    #[serde(default)]
    pub results_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    pub response: String,
    pub cluster_index: u32,
    pub similarity_to_center: f64,
}

/// cluster id -> other cluster id -> cosine similarity; the diagonal is
/// omitted by the worker.
pub type PairwiseSimilarities = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlier {
    pub response: String,
    pub similarity: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterExemplar {
    pub response: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCluster {
    pub index: u32,
    #[serde(default)]
    pub responses: Vec<ClusterExemplar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityPair {
    #[serde(alias = "cluster_pair")]
    pub cluster_pair: [u32; 2],
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merger {
    #[serde(alias = "merged_clusters")]
    pub merged_clusters: Vec<MergedCluster>,
    #[serde(alias = "similarity_pairs", default)]
    pub similarity_pairs: Vec<SimilarityPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mergers {
    pub mergers: Vec<Merger>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeStamp {
    pub name: String,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeStamps {
    #[serde(rename = "timeStamps", alias = "time_stamps")]
    pub time_stamps: Vec<TimeStamp>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, RunError> {
    let raw = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    serde_json::from_str(&raw).map_err(|source| json_error(path, source))
}

pub fn read_args(run_dir: &Path) -> Result<ArgsSnapshot, RunError> {
    read_json(&run_dir.join(ARGS_FILE))
}

pub fn read_pairwise_similarities(run_dir: &Path) -> Result<PairwiseSimilarities, RunError> {
    read_json(&run_dir.join(PAIRWISE_SIMILARITIES_FILE))
}

pub fn read_outliers(run_dir: &Path) -> Result<Vec<Outlier>, RunError> {
    read_json(&run_dir.join(OUTLIERS_FILE))
}

pub fn read_merged_clusters(run_dir: &Path) -> Result<Mergers, RunError> {
    read_json(&run_dir.join(MERGED_CLUSTERS_FILE))
}

pub fn read_timestamps(run_dir: &Path) -> Result<TimeStamps, RunError> {
    read_json(&run_dir.join(TIMESTAMPS_FILE))
}

pub fn read_cluster_assignments(
    run_dir: &Path,
    delimiter: char,
) -> Result<Vec<ClusterAssignment>, RunError> {
    let path = run_dir.join(CLUSTER_ASSIGNMENTS_FILE);
    let raw = fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
    let records = parse_delimited(&raw, delimiter);

    let mut assignments = Vec::new();
    // first record is the header row
    for (line, fields) in records.iter().enumerate().skip(1) {
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        if fields.len() != 3 {
            return Err(RunError::Csv {
                path: path.display().to_string(),
                line: line + 1,
                reason: format!("expected 3 fields, got {}", fields.len()),
            });
        }
        let cluster_index = fields[1].parse().map_err(|_| RunError::Csv {
            path: path.display().to_string(),
            line: line + 1,
            reason: format!("invalid cluster index `{}`", fields[1]),
        })?;
        let similarity_to_center = fields[2].parse().map_err(|_| RunError::Csv {
            path: path.display().to_string(),
            line: line + 1,
            reason: format!("invalid similarity `{}`", fields[2]),
        })?;
        assignments.push(ClusterAssignment {
            response: fields[0].clone(),
            cluster_index,
            similarity_to_center,
        });
    }
    Ok(assignments)
}

/// Minimal reader for the worker's `csv.writer` output: double-quote quoting,
/// doubled quotes as escapes, newlines allowed inside quoted fields.
pub fn parse_delimited(raw: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == delimiter {
            record.push(std::mem::take(&mut field));
        } else if ch == '\n' {
            if field.ends_with('\r') {
                field.pop();
            }
            record.push(std::mem::take(&mut field));
            records.push(std::mem::take(&mut record));
        } else {
            field.push(ch);
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
