use crate::config::{AlgorithmSettings, FileSettings};
use crate::worker::{WorkerConfig, WorkerError};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerInvocation {
    pub binary: PathBuf,
    pub args: Vec<String>,
}

pub fn resolve_seed(requested: Option<u64>) -> u64 {
    if let Some(seed) = requested {
        return seed;
    }
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_ok() {
        u64::from_le_bytes(buf) % 1000
    } else {
        (chrono::Utc::now().timestamp_millis() as u64) % 1000
    }
}

pub fn build_invocation(
    file_settings: &FileSettings,
    algorithm_settings: &AlgorithmSettings,
    config: &WorkerConfig,
    seed: u64,
) -> Result<WorkerInvocation, WorkerError> {
    file_settings.validate()?;
    algorithm_settings.validate()?;

    let mut args = vec![
        "-u".to_string(),
        config.script.display().to_string(),
        file_settings.path.display().to_string(),
        "--delimiter".to_string(),
        file_settings.delimiter.clone(),
        "--language_model".to_string(),
        algorithm_settings.advanced_options.language_model.clone(),
        "--output_dir".to_string(),
        config.output_dir.display().to_string(),
        "--log_dir".to_string(),
        config.log_dir.display().to_string(),
    ];
    if let Some(level) = &config.log_level {
        args.push("--log_level".to_string());
        args.push(level.clone());
    }
    if file_settings.has_header {
        args.push("--has_headers".to_string());
    }
    if algorithm_settings.auto_cluster_count {
        args.push("--automatic_k".to_string());
        if let Some(max_clusters) = algorithm_settings.max_clusters {
            args.push("--max_num_clusters".to_string());
            args.push(max_clusters.to_string());
        }
    } else if let Some(cluster_count) = algorithm_settings.cluster_count {
        args.push("--cluster_count".to_string());
        args.push(cluster_count.to_string());
    }
    args.push("--seed".to_string());
    args.push(seed.to_string());
    if let Some(excluded) = algorithm_settings.excluded_words_argument() {
        args.push("--excluded_words".to_string());
        args.push(excluded);
    }
    let advanced = &algorithm_settings.advanced_options;
    if advanced.outlier_detection {
        if let Some((neighbors, z_score)) = advanced.outlier_pair() {
            args.push("--nearest_neighbors".to_string());
            args.push(neighbors.to_string());
            args.push("--z_score_threshold".to_string());
            args.push(z_score.to_string());
        }
    }
    if advanced.agglomerative_clustering {
        if let Some(threshold) = advanced.similarity_threshold {
            args.push("--merge_threshold".to_string());
            args.push(threshold.to_string());
        }
    }
    // trailing because the worker parses it as a variadic argument
    args.push("--selected_columns".to_string());
    for column in &file_settings.selected_columns {
        args.push(column.to_string());
    }

    Ok(WorkerInvocation {
        binary: config.python_binary.clone(),
        args,
    })
}
