use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSettings {
    pub path: PathBuf,
    pub has_header: bool,
    pub delimiter: String,
    #[serde(default)]
    pub selected_columns: Vec<usize>,
}

impl FileSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Settings(
                "input file path must be non-empty".to_string(),
            ));
        }
        if self.delimiter.chars().count() != 1 {
            return Err(ConfigError::Settings(format!(
                "delimiter must be a single character, got `{}`",
                self.delimiter
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedOptions {
    pub outlier_detection: bool,
    #[serde(default)]
    pub nearest_neighbors: Option<u32>,
    #[serde(default)]
    pub z_score_threshold: Option<f64>,
    pub agglomerative_clustering: bool,
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    pub language_model: String,
}

impl AdvancedOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language_model.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`languageModel` must be non-empty".to_string(),
            ));
        }
        if self.outlier_detection {
            let neighbors = self.nearest_neighbors.ok_or_else(|| {
                ConfigError::Settings(
                    "`nearestNeighbors` is required when outlier detection is enabled".to_string(),
                )
            })?;
            if neighbors == 0 {
                return Err(ConfigError::Settings(
                    "`nearestNeighbors` must be > 0".to_string(),
                ));
            }
            if self.z_score_threshold.is_none() {
                return Err(ConfigError::Settings(
                    "`zScoreThreshold` is required when outlier detection is enabled".to_string(),
                ));
            }
        }
        if self.agglomerative_clustering {
            let threshold = self.similarity_threshold.ok_or_else(|| {
                ConfigError::Settings(
                    "`similarityThreshold` is required when agglomerative clustering is enabled"
                        .to_string(),
                )
            })?;
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::Settings(format!(
                    "`similarityThreshold` must be within [0, 1], got {threshold}"
                )));
            }
        }
        Ok(())
    }

    pub fn outlier_pair(&self) -> Option<(u32, f64)> {
        match (self.nearest_neighbors, self.z_score_threshold) {
            (Some(neighbors), Some(threshold)) => Some((neighbors, threshold)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmSettings {
    pub auto_cluster_count: bool,
    #[serde(default)]
    pub max_clusters: Option<u32>,
    #[serde(default)]
    pub cluster_count: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub excluded_words: Vec<String>,
    pub advanced_options: AdvancedOptions,
}

impl AlgorithmSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auto_cluster_count {
            if let Some(max_clusters) = self.max_clusters {
                if max_clusters == 0 {
                    return Err(ConfigError::Settings(
                        "`maxClusters` must be > 0".to_string(),
                    ));
                }
            }
        } else {
            let cluster_count = self.cluster_count.ok_or_else(|| {
                ConfigError::Settings(
                    "`clusterCount` is required when `autoClusterCount` is false".to_string(),
                )
            })?;
            if cluster_count == 0 {
                return Err(ConfigError::Settings(
                    "`clusterCount` must be > 0".to_string(),
                ));
            }
        }
        self.advanced_options.validate()
    }

    pub fn excluded_words_argument(&self) -> Option<String> {
        let words: Vec<&str> = self
            .excluded_words
            .iter()
            .map(|word| word.trim())
            .filter(|word| !word.is_empty())
            .collect();
        if words.is_empty() {
            None
        } else {
            Some(words.join(","))
        }
    }
}
