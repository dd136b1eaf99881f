//! Retrieval configuration (`.faqbot/faq.yaml`).

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::embeddings::EmbeddingConfig;
use faqbot_core::config::STATE_DIR;
use faqbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant answering FAQs about contractor services.";

/// Tunables of the answering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaqConfig {
    /// Minimum cosine similarity for the best match. Values `<= 0.0` disable
    /// the cutoff, so the best match is always used.
    #[serde(default)]
    pub match_threshold: f32,

    /// Number of candidates fetched from the index per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Maximum number of augmented answers kept in memory
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// JSON or YAML corpus file; relative paths resolve against the workspace.
    /// The built-in corpus is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_path: Option<PathBuf>,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_top_k() -> usize {
    3
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_temperature() -> f32 {
    0.3
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.0,
            top_k: default_top_k(),
            cache_capacity: default_cache_capacity(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_tokens: None,
            corpus_path: None,
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl FaqConfig {
    pub fn validate(&self) -> AppResult<()> {
        if !(-1.0..=1.0).contains(&self.match_threshold) {
            return Err(AppError::Config(format!(
                "match_threshold must be between -1.0 and 1.0, got {}",
                self.match_threshold
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if self.cache_capacity == 0 {
            return Err(AppError::Config(
                "cache_capacity must be at least 1".to_string(),
            ));
        }

        self.embedding.validate()
    }

    /// Whether a best-match score passes the configured cutoff.
    pub fn accepts(&self, score: f32) -> bool {
        self.match_threshold <= 0.0 || score >= self.match_threshold
    }

    /// Corpus file path resolved against `workspace`.
    pub fn resolve_corpus_path(&self, workspace: &Path) -> Option<PathBuf> {
        self.corpus_path.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                workspace.join(path)
            }
        })
    }
}

/// Load `faq.yaml` from the workspace, or defaults when it does not exist.
pub fn load_config(workspace: &Path) -> AppResult<FaqConfig> {
    let config_path = get_config_path(workspace);

    if !config_path.exists() {
        tracing::debug!("No FAQ config at {:?}, using defaults", config_path);
        return Ok(FaqConfig::default());
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Config(format!("Failed to read FAQ config at {:?}: {}", config_path, e))
    })?;

    let config: FaqConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Config(format!("Failed to parse FAQ config at {:?}: {}", config_path, e))
    })?;

    config.validate()?;

    tracing::debug!("Loaded FAQ config from {:?}", config_path);
    Ok(config)
}

pub fn save_config(workspace: &Path, config: &FaqConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml = serde_yaml::to_string(config)?;
    fs::write(&config_path, yaml)?;

    tracing::debug!("Saved FAQ config to {:?}", config_path);
    Ok(())
}

pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(STATE_DIR).join("faq.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path()).unwrap();

        assert_eq!(config, FaqConfig::default());
        assert_eq!(config.top_k, 3);
        assert_eq!(config.cache_capacity, 256);
        assert_eq!(config.match_threshold, 0.0);
        assert_eq!(config.embedding.provider, "trigram");
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let config = FaqConfig {
            match_threshold: 0.35,
            cache_capacity: 16,
            corpus_path: Some(PathBuf::from("faqs.yaml")),
            ..Default::default()
        };

        save_config(temp.path(), &config).unwrap();
        assert!(temp.path().join(".faqbot/faq.yaml").exists());

        let loaded = load_config(temp.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.resolve_corpus_path(temp.path()),
            Some(temp.path().join("faqs.yaml"))
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".faqbot");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("faq.yaml"),
            "match_threshold: 0.5\nembedding:\n  provider: ollama\n  model: nomic-embed-text\n  dimensions: 768\n",
        )
        .unwrap();

        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.match_threshold, 0.5);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.embedding.dimensions, 768);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".faqbot");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("faq.yaml"), "top_k: 0\n").unwrap();

        assert!(matches!(load_config(temp.path()), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_ranges() {
        for threshold in [1.5, -2.0] {
            let config = FaqConfig {
                match_threshold: threshold,
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        let config = FaqConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_semantics() {
        let disabled = FaqConfig::default();
        assert!(disabled.accepts(-0.9));

        let enabled = FaqConfig {
            match_threshold: 0.4,
            ..Default::default()
        };
        assert!(enabled.accepts(0.4));
        assert!(!enabled.accepts(0.39));
    }
}
