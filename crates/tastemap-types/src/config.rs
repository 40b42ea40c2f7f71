//! Configuration loading for tastemap.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/tastemap/config.toml`
//! (platform equivalent via `directories`).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::TypesError;

/// Which embedding resource the provider acquires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Local BERT model via Candle (default)
    #[default]
    Candle,
    /// Never acquire a model; every text uses the deterministic fallback
    Fallback,
}

/// Embedding provider and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// HuggingFace repository of the sentence-embedding model
    #[serde(default = "default_model_repo")]
    pub model_repo: String,

    /// Directory holding downloaded model files
    #[serde(default = "default_model_cache_dir")]
    pub model_cache_dir: String,

    /// Fixed embedding dimension. Fallback vectors use the same value.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Interval of the waiter budget while another caller acquires the model
    #[serde(default = "default_init_poll_interval_ms")]
    pub init_poll_interval_ms: u64,

    /// Number of intervals a waiter tolerates before giving up
    #[serde(default = "default_init_max_attempts")]
    pub init_max_attempts: u32,

    /// Maximum cached embeddings (0 = unbounded)
    #[serde(default)]
    pub cache_max_entries: usize,
}

fn default_model_repo() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_model_cache_dir() -> String {
    ProjectDirs::from("", "", "tastemap")
        .map(|p| p.cache_dir().join("models"))
        .unwrap_or_else(|| PathBuf::from(".cache/tastemap/models"))
        .to_string_lossy()
        .to_string()
}

fn default_dimension() -> usize {
    384
}

fn default_init_poll_interval_ms() -> u64 {
    100
}

fn default_init_max_attempts() -> u32 {
    50
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model_repo: default_model_repo(),
            model_cache_dir: default_model_cache_dir(),
            dimension: default_dimension(),
            init_poll_interval_ms: default_init_poll_interval_ms(),
            init_max_attempts: default_init_max_attempts(),
            cache_max_entries: 0,
        }
    }
}

impl EmbeddingSettings {
    /// Total time a waiter attaches to an in-flight acquisition.
    pub fn init_wait_budget(&self) -> Duration {
        Duration::from_millis(self.init_poll_interval_ms) * self.init_max_attempts
    }

    /// Model cache directory with ~ expanded.
    pub fn model_cache_path(&self) -> PathBuf {
        expand_home(&self.model_cache_dir)
    }

    /// Cache bound, `None` when unbounded.
    pub fn cache_bound(&self) -> Option<usize> {
        (self.cache_max_entries > 0).then_some(self.cache_max_entries)
    }
}

/// Matching defaults used when a caller does not supply its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingSettings {
    /// Minimum cosine similarity for an interest to match
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Maximum interests per category
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,
}

fn default_threshold() -> f32 {
    0.6
}

fn default_max_matches() -> usize {
    3
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_matches: default_max_matches(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB restaurant store
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub embeddings: EmbeddingSettings,

    #[serde(default)]
    pub mapping: MappingSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "tastemap")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            embeddings: EmbeddingSettings::default(),
            mapping: MappingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/tastemap/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (TASTEMAP_*, nested keys split by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, TypesError> {
        let config_dir = ProjectDirs::from("", "", "tastemap")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: TASTEMAP_DB_PATH, TASTEMAP_MAPPING__THRESHOLD, ...
        builder = builder.add_source(
            Environment::with_prefix("TASTEMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), TypesError> {
        if !(0.0..=1.0).contains(&self.mapping.threshold) {
            return Err(TypesError::Config(format!(
                "mapping.threshold must be 0.0-1.0, got {}",
                self.mapping.threshold
            )));
        }
        if self.mapping.max_matches == 0 {
            return Err(TypesError::Config(
                "mapping.max_matches must be > 0".to_string(),
            ));
        }
        if self.embeddings.dimension == 0 {
            return Err(TypesError::Config(
                "embeddings.dimension must be > 0".to_string(),
            ));
        }
        if self.embeddings.init_poll_interval_ms == 0 || self.embeddings.init_max_attempts == 0 {
            return Err(TypesError::Config(
                "embeddings.init_poll_interval_ms and init_max_attempts must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Expand ~ in db_path to the home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        expand_home(&self.db_path)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.embeddings.dimension, 384);
        assert_eq!(settings.embeddings.backend, EmbeddingBackend::Candle);
        assert_eq!(settings.mapping.max_matches, 3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.embeddings.init_max_attempts, 50);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tastemap.toml");
        std::fs::write(
            &path,
            "db_path = \"/tmp/tastemap-db\"\n[embeddings]\nbackend = \"fallback\"\ncache_max_entries = 10\n[mapping]\nthreshold = 0.75\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.db_path, "/tmp/tastemap-db");
        assert_eq!(settings.embeddings.backend, EmbeddingBackend::Fallback);
        assert_eq!(settings.embeddings.cache_bound(), Some(10));
        assert!((settings.mapping.threshold - 0.75).abs() < f32::EPSILON);
        // untouched nested fields keep their defaults
        assert_eq!(settings.mapping.max_matches, 3);
        assert_eq!(settings.embeddings.dimension, 384);
    }

    #[test]
    fn test_wait_budget() {
        let settings = EmbeddingSettings::default();
        assert_eq!(settings.init_wait_budget(), Duration::from_secs(5));
        assert_eq!(settings.cache_bound(), None);
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        settings.mapping.threshold = 1.5;
        assert!(settings.validate().is_err());

        settings.mapping.threshold = 0.5;
        settings.mapping.max_matches = 0;
        assert!(settings.validate().is_err());

        settings.mapping.max_matches = 2;
        settings.embeddings.init_max_attempts = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_expand_home() {
        let plain = expand_home("/var/lib/tastemap");
        assert_eq!(plain, PathBuf::from("/var/lib/tastemap"));

        let settings = EmbeddingSettings {
            model_cache_dir: "/srv/models".to_string(),
            ..EmbeddingSettings::default()
        };
        assert_eq!(settings.model_cache_path(), PathBuf::from("/srv/models"));
    }
}
