//! Resolves the sentence-embedding model's files on disk.
//!
//! Files are kept in an hf-hub cache rooted at `embeddings.model_cache_dir`
//! and fetched from HuggingFace Hub only when a file is missing there.

use hf_hub::api::sync::ApiBuilder;
use hf_hub::Cache;
use std::path::PathBuf;
use tracing::{debug, info};

use tastemap_types::EmbeddingSettings;

use crate::error::EmbeddingError;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Which model to load and where its files are cached.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    cache_dir: PathBuf,
    repo_id: String,
}

/// Paths to model files
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self {
            cache_dir: settings.model_cache_path(),
            repo_id: settings.model_repo.clone(),
        }
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    /// Last path segment of the repo id, used as the model's display name.
    pub fn model_name(&self) -> &str {
        self.repo_id.rsplit('/').next().unwrap_or(&self.repo_id)
    }

    /// Paths of a previously downloaded model, `None` if any file is missing.
    pub fn cached(&self) -> Option<ModelPaths> {
        let repo = Cache::new(self.cache_dir.clone()).model(self.repo_id.clone());
        Some(ModelPaths {
            config: repo.get(CONFIG_FILE)?,
            tokenizer: repo.get(TOKENIZER_FILE)?,
            weights: repo.get(WEIGHTS_FILE)?,
        })
    }

    /// Cached paths, downloading the model first when needed.
    ///
    /// Blocking; callers on an async runtime should run it on a blocking thread.
    pub fn resolve(&self) -> Result<ModelPaths, EmbeddingError> {
        if let Some(paths) = self.cached() {
            debug!(repo = %self.repo_id, "Using cached model files");
            return Ok(paths);
        }

        info!(repo = %self.repo_id, dir = ?self.cache_dir, "Downloading model files...");
        let api = ApiBuilder::new()
            .with_cache_dir(self.cache_dir.clone())
            .with_progress(false)
            .build()
            .map_err(|e| self.download_failed(e))?;
        let repo = api.model(self.repo_id.clone());

        let fetch = |file: &str| {
            let path = repo
                .get(file)
                .map_err(|e| self.download_failed(format!("{file}: {e}")))?;
            debug!(file, path = ?path, "Fetched model file");
            Ok::<_, EmbeddingError>(path)
        };

        Ok(ModelPaths {
            config: fetch(CONFIG_FILE)?,
            tokenizer: fetch(TOKENIZER_FILE)?,
            weights: fetch(WEIGHTS_FILE)?,
        })
    }

    fn download_failed(&self, reason: impl std::fmt::Display) -> EmbeddingError {
        EmbeddingError::ResourceAcquisitionFailed(format!(
            "could not download {}: {}",
            self.repo_id, reason
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    pub(crate) fn settings_in(dir: &Path, repo: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            model_cache_dir: dir.to_string_lossy().to_string(),
            model_repo: repo.to_string(),
            ..EmbeddingSettings::default()
        }
    }

    /// Lay files out the way hf-hub caches a `main` snapshot.
    pub(crate) fn write_snapshot(dir: &Path, repo: &str, files: &[(&str, &[u8])]) {
        let repo_dir = dir.join(format!("models--{}", repo.replace('/', "--")));
        std::fs::create_dir_all(repo_dir.join("refs")).unwrap();
        std::fs::write(repo_dir.join("refs").join("main"), "abc123").unwrap();
        let snapshot = repo_dir.join("snapshots").join("abc123");
        std::fs::create_dir_all(&snapshot).unwrap();
        for (name, contents) in files {
            std::fs::write(snapshot.join(name), contents).unwrap();
        }
    }

    #[test]
    fn test_from_settings() {
        let temp = TempDir::new().unwrap();
        let files = ModelFiles::from_settings(&settings_in(temp.path(), "acme/tiny-bert"));
        assert_eq!(files.repo_id(), "acme/tiny-bert");
        assert_eq!(files.model_name(), "tiny-bert");
    }

    #[test]
    fn test_nothing_cached() {
        let temp = TempDir::new().unwrap();
        let files = ModelFiles::from_settings(&settings_in(temp.path(), "acme/tiny-bert"));
        assert!(files.cached().is_none());
    }

    #[test]
    fn test_partial_snapshot_is_not_cached() {
        let temp = TempDir::new().unwrap();
        write_snapshot(temp.path(), "acme/tiny-bert", &[(CONFIG_FILE, b"{}")]);
        let files = ModelFiles::from_settings(&settings_in(temp.path(), "acme/tiny-bert"));
        assert!(files.cached().is_none());
    }

    #[test]
    fn test_resolve_prefers_cached_snapshot() {
        let temp = TempDir::new().unwrap();
        write_snapshot(
            temp.path(),
            "acme/tiny-bert",
            &[(CONFIG_FILE, b"{}"), (TOKENIZER_FILE, b"{}"), (WEIGHTS_FILE, b"x")],
        );
        let files = ModelFiles::from_settings(&settings_in(temp.path(), "acme/tiny-bert"));

        let paths = files.resolve().unwrap();
        assert_eq!(Some(paths.clone()), files.cached());
        assert!(paths.tokenizer.ends_with(TOKENIZER_FILE));
        assert!(paths.weights.starts_with(temp.path()));
    }
}
