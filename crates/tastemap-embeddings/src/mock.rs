//! In-memory embedding resources for tests and demos.
//!
//! `StaticResource` answers from a fixed text → vector table, `StaticLoader`
//! hands it out (optionally after a delay), and `FailingLoader` never
//! succeeds. All of them count calls so tests can assert on resource usage.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::EmbeddingError;
use crate::model::{EmbeddingResource, ModelInfo, ResourceLoader, ResourceOutput};

/// Resource returning preconfigured vectors.
///
/// Unknown texts yield an empty vector; texts registered with
/// [`with_failure`](Self::with_failure) yield an error.
pub struct StaticResource {
    info: ModelInfo,
    vectors: HashMap<String, Vec<f32>>,
    failures: HashSet<String>,
    calls: AtomicUsize,
}

impl StaticResource {
    pub fn new(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "static".to_string(),
                dimension,
                max_sequence_length: usize::MAX,
            },
            vectors: HashMap::new(),
            failures: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_vector(mut self, text: impl Into<String>, values: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), values);
        self
    }

    pub fn with_failure(mut self, text: impl Into<String>) -> Self {
        self.failures.insert(text.into());
        self
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingResource for StaticResource {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    async fn embed(&self, text: &str) -> Result<ResourceOutput, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.contains(text) {
            return Err(EmbeddingError::EmbeddingComputationFailed(format!(
                "static failure for '{text}'"
            )));
        }
        Ok(ResourceOutput::Vector(
            self.vectors.get(text).cloned().unwrap_or_default(),
        ))
    }
}

/// Loader handing out a shared [`StaticResource`].
pub struct StaticLoader {
    resource: Arc<StaticResource>,
    delay: Option<Duration>,
    attempts: AtomicUsize,
}

impl StaticLoader {
    pub fn new(resource: StaticResource) -> Self {
        Self {
            resource: Arc::new(resource),
            delay: None,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Simulate a slow acquisition.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn resource(&self) -> &Arc<StaticResource> {
        &self.resource
    }
}

#[async_trait]
impl ResourceLoader for StaticLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingResource>, EmbeddingError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let resource: Arc<dyn EmbeddingResource> = self.resource.clone();
        Ok(resource)
    }
}

/// Loader whose acquisition always fails.
pub struct FailingLoader {
    message: String,
    delay: Option<Duration>,
    attempts: AtomicUsize,
}

impl FailingLoader {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            delay: None,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceLoader for FailingLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingResource>, EmbeddingError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Err(EmbeddingError::ResourceAcquisitionFailed(self.message.clone()))
    }
}
