//! Lazily acquired embedding provider.
//!
//! The provider owns one embedding resource for the whole process. The
//! first caller that needs it starts the acquisition; callers arriving
//! while it is in flight attach to the same shared future and give up
//! after the configured wait budget. The acquiring caller itself never
//! times out.
//!
//! ```text
//! Uninitialized ──first caller──▶ Initializing ──ok──▶ Ready (terminal)
//!       ▲                              │
//!       └──────────── error ───────────┘
//! ```
//!
//! A failed acquisition is reported to everyone attached to it, then the
//! state returns to `Uninitialized`: the next independent call tries again.
//!
//! Every text that cannot be embedded by the resource gets a deterministic
//! fallback vector, and every result (model or fallback) is cached.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use tastemap_types::EmbeddingSettings;

use crate::cache::{CachedEmbedding, EmbeddingCache, EmbeddingOrigin};
use crate::error::EmbeddingError;
use crate::fallback::fallback_embedding;
use crate::model::{Embedding, EmbeddingResource, ResourceLoader};

type AcquireOutcome = Result<Arc<dyn EmbeddingResource>, Arc<str>>;
type SharedAcquisition = Shared<BoxFuture<'static, AcquireOutcome>>;

enum ProviderState {
    Uninitialized,
    Initializing(SharedAcquisition),
    Ready(Arc<dyn EmbeddingResource>),
}

/// Observable lifecycle state of the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Uninitialized,
    Initializing,
    Ready,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Fixed output dimension, honored on fallback too
    pub dimension: usize,
    /// How long a caller waits on someone else's acquisition
    pub wait_budget: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::from_settings(&EmbeddingSettings::default())
    }
}

impl ProviderConfig {
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self {
            dimension: settings.dimension,
            wait_budget: settings.init_wait_budget(),
        }
    }
}

/// One provider result with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidedEmbedding {
    pub embedding: Embedding,
    pub origin: EmbeddingOrigin,
    /// Served from the cache without touching the resource
    pub cached: bool,
}

impl ProvidedEmbedding {
    pub fn used_fallback(&self) -> bool {
        self.origin == EmbeddingOrigin::Fallback
    }
}

#[derive(Clone, Copy)]
enum Role {
    Acquirer,
    Waiter,
}

/// Shared, lazily initialized embedding provider.
pub struct EmbeddingProvider {
    loader: Arc<dyn ResourceLoader>,
    cache: Arc<EmbeddingCache>,
    config: ProviderConfig,
    state: Arc<Mutex<ProviderState>>,
    last_failure: Arc<Mutex<Option<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EmbeddingProvider {
    pub fn new(
        loader: Arc<dyn ResourceLoader>,
        cache: Arc<EmbeddingCache>,
        config: ProviderConfig,
    ) -> Self {
        Self {
            loader,
            cache,
            config,
            state: Arc::new(Mutex::new(ProviderState::Uninitialized)),
            last_failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Provider backed by the process-wide cache.
    pub fn with_global_cache(loader: Arc<dyn ResourceLoader>, config: ProviderConfig) -> Self {
        Self::new(loader, EmbeddingCache::global(), config)
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn cache(&self) -> &Arc<EmbeddingCache> {
        &self.cache
    }

    pub fn status(&self) -> ProviderStatus {
        match &*lock(&self.state) {
            ProviderState::Uninitialized => ProviderStatus::Uninitialized,
            ProviderState::Initializing(_) => ProviderStatus::Initializing,
            ProviderState::Ready(_) => ProviderStatus::Ready,
        }
    }

    /// Error message of the most recent failed acquisition. Cleared when a
    /// new independent acquisition starts.
    pub fn last_failure(&self) -> Option<String> {
        lock(&self.last_failure).clone()
    }

    /// Embeddings for `texts`, same length and order.
    ///
    /// Texts must already be templated; the cache keys on them verbatim.
    pub async fn get_embeddings(&self, texts: &[String]) -> Vec<Embedding> {
        self.get_embeddings_detailed(texts)
            .await
            .into_iter()
            .map(|provided| provided.embedding)
            .collect()
    }

    /// Like [`get_embeddings`](Self::get_embeddings), with provenance.
    pub async fn get_embeddings_detailed(&self, texts: &[String]) -> Vec<ProvidedEmbedding> {
        let mut slots: Vec<Option<ProvidedEmbedding>> = vec![None; texts.len()];
        let mut pending = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(text) {
                Some(hit) => slots[i] = Some(from_cache(hit)),
                None => pending.push(i),
            }
        }

        if pending.is_empty() {
            debug!(count = texts.len(), "All embeddings served from cache");
            return fill_gaps(slots, texts, |text| self.fallback_and_cache(text));
        }

        match self.acquire().await {
            Ok(resource) => {
                // One text at a time so a bad input only affects itself
                for i in pending {
                    let text = &texts[i];
                    let provided = match self.cache.get(text) {
                        Some(hit) => from_cache(hit),
                        None => self.embed_one(resource.as_ref(), text).await,
                    };
                    slots[i] = Some(provided);
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    count = pending.len(),
                    "Embedding resource unavailable, using fallback embeddings"
                );
                for i in pending {
                    slots[i] = Some(self.fallback_and_cache(&texts[i]));
                }
            }
        }

        fill_gaps(slots, texts, |text| self.fallback_and_cache(text))
    }

    async fn embed_one(&self, resource: &dyn EmbeddingResource, text: &str) -> ProvidedEmbedding {
        match resource.embed(text).await {
            Ok(output) => match output.into_vector(self.config.dimension) {
                Some(values) => {
                    let embedding = Embedding::new(values);
                    self.cache.put(
                        text,
                        CachedEmbedding {
                            embedding: embedding.clone(),
                            origin: EmbeddingOrigin::Model,
                        },
                    );
                    ProvidedEmbedding {
                        embedding,
                        origin: EmbeddingOrigin::Model,
                        cached: false,
                    }
                }
                None => {
                    warn!(
                        text = %text,
                        "Embedding resource returned no usable vector, using fallback"
                    );
                    self.fallback_and_cache(text)
                }
            },
            Err(e) => {
                warn!(text = %text, error = %e, "Embedding failed, using fallback");
                self.fallback_and_cache(text)
            }
        }
    }

    fn fallback_and_cache(&self, text: &str) -> ProvidedEmbedding {
        let embedding = fallback_embedding(text, self.config.dimension);
        self.cache.put(
            text,
            CachedEmbedding {
                embedding: embedding.clone(),
                origin: EmbeddingOrigin::Fallback,
            },
        );
        ProvidedEmbedding {
            embedding,
            origin: EmbeddingOrigin::Fallback,
            cached: false,
        }
    }

    /// Get the resource, starting or joining an acquisition as needed.
    async fn acquire(&self) -> Result<Arc<dyn EmbeddingResource>, EmbeddingError> {
        let (acquisition, role) = {
            let mut state = lock(&self.state);
            match &*state {
                ProviderState::Ready(resource) => return Ok(Arc::clone(resource)),
                ProviderState::Initializing(pending) => (pending.clone(), Role::Waiter),
                ProviderState::Uninitialized => {
                    lock(&self.last_failure).take();
                    let pending = self.start_acquisition();
                    *state = ProviderState::Initializing(pending.clone());
                    (pending, Role::Acquirer)
                }
            }
        };

        let outcome = match role {
            Role::Acquirer => acquisition.await,
            Role::Waiter => {
                debug!("Embedding resource is initializing, waiting");
                tokio::time::timeout(self.config.wait_budget, acquisition)
                    .await
                    .map_err(|_| EmbeddingError::InitializationTimeout {
                        waited_ms: self.config.wait_budget.as_millis() as u64,
                    })?
            }
        };

        outcome.map_err(|message| EmbeddingError::ResourceAcquisitionFailed(message.to_string()))
    }

    fn start_acquisition(&self) -> SharedAcquisition {
        let loader = Arc::clone(&self.loader);
        let state = Arc::clone(&self.state);
        let last_failure = Arc::clone(&self.last_failure);
        let dimension = self.config.dimension;

        async move {
            info!("Acquiring embedding resource");
            let result = loader
                .load()
                .await
                .and_then(|resource| check_dimension(resource, dimension));
            record_outcome(&state, &last_failure, result)
        }
        .boxed()
        .shared()
    }
}

/// A resource is only usable when it produces vectors of the configured width.
fn check_dimension(
    resource: Arc<dyn EmbeddingResource>,
    configured: usize,
) -> Result<Arc<dyn EmbeddingResource>, EmbeddingError> {
    let actual = resource.info().dimension;
    if actual != configured {
        return Err(EmbeddingError::ResourceAcquisitionFailed(format!(
            "model dimension {} != configured {}",
            actual, configured
        )));
    }
    Ok(resource)
}

/// Publish the acquisition result to the provider state.
fn record_outcome(
    state: &Mutex<ProviderState>,
    last_failure: &Mutex<Option<String>>,
    result: Result<Arc<dyn EmbeddingResource>, EmbeddingError>,
) -> AcquireOutcome {
    let mut state = lock(state);
    match result {
        Ok(resource) => {
            info!(
                model = %resource.info().name,
                dim = resource.info().dimension,
                "Embedding resource ready"
            );
            *state = ProviderState::Ready(Arc::clone(&resource));
            Ok(resource)
        }
        Err(e) => {
            let message = e.to_string();
            warn!(error = %message, "Embedding resource acquisition failed");
            *state = ProviderState::Uninitialized;
            *lock(last_failure) = Some(message.clone());
            Err(Arc::from(message))
        }
    }
}

fn from_cache(hit: CachedEmbedding) -> ProvidedEmbedding {
    ProvidedEmbedding {
        embedding: hit.embedding,
        origin: hit.origin,
        cached: true,
    }
}

fn fill_gaps(
    slots: Vec<Option<ProvidedEmbedding>>,
    texts: &[String],
    fallback: impl Fn(&str) -> ProvidedEmbedding,
) -> Vec<ProvidedEmbedding> {
    slots
        .into_iter()
        .zip(texts)
        .map(|(slot, text)| slot.unwrap_or_else(|| fallback(text)))
        .collect()
}

/// Loader that never produces a resource; every text takes the fallback path.
#[derive(Debug, Clone, Default)]
pub struct DisabledLoader;

#[async_trait]
impl ResourceLoader for DisabledLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingResource>, EmbeddingError> {
        Err(EmbeddingError::ResourceAcquisitionFailed(
            "embedding backend disabled".to_string(),
        ))
    }
}
