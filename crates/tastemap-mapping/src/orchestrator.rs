//! Batch category → interest mapping.
//!
//! Every call embeds the whole taxonomy and all requested categories
//! through the provider. Repeat calls stay cheap because the provider's
//! cache is keyed by the templated text.

use std::sync::Arc;
use tracing::{debug, info, warn};

use tastemap_embeddings::{EmbeddingProvider, ProvidedEmbedding};
use tastemap_types::{enhance_category, enhance_interest, taxonomy, CategoryMapping};

use crate::matcher::{rank_interests, InterestRanking, LabeledEmbedding};

/// Default cap on interests per category
pub const DEFAULT_MAX_MATCHES: usize = 3;

/// Maps raw categories onto a fixed interest taxonomy.
pub struct CategoryMapper {
    provider: Arc<EmbeddingProvider>,
    taxonomy: Vec<String>,
    max_matches: usize,
}

impl CategoryMapper {
    /// Mapper over the built-in taxonomy.
    pub fn new(provider: Arc<EmbeddingProvider>) -> Self {
        Self {
            provider,
            taxonomy: taxonomy(),
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }

    pub fn with_max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = max_matches;
        self
    }

    /// Replace the interest vocabulary.
    pub fn with_taxonomy(mut self, taxonomy: Vec<String>) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn taxonomy(&self) -> &[String] {
        &self.taxonomy
    }

    pub fn provider(&self) -> &Arc<EmbeddingProvider> {
        &self.provider
    }

    /// One mapping per input category, in input order.
    ///
    /// A category whose embedding or matching fails gets an empty mapping;
    /// the rest of the batch is unaffected.
    pub async fn generate_category_mappings(
        &self,
        categories: &[String],
        threshold: f32,
    ) -> Vec<CategoryMapping> {
        if categories.is_empty() {
            return Vec::new();
        }

        let interest_texts: Vec<String> =
            self.taxonomy.iter().map(|i| enhance_interest(i)).collect();
        let interest_embeddings = self.provider.get_embeddings_detailed(&interest_texts).await;
        let taxonomy_degraded = interest_embeddings.iter().any(ProvidedEmbedding::used_fallback);
        if taxonomy_degraded {
            warn!("Taxonomy embeddings include fallback vectors");
        }

        let labeled: Vec<LabeledEmbedding> = self
            .taxonomy
            .iter()
            .zip(interest_embeddings)
            .map(|(label, provided)| LabeledEmbedding::new(label.clone(), provided.embedding))
            .collect();

        let category_texts: Vec<String> = categories.iter().map(|c| enhance_category(c)).collect();
        let category_embeddings = self.provider.get_embeddings_detailed(&category_texts).await;

        let mut mappings = Vec::with_capacity(categories.len());
        for (index, category) in categories.iter().enumerate() {
            let mapping = match category_embeddings.get(index) {
                Some(provided) => {
                    self.map_one(category, provided, &labeled, threshold, taxonomy_degraded)
                }
                None => {
                    warn!(category = %category, "No embedding produced for category");
                    CategoryMapping::empty(category.clone())
                }
            };
            mappings.push(mapping);
        }

        let matched = mappings.iter().filter(|m| !m.is_empty()).count();
        let degraded = mappings.iter().filter(|m| m.used_fallback).count();
        info!(
            count = mappings.len(),
            matched,
            degraded,
            threshold,
            "Generated category mappings"
        );

        mappings
    }

    fn map_one(
        &self,
        category: &str,
        provided: &ProvidedEmbedding,
        labeled: &[LabeledEmbedding],
        threshold: f32,
        taxonomy_degraded: bool,
    ) -> CategoryMapping {
        let used_fallback = taxonomy_degraded || provided.used_fallback();

        if provided.embedding.is_empty() {
            warn!(category = %category, "Empty embedding for category");
            return CategoryMapping {
                used_fallback,
                ..CategoryMapping::empty(category)
            };
        }

        match rank_interests(&provided.embedding, labeled, threshold, self.max_matches) {
            Ok(InterestRanking { interests, scores }) => {
                debug!(category = %category, matches = interests.len(), "Mapped category");
                CategoryMapping {
                    category: category.to_string(),
                    interests,
                    similarity_scores: scores,
                    used_fallback,
                }
            }
            Err(e) => {
                warn!(category = %category, error = %e, "Category mapping failed");
                CategoryMapping {
                    used_fallback,
                    ..CategoryMapping::empty(category)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tastemap_embeddings::mock::{FailingLoader, StaticLoader, StaticResource};
    use tastemap_embeddings::{EmbeddingCache, ProviderConfig, ResourceLoader};

    fn provider(loader: Arc<dyn ResourceLoader>, dim: usize) -> Arc<EmbeddingProvider> {
        let config = ProviderConfig {
            dimension: dim,
            ..ProviderConfig::default()
        };
        Arc::new(EmbeddingProvider::new(
            loader,
            Arc::new(EmbeddingCache::unbounded()),
            config,
        ))
    }

    fn static_mapper() -> CategoryMapper {
        let resource = StaticResource::new(2)
            .with_vector(enhance_interest("Pizza"), vec![1.0, 0.0])
            .with_vector(enhance_interest("Sushi"), vec![0.0, 1.0])
            .with_vector(enhance_category("Pizza Corner"), vec![0.9, 0.1])
            .with_vector(enhance_category("Sushi Bar"), vec![0.1, 0.9]);
        let loader = Arc::new(StaticLoader::new(resource));
        CategoryMapper::new(provider(loader, 2))
            .with_taxonomy(vec!["Pizza".to_string(), "Sushi".to_string()])
    }

    #[tokio::test]
    async fn test_mappings_follow_input_order() {
        let mapper = static_mapper();
        let categories = vec!["Sushi Bar".to_string(), "Pizza Corner".to_string()];

        let mappings = mapper.generate_category_mappings(&categories, 0.5).await;

        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].category, "Sushi Bar");
        assert_eq!(mappings[0].interests, vec!["Sushi"]);
        assert_eq!(mappings[1].category, "Pizza Corner");
        assert_eq!(mappings[1].interests, vec!["Pizza"]);
        assert!(!mappings[0].used_fallback);
    }

    #[tokio::test]
    async fn test_scores_cover_full_taxonomy() {
        let mapper = static_mapper();
        let mappings = mapper
            .generate_category_mappings(&["Pizza Corner".to_string()], 0.5)
            .await;

        let scores = &mappings[0].similarity_scores;
        assert_eq!(scores.len(), 2);
        assert!(scores["Pizza"] > 0.9);
        assert!(scores["Sushi"] < 0.5);
    }

    #[tokio::test]
    async fn test_unknown_category_uses_fallback() {
        // the static resource returns an empty vector for unknown text
        let mapper = static_mapper();
        let categories = vec!["Pizza Corner".to_string(), "Tapas Bar".to_string()];

        let mappings = mapper.generate_category_mappings(&categories, 0.5).await;

        assert_eq!(mappings.len(), 2);
        assert!(!mappings[0].used_fallback);
        assert!(mappings[1].used_fallback);
        assert_eq!(mappings[1].category, "Tapas Bar");
    }

    #[tokio::test]
    async fn test_empty_input() {
        let mapper = static_mapper();
        assert!(mapper.generate_category_mappings(&[], 0.5).await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_resource_still_maps_every_category() {
        let mapper = CategoryMapper::new(provider(Arc::new(FailingLoader::new("offline")), 384));
        let categories: Vec<String> = ["Pizza Corner", "Dessert Bar", "Pizza Corner"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mappings = mapper.generate_category_mappings(&categories, 0.6).await;

        assert_eq!(mappings.len(), 3);
        for (mapping, category) in mappings.iter().zip(&categories) {
            assert_eq!(&mapping.category, category);
            assert!(mapping.used_fallback);
            assert_eq!(mapping.similarity_scores.len(), mapper.taxonomy().len());
            assert!(mapping.interests.len() <= DEFAULT_MAX_MATCHES);
        }
        assert_eq!(mappings[0], mappings[2]);
    }

    #[tokio::test]
    async fn test_max_matches_respected() {
        let mapper = static_mapper().with_max_matches(1);
        let mappings = mapper
            .generate_category_mappings(&["Pizza Corner".to_string()], -1.0)
            .await;
        assert_eq!(mappings[0].interests, vec!["Pizza"]);
    }
}
