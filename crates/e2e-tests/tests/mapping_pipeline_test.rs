//! Category mapping E2E tests.
//!
//! Runs raw categories through the provider and the mapper with
//! deterministic embedding resources.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use e2e_tests::{provider_with, TestHarness};
use tastemap_embeddings::mock::{FailingLoader, StaticLoader, StaticResource};
use tastemap_embeddings::{fallback_embedding, EmbeddingCache, EmbeddingProvider, ProviderConfig};
use tastemap_mapping::{update_all_restaurants_interests, CategoryMapper};
use tastemap_types::{enhance_category, enhance_interest};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A category scoring 0.91 against Pizza and 0.12 against Sushi maps to
/// Pizza alone at threshold 0.75, with both scores reported.
#[tokio::test]
async fn test_margherita_maps_to_pizza() {
    let third = (1.0f32 - 0.91 * 0.91 - 0.12 * 0.12).sqrt();
    let resource = StaticResource::new(3)
        .with_vector(enhance_interest("Pizza"), vec![1.0, 0.0, 0.0])
        .with_vector(enhance_interest("Sushi"), vec![0.0, 1.0, 0.0])
        .with_vector(
            enhance_category("Margherita Pizza Corner"),
            vec![0.91, 0.12, third],
        );
    let provider = provider_with(Arc::new(StaticLoader::new(resource)), 3);
    let mapper = CategoryMapper::new(provider).with_taxonomy(strings(&["Pizza", "Sushi"]));

    let mappings = mapper
        .generate_category_mappings(&strings(&["Margherita Pizza Corner"]), 0.75)
        .await;

    assert_eq!(mappings.len(), 1);
    let mapping = &mappings[0];
    assert_eq!(mapping.category, "Margherita Pizza Corner");
    assert_eq!(mapping.interests, vec!["Pizza"]);
    assert!(!mapping.used_fallback);
    assert_eq!(mapping.similarity_scores.len(), 2);
    assert!((mapping.similarity_scores["Pizza"] - 0.91).abs() < 1e-4);
    assert!((mapping.similarity_scores["Sushi"] - 0.12).abs() < 1e-4);
}

/// With an always-failing resource every text still gets one deterministic
/// 384-dimensional vector.
#[tokio::test]
async fn test_failing_resource_yields_deterministic_vectors() {
    let provider = provider_with(Arc::new(FailingLoader::new("model offline")), 384);
    let texts = strings(&["Tapas Bar"]);

    let first = provider.get_embeddings(&texts).await;
    let second = provider.get_embeddings(&texts).await;

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].dimension(), 384);
    assert_eq!(first, second);

    // same vector from an independent provider and cache
    let other = provider_with(Arc::new(FailingLoader::new("model offline")), 384);
    assert_eq!(other.get_embeddings(&texts).await, first);
    assert_eq!(first[0], fallback_embedding("Tapas Bar", 384));
}

/// A cached text is served without the resource, even when the resource
/// has since become unavailable.
#[tokio::test]
async fn test_cache_hit_survives_broken_resource() {
    let cache = Arc::new(EmbeddingCache::unbounded());
    let config = ProviderConfig {
        dimension: 2,
        ..ProviderConfig::default()
    };
    let texts = strings(&["Ramen Shop"]);

    let healthy = EmbeddingProvider::new(
        Arc::new(StaticLoader::new(
            StaticResource::new(2).with_vector("Ramen Shop", vec![0.6, 0.8]),
        )),
        cache.clone(),
        config.clone(),
    );
    let first = healthy.get_embeddings(&texts).await;

    let failing = Arc::new(FailingLoader::new("gone"));
    let broken = EmbeddingProvider::new(failing.clone(), cache, config);
    let second = broken.get_embeddings_detailed(&texts).await;

    assert_eq!(second[0].embedding, first[0]);
    assert!(second[0].cached);
    assert!(!second[0].used_fallback());
    assert_eq!(failing.attempts(), 0);
}

/// Output length and order follow the input even when some categories
/// degrade to fallback embeddings.
#[tokio::test]
async fn test_mappings_keep_order_with_partial_failures() {
    let resource = StaticResource::new(2)
        .with_vector(enhance_interest("Pizza"), vec![1.0, 0.0])
        .with_vector(enhance_interest("Sushi"), vec![0.0, 1.0])
        .with_vector(enhance_category("Sushi Bar"), vec![0.0, 1.0])
        .with_failure(enhance_category("Broken Feed"));
    let provider = provider_with(Arc::new(StaticLoader::new(resource)), 2);
    let mapper = CategoryMapper::new(provider).with_taxonomy(strings(&["Pizza", "Sushi"]));

    let categories = strings(&["Broken Feed", "Sushi Bar", "Unknown Place"]);
    let mappings = mapper.generate_category_mappings(&categories, 0.9).await;

    let names: Vec<&str> = mappings.iter().map(|m| m.category.as_str()).collect();
    assert_eq!(names, vec!["Broken Feed", "Sushi Bar", "Unknown Place"]);
    assert!(mappings[0].used_fallback);
    assert_eq!(mappings[1].interests, vec!["Sushi"]);
    assert!(!mappings[1].used_fallback);
    assert!(mappings[2].used_fallback);
}

/// Preview then commit: generated mappings flow into stored interests.
#[tokio::test]
async fn test_generate_then_reconcile() {
    let harness = TestHarness::new();
    harness.seed_restaurant("luigis", &["Pizza Corner"]);
    harness.seed_restaurant("umi", &["Sushi Bar", "Pizza Corner"]);
    harness.seed_restaurant("empty", &[]);

    let resource = StaticResource::new(2)
        .with_vector(enhance_interest("Pizza"), vec![1.0, 0.0])
        .with_vector(enhance_interest("Sushi"), vec![0.0, 1.0])
        .with_vector(enhance_category("Pizza Corner"), vec![0.95, 0.05])
        .with_vector(enhance_category("Sushi Bar"), vec![0.05, 0.95]);
    let provider = provider_with(Arc::new(StaticLoader::new(resource)), 2);
    let mapper = CategoryMapper::new(provider).with_taxonomy(strings(&["Pizza", "Sushi"]));

    let categories = harness.storage.distinct_categories().unwrap();
    let mappings = mapper.generate_category_mappings(&categories, 0.6).await;
    let summary = update_all_restaurants_interests(&*harness.storage, &mappings)
        .await
        .unwrap();

    assert_eq!(summary.updated, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(harness.interests_of("luigis"), vec!["Pizza"]);
    assert_eq!(harness.interests_of("umi"), vec!["Sushi", "Pizza"]);
    assert!(harness.interests_of("empty").is_empty());
}
