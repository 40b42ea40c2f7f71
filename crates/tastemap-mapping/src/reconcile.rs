//! Applies category mappings to restaurant interest lists.
//!
//! A restaurant's interests become the deduplicated union of the interests
//! mapped from each of its raw categories. Re-applying the same mappings
//! yields the same list.

use tracing::{debug, info};

use tastemap_types::{CategoryMapping, Restaurant};

use crate::error::MappingError;
use crate::store::RestaurantStore;

/// Result of reconciling one restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Interests were written
    Updated { interests: Vec<String> },
    /// Restaurant has no categories; nothing written
    NoCategories,
}

/// Counts for a bulk reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub updated: usize,
    pub skipped: usize,
}

/// Union of the interests mapped from the restaurant's categories.
///
/// Categories match exactly. Order follows the restaurant's categories,
/// then each mapping's interest order; duplicates keep their first position.
pub fn merge_interests(restaurant: &Restaurant, mappings: &[CategoryMapping]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for category in &restaurant.categories {
        for mapping in mappings.iter().filter(|m| &m.category == category) {
            for interest in &mapping.interests {
                if !merged.contains(interest) {
                    merged.push(interest.clone());
                }
            }
        }
    }
    merged
}

async fn apply(
    store: &dyn RestaurantStore,
    restaurant: &Restaurant,
    mappings: &[CategoryMapping],
) -> Result<ReconcileOutcome, MappingError> {
    if !restaurant.has_categories() {
        debug!(id = %restaurant.id, "Restaurant has no categories, skipping");
        return Ok(ReconcileOutcome::NoCategories);
    }

    let interests = merge_interests(restaurant, mappings);
    store
        .set_interests(&restaurant.id, interests.clone())
        .await?;
    debug!(id = %restaurant.id, count = interests.len(), "Wrote restaurant interests");

    Ok(ReconcileOutcome::Updated { interests })
}

/// Reconcile a single restaurant.
pub async fn update_restaurant_interests(
    store: &dyn RestaurantStore,
    restaurant_id: &str,
    mappings: &[CategoryMapping],
) -> Result<ReconcileOutcome, MappingError> {
    let restaurant = store
        .get_restaurant(restaurant_id)
        .await?
        .ok_or_else(|| MappingError::RestaurantNotFound(restaurant_id.to_string()))?;

    apply(store, &restaurant, mappings).await
}

/// Reconcile every restaurant, one at a time.
///
/// The first failing restaurant aborts the run: restaurants already written
/// stay written and the rest are not attempted.
// TODO: decide whether the bulk path should isolate per-restaurant failures
// the way category mapping does, and report them in ReconcileSummary.
pub async fn update_all_restaurants_interests(
    store: &dyn RestaurantStore,
    mappings: &[CategoryMapping],
) -> Result<ReconcileSummary, MappingError> {
    let restaurants = store.list_restaurants().await?;
    let mut summary = ReconcileSummary::default();

    for restaurant in &restaurants {
        match apply(store, restaurant, mappings).await? {
            ReconcileOutcome::Updated { .. } => summary.updated += 1,
            ReconcileOutcome::NoCategories => summary.skipped += 1,
        }
    }

    info!(
        updated = summary.updated,
        skipped = summary.skipped,
        "Reconciled restaurant interests"
    );
    Ok(summary)
}
