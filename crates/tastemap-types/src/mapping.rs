//! Category → interest mapping results.
//!
//! A `CategoryMapping` is both the orchestrator's output and the unit of
//! the JSON export/import format used for offline review:
//!
//! ```json
//! {
//!   "category": "Margherita Pizza Corner",
//!   "interests": ["Pizza"],
//!   "similarityScores": { "Pizza": 0.91, "Sushi": 0.12 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping of one raw category onto the interest taxonomy.
///
/// `similarity_scores` holds one entry per taxonomy interest, including the
/// ones below threshold. `interests` is ordered by descending score and
/// capped at the matcher's `max_matches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMapping {
    pub category: String,

    #[serde(default)]
    pub interests: Vec<String>,

    #[serde(default)]
    pub similarity_scores: BTreeMap<String, f32>,

    /// True when the category's embedding came from the deterministic
    /// fallback rather than the model. Scores are then not semantic.
    #[serde(default, skip_serializing_if = "is_false")]
    pub used_fallback: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CategoryMapping {
    /// Mapping with no interests and no scores, emitted when a category
    /// could not be scored.
    pub fn empty(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            interests: Vec::new(),
            similarity_scores: BTreeMap::new(),
            used_fallback: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.interests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_fields() {
        let mut mapping = CategoryMapping::empty("Tapas Bar");
        mapping.interests.push("Mediterranean".to_string());
        mapping
            .similarity_scores
            .insert("Mediterranean".to_string(), 0.8);

        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["category"], "Tapas Bar");
        assert!(json.get("similarityScores").is_some());
        assert!(json.get("usedFallback").is_none());
    }

    #[test]
    fn test_used_fallback_serialized_only_when_set() {
        let mut mapping = CategoryMapping::empty("Tapas Bar");
        mapping.used_fallback = true;
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["usedFallback"], true);
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let mapping: CategoryMapping =
            serde_json::from_str(r#"{"category":"Dessert Bar","interests":["Desserts"]}"#)
                .unwrap();
        assert_eq!(mapping.interests, vec!["Desserts"]);
        assert!(mapping.similarity_scores.is_empty());
        assert!(!mapping.used_fallback);
    }

    #[test]
    fn test_empty_mapping() {
        let mapping = CategoryMapping::empty("???");
        assert!(mapping.is_empty());
        assert!(mapping.similarity_scores.is_empty());
    }
}
