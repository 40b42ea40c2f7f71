//! Ranks taxonomy interests against a category embedding.

use std::collections::BTreeMap;

use tastemap_embeddings::Embedding;

use crate::error::MappingError;

/// A taxonomy entry paired with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledEmbedding {
    pub label: String,
    pub embedding: Embedding,
}

impl LabeledEmbedding {
    pub fn new(label: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            label: label.into(),
            embedding,
        }
    }

    /// Usable for matching: non-empty label and non-empty vector.
    pub fn is_valid(&self) -> bool {
        !self.label.is_empty() && !self.embedding.is_empty()
    }
}

/// Score `query` against every valid labeled embedding, keeping input order.
fn ranked(
    query: &Embedding,
    labeled: &[LabeledEmbedding],
) -> Result<Vec<(String, f32)>, MappingError> {
    if query.is_empty() {
        return Err(MappingError::InvalidInput(
            "query embedding is empty".to_string(),
        ));
    }

    labeled
        .iter()
        .filter(|entry| entry.is_valid())
        .map(|entry| {
            let score = query.cosine_similarity(&entry.embedding)?;
            Ok((entry.label.clone(), score))
        })
        .collect()
}

/// One query scored against the taxonomy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterestRanking {
    /// Labels passing the threshold, best first, at most `max_matches`
    pub interests: Vec<String>,
    /// Unfiltered score of every valid label
    pub scores: BTreeMap<String, f32>,
}

/// Score `query` once and derive both the full score map and the matches.
pub fn rank_interests(
    query: &Embedding,
    labeled: &[LabeledEmbedding],
    threshold: f32,
    max_matches: usize,
) -> Result<InterestRanking, MappingError> {
    let scored = ranked(query, labeled)?;
    let scores = scored
        .iter()
        .map(|(label, score)| (label.clone(), *score))
        .collect();

    Ok(InterestRanking {
        interests: best_matches(scored, threshold, max_matches),
        scores,
    })
}

/// Labels scoring at least `threshold`, best first, at most `max_matches`.
///
/// Ties keep their taxonomy order. Returns an empty list when no labeled
/// embedding is usable; fails only on an empty query or a dimension
/// mismatch.
pub fn find_matching_interests(
    query: &Embedding,
    labeled: &[LabeledEmbedding],
    threshold: f32,
    max_matches: usize,
) -> Result<Vec<String>, MappingError> {
    Ok(best_matches(ranked(query, labeled)?, threshold, max_matches))
}

fn best_matches(
    mut scored: Vec<(String, f32)>,
    threshold: f32,
    max_matches: usize,
) -> Vec<String> {
    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .filter(|(_, score)| *score >= threshold)
        .take(max_matches)
        .map(|(label, _)| label)
        .collect()
}
