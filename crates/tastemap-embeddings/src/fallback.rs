//! Deterministic fallback embeddings.
//!
//! Used whenever the embedding resource is unavailable or fails for a
//! text. The vector is derived purely from the text's characters and
//! words, so it is stable across runs but carries no semantic meaning.
//! Its only job is to keep the fixed-dimension contract intact.

use crate::model::Embedding;
use crate::similarity;

/// Weight added per character.
const CHAR_WEIGHT: f32 = 1.0;
/// Weight added per word.
const WORD_WEIGHT: f32 = 2.0;

/// Build a fallback embedding of `dimension` values for `text`.
///
/// Characters and words are bucketed by UTF-16 code unit and by a
/// 32-bit `hash * 31 + unit` rolling hash respectively; the result is
/// L2-normalized. Empty text yields the all-zero vector.
pub fn fallback_embedding(text: &str, dimension: usize) -> Embedding {
    let mut values = vec![0.0f32; dimension];
    if dimension == 0 {
        return Embedding::from_normalized(values);
    }

    let normalized = text.trim().to_lowercase();

    for unit in normalized.encode_utf16() {
        values[unit as usize % dimension] += CHAR_WEIGHT;
    }

    for word in normalized
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
    {
        let hash = word
            .encode_utf16()
            .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32));
        values[hash.unsigned_abs() as usize % dimension] += WORD_WEIGHT;
    }

    similarity::normalize(&mut values);
    Embedding::from_normalized(values)
}
