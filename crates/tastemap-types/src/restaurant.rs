//! Restaurant record as seen by the reconciliation engine.
//!
//! Only the two string-array fields matter to the engine: the raw
//! `categories` harvested from upstream sources and the reconciled
//! `interests` drawn from the closed taxonomy.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Stable identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Raw free-text category labels, not unique across restaurants
    #[serde(default)]
    pub categories: Vec<String>,

    /// Interests drawn from the taxonomy
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Restaurant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            categories,
            interests: Vec::new(),
        }
    }

    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TypesError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_interests() {
        let r = Restaurant::new("r1", "Luigi's", vec!["Pizza Corner".to_string()]);
        assert!(r.interests.is_empty());
        assert!(r.has_categories());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let mut r = Restaurant::new("r1", "Luigi's", vec!["Pizza Corner".to_string()]);
        r.interests.push("Pizza".to_string());
        let decoded = Restaurant::from_bytes(&r.to_bytes().unwrap()).unwrap();
        assert_eq!(r, decoded);
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let r = Restaurant::from_bytes(br#"{"id":"r9"}"#).unwrap();
        assert!(r.categories.is_empty());
        assert!(r.interests.is_empty());
        assert!(!r.has_categories());
    }
}
