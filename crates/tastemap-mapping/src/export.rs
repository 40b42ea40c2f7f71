//! JSON export/import of category mappings for offline review.
//!
//! The file is a pretty-printed array of objects with `category`,
//! `interests`, `similarityScores` and, when set, `usedFallback`.

use std::path::Path;
use tracing::info;

use tastemap_types::CategoryMapping;

use crate::error::MappingError;

/// Write mappings to `path`, replacing any existing file.
pub fn write_mappings(path: &Path, mappings: &[CategoryMapping]) -> Result<(), MappingError> {
    let json = serde_json::to_string_pretty(mappings)?;
    std::fs::write(path, json)?;
    info!(path = ?path, count = mappings.len(), "Exported mappings");
    Ok(())
}

/// Read mappings previously written by [`write_mappings`] (or edited by hand).
pub fn read_mappings(path: &Path) -> Result<Vec<CategoryMapping>, MappingError> {
    let json = std::fs::read_to_string(path)?;
    let mappings: Vec<CategoryMapping> = serde_json::from_str(&json)?;
    info!(path = ?path, count = mappings.len(), "Imported mappings");
    Ok(mappings)
}

/// Reject mappings that name interests outside `taxonomy` or have no category.
pub fn validate_mappings(
    mappings: &[CategoryMapping],
    taxonomy: &[String],
) -> Result<(), MappingError> {
    for mapping in mappings {
        if mapping.category.is_empty() {
            return Err(MappingError::InvalidInput(
                "mapping with empty category".to_string(),
            ));
        }
        if let Some(unknown) = mapping
            .interests
            .iter()
            .find(|interest| !taxonomy.contains(*interest))
        {
            return Err(MappingError::InvalidInput(format!(
                "unknown interest '{}' for category '{}'",
                unknown, mapping.category
            )));
        }
    }
    Ok(())
}
