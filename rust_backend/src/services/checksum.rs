//! Checksum calculation for corridor fingerprints.

use sha2::{Digest, Sha256};

use crate::core::domain::Corridor;
use crate::core::error::{EngineError, EngineResult};

/// Calculate SHA-256 checksum of some content.
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Checksum of the canonical JSON form of a corridor.
///
/// Two corridors loaded from differently formatted files share a checksum as
/// long as they describe the same intersections, phases, offsets and speeds.
pub fn corridor_checksum(corridor: &Corridor) -> EngineResult<String> {
    let canonical = serde_json::to_string(corridor)
        .map_err(|e| EngineError::ParseError(format!("Failed to serialize corridor: {}", e)))?;
    Ok(calculate_checksum(&canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::Intersection;

    #[test]
    fn test_checksum_consistency() {
        let content = r#"{"test": "data"}"#;
        assert_eq!(calculate_checksum(content), calculate_checksum(content));
        assert_eq!(calculate_checksum(content).len(), 64);
    }

    #[test]
    fn test_corridor_checksum_tracks_offsets() {
        let corridor = Corridor::new(vec![Intersection::new(0.0), Intersection::new(200.0)]);
        let shifted = corridor.with_offsets(&[0.0, 15.0]).unwrap();

        assert_eq!(
            corridor_checksum(&corridor).unwrap(),
            corridor_checksum(&corridor.clone()).unwrap()
        );
        assert_ne!(
            corridor_checksum(&corridor).unwrap(),
            corridor_checksum(&shifted).unwrap()
        );
    }
}
