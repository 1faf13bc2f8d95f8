pub mod path;

use serde::Serialize;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Hashes serializable data into an i64 using CBOR serialization and XxHash64.
///
/// This provides a stable hash across different runs and systems by:
/// - Serializing the data to CBOR format (deterministic binary representation)
/// - Using XxHash64 with a fixed seed (0) for consistent hashing
///
/// Document stores use it to skip writes whose body did not change.
pub fn hash_as_i64<T: Serialize>(data: &T) -> Result<i64, String> {
    let mut hasher = XxHash64::with_seed(0);
    let mut cbor = Vec::new();
    ciborium::ser::into_writer(data, &mut cbor)
        .map_err(|e| format!("Failed to serialize data for hashing: {e}"))?;
    hasher.write(&cbor);
    Ok(hasher.finish() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hash_is_stable_for_equal_bodies() {
        let a = json!({ "title": "A", "cast": ["x", "y"] });
        let b = json!({ "cast": ["x", "y"], "title": "A" });
        assert_eq!(hash_as_i64(&a).unwrap(), hash_as_i64(&b).unwrap());
    }

    #[test]
    fn test_hash_changes_with_content() {
        let a = json!({ "title": "A" });
        let b = json!({ "title": "B" });
        assert_ne!(hash_as_i64(&a).unwrap(), hash_as_i64(&b).unwrap());
    }
}
