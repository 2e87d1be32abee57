//! Coordinate extraction from lookup responses.
//!
//! Listings store GeoJSON points under `address.location.coordinates` as
//! `[longitude, latitude]`.

use serde_json::Value;

use crate::types::Coordinates;
use crate::utils::json_path;

const COORDINATES_PATH: &str = "address.location.coordinates";

/// Extract a coordinate pair from an arbitrary JSON value.
///
/// Requires an array of at least two elements at `address.location.coordinates`
/// whose first two elements are finite numbers. Any mismatch yields `None`.
pub fn extract_coordinates(value: &Value) -> Option<Coordinates> {
    let pair = json_path::get_path(value, COORDINATES_PATH)?.as_array()?;
    if pair.len() < 2 {
        return None;
    }

    let longitude = pair[0].as_f64().filter(|v| v.is_finite())?;
    let latitude = pair[1].as_f64().filter(|v| v.is_finite())?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_longitude_first() {
        let v = json!({"address": {"location": {"coordinates": [12.5, 41.9]}}});
        assert_eq!(
            extract_coordinates(&v),
            Some(Coordinates {
                latitude: 41.9,
                longitude: 12.5
            })
        );
    }

    #[test]
    fn test_rejects_non_numeric_pairs() {
        let v = json!({"address": {"location": {"coordinates": ["a", "b"]}}});
        assert_eq!(extract_coordinates(&v), None);
        let v = json!({"address": {"location": {"coordinates": [12.5, null]}}});
        assert_eq!(extract_coordinates(&v), None);
    }

    #[test]
    fn test_rejects_short_or_missing_pairs() {
        assert_eq!(
            extract_coordinates(&json!({"address": {"location": {"coordinates": [12.5]}}})),
            None
        );
        assert_eq!(
            extract_coordinates(&json!({"address": {"location": {"coordinates": "12.5,41.9"}}})),
            None
        );
        assert_eq!(extract_coordinates(&json!({"address": {}})), None);
        assert_eq!(extract_coordinates(&json!("plain string")), None);
        assert_eq!(extract_coordinates(&Value::Null), None);
    }

    #[test]
    fn test_accepts_integers_and_extra_elements() {
        let v = json!({"address": {"location": {"coordinates": [-73, 40, 12.0]}}});
        assert_eq!(
            extract_coordinates(&v),
            Some(Coordinates {
                latitude: 40.0,
                longitude: -73.0
            })
        );
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let v = json!({"address": {"location": {"coordinates": [-73.9, 40.7]}}});
        assert_eq!(extract_coordinates(&v), extract_coordinates(&v));
    }
}
