//! Dot-notation path lookup over `serde_json::Value`.
//!
//! Supports nested keys (`address.location.coordinates`), bracket indexing
//! (`candidates[0].content`) and dot indexing (`candidates.0.content`).

use serde_json::Value;

/// Get value from JSON using a dot-notation path. Returns `None` on any
/// structural mismatch instead of failing.
pub fn get_path<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    let normalized = path.trim().trim_start_matches("$.");
    if normalized.is_empty() {
        return None;
    }

    let mut current = obj;
    for part in normalized.split('.') {
        if part.is_empty() {
            return None;
        }

        if let Some(bracket_pos) = part.find('[') {
            let key = &part[..bracket_pos];
            let idx = part[bracket_pos + 1..].trim_end_matches(']').parse::<usize>().ok()?;
            if !key.is_empty() {
                current = current.as_object()?.get(key)?;
            }
            current = current.as_array()?.get(idx)?;
            continue;
        }

        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_and_indexed_access() {
        let v = json!({"error": {"message": "quota"}, "candidates": [{"content": {"role": "model"}}]});
        assert_eq!(get_path(&v, "error.message"), Some(&json!("quota")));
        assert_eq!(get_path(&v, "candidates[0].content.role"), Some(&json!("model")));
        assert_eq!(get_path(&v, "$.candidates.0.content.role"), Some(&json!("model")));
    }

    #[test]
    fn test_mismatch_returns_none() {
        let v = json!({"address": "Via Roma"});
        assert!(get_path(&v, "address.location").is_none());
        assert!(get_path(&v, "").is_none());
        assert!(get_path(&v, "address..x").is_none());
        assert!(get_path(&json!([1]), "[x]").is_none());
    }
}
