//! Tool name conversion between the model's camelCase function names and the
//! registry's kebab-case tool names.

use once_cell::sync::Lazy;
use regex::Regex;

static LOWER_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static ACRONYM_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z])([A-Z][a-z])").unwrap());

/// `searchGoogleMaps` → `search-google-maps`, `parseHTMLString` → `parse-html-string`.
///
/// Names that are already kebab-case pass through unchanged.
pub fn camel_to_kebab(name: &str) -> String {
    let step = LOWER_UPPER.replace_all(name, "$1-$2");
    let step = ACRONYM_WORD.replace_all(&step, "$1-$2");
    step.to_lowercase()
}

/// `view-location` → `viewLocation`.
pub fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_to_kebab() {
        assert_eq!(camel_to_kebab("searchGoogleMaps"), "search-google-maps");
        assert_eq!(
            camel_to_kebab("viewLocationOnGoogleMapsAPI"),
            "view-location-on-google-maps-api"
        );
        assert_eq!(camel_to_kebab("parseHTMLString"), "parse-html-string");
        assert_eq!(camel_to_kebab("rental-search"), "rental-search");
        assert_eq!(camel_to_kebab("search"), "search");
    }

    #[test]
    fn test_kebab_round_trip_for_tool_names() {
        for name in [
            "view-location",
            "search",
            "directions",
            "place-details",
            "rental-search",
            "restaurant-search",
        ] {
            assert_eq!(camel_to_kebab(&kebab_to_camel(name)), name);
        }
        assert_eq!(kebab_to_camel("place-details"), "placeDetails");
    }
}
