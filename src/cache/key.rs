//! Cache key derivation for city forecasts

/// Namespace prefix shared by every forecast key
pub const KEY_NAMESPACE: &str = "weather";

/// Derives the cache key for a city name
///
/// Trims and lower-cases the name, collapses every run of whitespace into a
/// single hyphen and prefixes the namespace, so `"  New   York "` and
/// `"new york"` both map to `weather:new-york`.
pub fn derive_key(city: &str) -> String {
    let normalized = city
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{}:{}", KEY_NAMESPACE, normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_city() {
        assert_eq!(derive_key("paris"), "weather:paris");
    }

    #[test]
    fn test_case_and_outer_whitespace_are_ignored() {
        let expected = derive_key("moscow");
        for variant in ["Moscow", "  moscow ", "MOSCOW", "\tMoScOw\n"] {
            assert_eq!(derive_key(variant), expected, "variant {:?}", variant);
        }
    }

    #[test]
    fn test_internal_whitespace_runs_collapse_to_one_hyphen() {
        assert_eq!(derive_key("new york"), "weather:new-york");
        assert_eq!(derive_key("new    york"), "weather:new-york");
        assert_eq!(derive_key("rio de\t\tjaneiro"), "weather:rio-de-janeiro");
        assert_eq!(derive_key(" San \n Francisco "), "weather:san-francisco");
    }

    #[test]
    fn test_existing_hyphens_are_kept() {
        assert_eq!(derive_key("Aix-en-Provence"), "weather:aix-en-provence");
    }

    #[test]
    fn test_non_ascii_names_are_lowercased() {
        assert_eq!(derive_key("Москва"), "weather:москва");
        assert_eq!(derive_key("São Paulo"), "weather:são-paulo");
    }

    #[test]
    fn test_empty_input_yields_bare_namespace() {
        assert_eq!(derive_key("   "), "weather:");
    }
}
