//! Column header normalization

use lazy_regex::regex_replace_all;

/// Turn a raw header into the key rows are stored under.
///
/// The key is `_` followed by the header with every character that is not
/// a word character (alphanumeric or `_`) removed, lowercased. Distinct
/// headers can share a key.
///
/// ```rust
/// use tabula::normalize;
///
/// assert_eq!(normalize("Order ID"), "_orderid");
/// assert_eq!(normalize("order-id!"), "_orderid");
/// assert_eq!(normalize(""), "_");
/// ```
pub fn normalize(raw: &str) -> String {
    let stripped = regex_replace_all!(r"[^\w]+", raw, "");
    let mut key = String::with_capacity(stripped.len() + 1);
    key.push('_');
    key.push_str(&stripped.to_lowercase());
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_examples() {
        assert_eq!(normalize("Order ID"), "_orderid");
        assert_eq!(normalize("order-id!"), "_orderid");
        assert_eq!(normalize("Unit_Price (EUR)"), "_unit_priceeur");
        assert_eq!(normalize("   "), "_");
        assert_eq!(normalize("Größe"), "_größe");
    }

    proptest! {
        #[test]
        fn normalize_is_deterministic(raw in ".*") {
            prop_assert_eq!(normalize(&raw), normalize(&raw));
        }

        #[test]
        fn normalized_keys_are_identifier_safe(raw in ".*") {
            let key = normalize(&raw);
            prop_assert!(key.starts_with('_'));
            prop_assert!(key.chars().all(|c| c.is_alphanumeric() || c == '_' || !c.is_ascii()));
        }

        #[test]
        fn normalize_is_idempotent_after_prefix(raw in "[A-Za-z0-9 _-]{0,24}") {
            let key = normalize(&raw);
            prop_assert_eq!(normalize(&key[1..]), key);
        }
    }
}
