//! Diacritic- and case-insensitive matching of response keys to signs.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::SignRecord;

/// "Gémeaux", "GEMEAUX" and "gemeaux" all normalize to "gemeaux".
pub fn normalize_key(key: &str) -> String {
    slug::slugify(key)
}

/// Model output keyed by normalized sign name.
pub struct KeyedResponse {
    entries: HashMap<String, Value>,
}

impl KeyedResponse {
    pub fn new(raw: HashMap<String, Value>) -> Self {
        Self {
            entries: raw
                .into_iter()
                .map(|(key, value)| (normalize_key(&key), value))
                .collect(),
        }
    }

    /// The entry for `sign`, looked up by display name then by slug.
    pub fn entry_for(&self, sign: &SignRecord) -> Option<&Value> {
        self.entries
            .get(&normalize_key(&sign.name))
            .or_else(|| self.entries.get(&normalize_key(&sign.slug)))
    }

    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::sign::fixture_signs;

    #[test]
    fn test_normalize_strips_accents_and_case() {
        assert_eq!(normalize_key("Gémeaux"), "gemeaux");
        assert_eq!(normalize_key("GEMEAUX"), "gemeaux");
        assert_eq!(normalize_key("Bélier"), "belier");
        assert_eq!(normalize_key(" Capricorne "), "capricorne");
    }

    #[test]
    fn test_unaccented_key_matches_accented_sign() {
        let signs = fixture_signs();
        let gemeaux = signs.iter().find(|s| s.slug == "gemeaux").unwrap();
        let raw = HashMap::from([("Gemeaux".to_string(), json!({"amour": "x"}))]);

        let response = KeyedResponse::new(raw);

        assert_eq!(response.entry_for(gemeaux).unwrap()["amour"], "x");
    }

    #[test]
    fn test_slug_key_matches() {
        let signs = fixture_signs();
        let belier = &signs[0];
        let raw = HashMap::from([("belier".to_string(), json!({}))]);
        assert!(KeyedResponse::new(raw).entry_for(belier).is_some());
    }

    #[test]
    fn test_unknown_sign_has_no_entry() {
        let signs = fixture_signs();
        let raw = HashMap::from([("Ophiuchus".to_string(), json!({}))]);
        let response = KeyedResponse::new(raw);
        assert!(signs.iter().all(|s| response.entry_for(s).is_none()));
        assert_eq!(response.key_count(), 1);
    }
}
