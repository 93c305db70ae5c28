//! Free-form metadata attached to a content record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const WORLD_KEY: &str = "world";
pub const LOCATION_KEY: &str = "location";
pub const PARTY_KEY: &str = "party";
pub const PARTY_RELATIONSHIPS_KEY: &str = "partyRelationships";
pub const TAGS_KEY: &str = "tags";

/// Open key-value map taken from a note's frontmatter.
///
/// Values stay as raw JSON; the accessors below define how the ambiguous
/// shapes hand-written notes produce (a string, a list holding one string, a
/// map of references) are read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A key counts as present only when its value is not `null`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    /// Read a single string field.
    ///
    /// A list is read as its first string entry, since notes often write
    /// `location: ["[[Mistport]]"]` for a single link. One level of nesting is
    /// looked through: an unquoted `[[Mistport]]` reads as YAML `[["Mistport"]]`.
    /// Other shapes yield `None`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.as_str()),
            Value::Array(items) => items.iter().find_map(|item| match item {
                Value::String(s) => Some(s.as_str()),
                Value::Array(inner) => inner.iter().find_map(Value::as_str),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Read a map-valued field, preserving the key order of the source.
    pub fn get_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key)?.as_object()
    }

    /// Read a list of strings. A single string is read as a one-element list.
    pub fn get_str_list(&self, key: &str) -> Vec<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for Metadata {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_str_shapes() {
        let meta = Metadata::new()
            .with("world", "[[Vaeltharis]]")
            .with("location", json!(["[[Mistport]]", "[[Eldergrove]]"]))
            .with("date", 24);

        assert_eq!(meta.get_str("world"), Some("[[Vaeltharis]]"));
        assert_eq!(meta.get_str("location"), Some("[[Mistport]]"));
        assert_eq!(meta.get_str("date"), None);
        assert_eq!(meta.get_str("missing"), None);
    }

    #[test]
    fn test_get_str_unquoted_link() {
        let fields: BTreeMap<String, Value> =
            serde_yaml::from_str("location: [[Mistport]]\nparty: [[[Heroes]]]\n").unwrap();
        let meta = Metadata::from(fields);

        assert_eq!(meta.get_str("location"), Some("Mistport"));
        assert_eq!(meta.get_str("party"), None);
    }

    #[test]
    fn test_null_is_absent() {
        let meta = Metadata::new().with("party", Value::Null);
        assert!(!meta.contains_key("party"));
        assert!(meta.get_str("party").is_none());
    }

    #[test]
    fn test_map_preserves_key_order() {
        let meta: Metadata = serde_json::from_str(
            r#"{"partyRelationships": {"[[Zephyr Company]]": true, "[[Heroes]]": true}}"#,
        )
        .unwrap();

        let keys: Vec<_> = meta
            .get_map(PARTY_RELATIONSHIPS_KEY)
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["[[Zephyr Company]]", "[[Heroes]]"]);
    }

    #[test]
    fn test_str_list() {
        let meta = Metadata::new()
            .with("tags", json!(["npc", 3, "ally"]))
            .with("single", "one");

        assert_eq!(meta.get_str_list("tags"), vec!["npc", "ally"]);
        assert_eq!(meta.get_str_list("single"), vec!["one"]);
        assert!(meta.get_str_list("missing").is_empty());
    }
}
