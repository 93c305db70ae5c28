//! Content stores - where records come from.
//!
//! The graph only needs a flat list of records. [`ContentSource`] is that
//! boundary; [`ContentSet`] serves records held in memory or loaded from JSON
//! fixtures, and [`VaultSource`] reads a folder of markdown notes.

mod vault;

pub use vault::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::entities::{file_stem_name, ContentRecord, Metadata, RecordId};
use crate::error::{ModelError, ModelResult};

/// Anything that can list every content record.
pub trait ContentSource {
    fn list_records(&self) -> ModelResult<Vec<ContentRecord>>;
}

/// A fixture entry; id and name may be left out and are derived from the path.
#[derive(Debug, Deserialize)]
struct FixtureRecord {
    id: Option<RecordId>,
    name: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    source_path: String,
    #[serde(default)]
    metadata: Metadata,
}

impl From<FixtureRecord> for ContentRecord {
    fn from(fixture: FixtureRecord) -> Self {
        let name = fixture
            .name
            .unwrap_or_else(|| file_stem_name(&fixture.source_path).to_string());
        let id = fixture.id.unwrap_or_else(|| {
            let key = if fixture.source_path.is_empty() {
                name.as_str()
            } else {
                fixture.source_path.as_str()
            };
            RecordId::from_source_path(key)
        });

        ContentRecord {
            id,
            name,
            tags: fixture.tags.into_iter().collect(),
            source_path: fixture.source_path,
            metadata: fixture.metadata,
        }
    }
}

/// In-memory record collection, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentSet {
    records: Vec<ContentRecord>,
}

impl ContentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ContentRecord>) -> Self {
        Self { records }
    }

    /// Add a record and return its id.
    pub fn add_record(&mut self, record: ContentRecord) -> RecordId {
        let id = record.id;
        self.records.push(record);
        id
    }

    pub fn get(&self, id: RecordId) -> Option<&ContentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ContentRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn records_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ContentRecord> {
        self.records.iter().filter(move |r| r.has_tag(tag))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ContentRecord> {
        self.records
    }

    /// Fail on the first name shared by two records.
    pub fn check_unique_names(&self) -> ModelResult<()> {
        let mut seen = HashSet::new();
        for record in &self.records {
            if !seen.insert(record.name.as_str()) {
                return Err(ModelError::DuplicateName {
                    name: record.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Parse a JSON array of records.
    ///
    /// Entries may omit `id` and `name`; the name then comes from the file
    /// stem of `source_path` and the id is derived from the path.
    pub fn from_json_str(input: &str) -> ModelResult<Self> {
        let fixtures: Vec<FixtureRecord> = serde_json::from_str(input)?;
        Ok(Self::from_records(
            fixtures.into_iter().map(ContentRecord::from).collect(),
        ))
    }

    pub fn load_json(path: impl AsRef<Path>) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

impl ContentSource for ContentSet {
    fn list_records(&self) -> ModelResult<Vec<ContentRecord>> {
        Ok(self.records.clone())
    }
}

impl FromIterator<ContentRecord> for ContentSet {
    fn from_iter<T: IntoIterator<Item = ContentRecord>>(iter: T) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut set = ContentSet::new();
        let id = set.add_record(ContentRecord::new("Vaeltharis").with_tag("world"));
        set.add_record(ContentRecord::new("Mistport").with_tag("location"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(id).unwrap().name, "Vaeltharis");
        assert!(set.get_by_name("Mistport").is_some());
        assert_eq!(set.records_tagged("world").count(), 1);
    }

    #[test]
    fn test_duplicate_names_detected() {
        let set: ContentSet = [ContentRecord::new("Mistport"), ContentRecord::new("Mistport")]
            .into_iter()
            .collect();

        assert!(matches!(
            set.check_unique_names(),
            Err(ModelError::DuplicateName { name }) if name == "Mistport"
        ));
    }

    #[test]
    fn test_from_json_derives_missing_fields() {
        let set = ContentSet::from_json_str(
            r#"[
                {
                    "source_path": "4. World Almanac/NPCs/Theron Ashvale.md",
                    "tags": ["npc"],
                    "metadata": {"location": "[[Mistport]]"}
                },
                {"name": "Heroes", "tags": ["party"]}
            ]"#,
        )
        .unwrap();

        let theron = set.get_by_name("Theron Ashvale").unwrap();
        assert_eq!(
            theron.id,
            RecordId::from_source_path("4. World Almanac/NPCs/Theron Ashvale.md")
        );
        assert_eq!(theron.metadata.get_str("location"), Some("[[Mistport]]"));

        let heroes = set.get_by_name("Heroes").unwrap();
        assert_eq!(heroes.id, RecordId::from_source_path("Heroes"));
        assert!(set.check_unique_names().is_ok());
    }

    #[test]
    fn test_load_json_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, r#"[{"source_path": "Parties/Heroes.md", "tags": ["party"]}]"#)
            .unwrap();

        let first = ContentSet::load_json(&path).unwrap();
        let second = ContentSet::load_json(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.list_records().unwrap().len(), 1);
    }

    #[test]
    fn test_load_json_reports_bad_input() {
        assert!(matches!(
            ContentSet::from_json_str("{not json"),
            Err(ModelError::Json(_))
        ));
    }
}
