//! Content records - one note from the content store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use super::{Metadata, RecordId};

/// Longest suffix after a final dot still treated as a file extension.
const MAX_EXTENSION_LEN: usize = 8;

/// One unit of source content: a note with tags, a path and frontmatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: RecordId,

    /// Join key for every cross-reference. Unique across a record set.
    pub name: String,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Location in the content store, used by path-based classification.
    #[serde(default)]
    pub source_path: String,

    #[serde(default)]
    pub metadata: Metadata,
}

impl ContentRecord {
    /// Create a record with the given name and a random id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            name: name.into(),
            tags: BTreeSet::new(),
            source_path: String::new(),
            metadata: Metadata::new(),
        }
    }

    /// Create a record for a note stored at `path`.
    ///
    /// The name is the file stem and the id is derived from the path, so the
    /// same note always gets the same id.
    pub fn from_source_path(path: impl Into<String>) -> Self {
        let source_path = path.into();
        Self {
            id: RecordId::from_source_path(&source_path),
            name: file_stem_name(&source_path).to_string(),
            tags: BTreeSet::new(),
            source_path,
            metadata: Metadata::new(),
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the source path without touching the name or id.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = path.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set a single metadata field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Reduce a path-like string to its final component without extension.
///
/// Both `/` and `\` separate components. A trailing `.ext` is dropped only
/// when it looks like a file extension (short, alphanumeric, not the whole
/// name), so names such as `St. Aldric` survive intact.
pub fn file_stem_name(path: &str) -> &str {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path).trim();
    strip_extension(file_name).trim()
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => {
            let ext = &file_name[dot + 1..];
            let looks_like_extension = !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric());
            if looks_like_extension {
                &file_name[..dot]
            } else {
                file_name
            }
        }
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source_path() {
        let record = ContentRecord::from_source_path("1. DM Stuff/Session Journals/Session-24.md")
            .with_tag("session-journal");

        assert_eq!(record.name, "Session-24");
        assert!(record.has_tag("session-journal"));
        assert_eq!(
            record.id,
            RecordId::from_source_path("1. DM Stuff/Session Journals/Session-24.md")
        );
    }

    #[test]
    fn test_file_stem_name() {
        assert_eq!(file_stem_name("NPCs/Theron Ashvale.md"), "Theron Ashvale");
        assert_eq!(file_stem_name("Regions\\Eldergrove.mdx"), "Eldergrove");
        assert_eq!(file_stem_name("Mistport"), "Mistport");
        assert_eq!(file_stem_name("Places/St. Aldric"), "St. Aldric");
        assert_eq!(file_stem_name(".hidden"), ".hidden");
        assert_eq!(file_stem_name("Notes/"), "");
    }

    #[test]
    fn test_builder() {
        let record = ContentRecord::new("Heroes")
            .with_tags(["party", "active"])
            .with_path("3. The Party/Parties/Heroes.md")
            .with_field("summary", "Five adventurers");

        assert_eq!(record.tags.len(), 2);
        assert_eq!(record.source_path, "3. The Party/Parties/Heroes.md");
        assert_eq!(record.metadata.get_str("summary"), Some("Five adventurers"));
    }
}
