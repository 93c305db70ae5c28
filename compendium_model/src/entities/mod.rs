//! Record and entity definitions for the compendium.

mod metadata;
mod record;

pub use metadata::*;
pub use record::*;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ModelError;

/// Namespace for path-derived record ids.
const RECORD_NAMESPACE: Uuid = Uuid::from_u128(0x6c0e_52f4_8f1b_4d4e_9a57_3b2d_1f0c_77a1);

/// Opaque, stable identifier for a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Create a new random record ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a record ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Derive a deterministic ID from a record's source path.
    ///
    /// The same path always yields the same ID, so rebuilding the graph from an
    /// unchanged vault produces identical ids.
    pub fn from_source_path(path: &str) -> Self {
        Self(Uuid::new_v5(&RECORD_NAMESPACE, path.as_bytes()))
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of entity a record has been classified as.
///
/// The built-in kinds are the ones the graph derives relationships for.
/// Configuration may introduce further kinds (e.g. `lore`, `item`), which are
/// classified and kept in the graph but take part in no reverse index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityKind {
    World,
    Campaign,
    Party,
    Location,
    Npc,
    Session,
    Quest,
    /// Configuration-defined kind.
    Custom(String),
}

impl EntityKind {
    /// Create a custom kind.
    pub fn custom(name: impl Into<String>) -> Self {
        EntityKind::Custom(name.into())
    }

    /// The lowercase name used in configuration files and logs.
    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::World => "world",
            EntityKind::Campaign => "campaign",
            EntityKind::Party => "party",
            EntityKind::Location => "location",
            EntityKind::Npc => "npc",
            EntityKind::Session => "session",
            EntityKind::Quest => "quest",
            EntityKind::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, EntityKind::Custom(_))
    }
}

impl FromStr for EntityKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let kind = match name.to_ascii_lowercase().as_str() {
            "" => return Err(ModelError::UnknownKind(s.to_string())),
            "world" => EntityKind::World,
            "campaign" => EntityKind::Campaign,
            "party" => EntityKind::Party,
            "location" => EntityKind::Location,
            "npc" => EntityKind::Npc,
            "session" => EntityKind::Session,
            "quest" => EntityKind::Quest,
            other => EntityKind::Custom(other.to_string()),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for EntityKind {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_from_path_is_stable() {
        let a = RecordId::from_source_path("4. World Almanac/NPCs/Theron Ashvale.md");
        let b = RecordId::from_source_path("4. World Almanac/NPCs/Theron Ashvale.md");
        let c = RecordId::from_source_path("4. World Almanac/NPCs/Seraphina.md");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("world".parse::<EntityKind>().unwrap(), EntityKind::World);
        assert_eq!(" NPC ".parse::<EntityKind>().unwrap(), EntityKind::Npc);
        assert_eq!(
            "lore".parse::<EntityKind>().unwrap(),
            EntityKind::custom("lore")
        );
        assert!("  ".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_kind_serde_as_string() {
        let json = serde_json::to_string(&EntityKind::Session).unwrap();
        assert_eq!(json, "\"session\"");

        let kind: EntityKind = serde_json::from_str("\"item\"").unwrap();
        assert_eq!(kind, EntityKind::custom("item"));
        assert!(kind.is_custom());
    }
}
