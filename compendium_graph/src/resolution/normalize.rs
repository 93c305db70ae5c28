//! Relationship normalization: raw frontmatter links to forward references.

use compendium_model::{
    ContentRecord, Metadata, LOCATION_KEY, PARTY_KEY, PARTY_RELATIONSHIPS_KEY, WORLD_KEY,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::parse_reference;

const ACTIVE_STATUS: &str = "active";
const COMPLETED_STATUS: &str = "completed";

/// Normalized forward references of one record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct References {
    pub world_ref: Option<String>,

    /// Parent location for locations, current location for NPCs.
    pub location_ref: Option<String>,

    /// Ordered, without duplicates.
    pub party_refs: Vec<String>,
}

impl References {
    pub fn has_party(&self, party: &str) -> bool {
        self.party_refs.iter().any(|p| p == party)
    }

    /// Check whether two records share at least one party.
    pub fn shares_party_with(&self, parties: &[String]) -> bool {
        self.party_refs.iter().any(|p| parties.contains(p))
    }
}

/// Read a record's forward references.
///
/// A single `party` link wins over `partyRelationships`; a `party` field that
/// does not parse falls back to the relationship map. Every relationship key is
/// parsed as a link, so `[[Heroes]]` and `Heroes` join to the same party.
pub fn normalize(record: &ContentRecord) -> References {
    let metadata = &record.metadata;

    let party_refs = match reference_field(record, PARTY_KEY) {
        Some(party) => vec![party],
        None => relationship_parties(metadata),
    };

    References {
        world_ref: reference_field(record, WORLD_KEY),
        location_ref: reference_field(record, LOCATION_KEY),
        party_refs,
    }
}

fn reference_field(record: &ContentRecord, key: &str) -> Option<String> {
    let metadata = &record.metadata;
    if metadata.contains_key(key) && metadata.get_str(key).is_none() {
        debug!(record = %record.name, field = key, "reference field has no readable link");
    }
    parse_reference(metadata.get_str(key))
}

/// Progress of a quest for one party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestStatus {
    Active,
    Completed,
}

impl QuestStatus {
    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case(ACTIVE_STATUS) {
            Some(QuestStatus::Active)
        } else if label.eq_ignore_ascii_case(COMPLETED_STATUS) {
            Some(QuestStatus::Completed)
        } else {
            None
        }
    }
}

/// One `partyRelationships` entry, after telling the two layouts apart.
enum Relationship<'m> {
    /// `active: {"[[Heroes]]": true}`: parties grouped under a status.
    Grouped(QuestStatus, &'m Map<String, Value>),
    /// `"[[Heroes]]": ...`: one party with its own value.
    Party(&'m str, &'m Value),
}

fn relationships(metadata: &Metadata) -> Vec<Relationship<'_>> {
    let Some(map) = metadata.get_map(PARTY_RELATIONSHIPS_KEY) else {
        return Vec::new();
    };

    map.iter()
        .map(|(key, value)| match (QuestStatus::from_label(key), value) {
            (Some(status), Value::Object(parties)) => Relationship::Grouped(status, parties),
            _ => Relationship::Party(key.as_str(), value),
        })
        .collect()
}

fn relationship_parties(metadata: &Metadata) -> Vec<String> {
    let mut parties: Vec<String> = Vec::new();
    let mut add = |key: &str| {
        if let Some(party) = parse_reference(Some(key)) {
            if !parties.contains(&party) {
                parties.push(party);
            }
        }
    };

    for relationship in relationships(metadata) {
        match relationship {
            Relationship::Grouped(_, group) => group.keys().for_each(|key| add(key.as_str())),
            Relationship::Party(key, _) => add(key),
        }
    }
    parties
}

/// Read per-party quest progress from `partyRelationships`.
///
/// Two layouts are accepted, and may be mixed:
/// - grouped: `active: {"[[Heroes]]": true}`, `completed: {...}`; entries
///   whose value is `true` count
/// - per party: `"[[Heroes]]": {active: true}` or `"[[Heroes]]": "completed"`
///
/// Any other value only records membership.
pub fn quest_statuses(metadata: &Metadata) -> Vec<(String, QuestStatus)> {
    let mut statuses: Vec<(String, QuestStatus)> = Vec::new();
    let mut add = |key: &str, status: QuestStatus| {
        if let Some(party) = parse_reference(Some(key)) {
            let entry = (party, status);
            if !statuses.contains(&entry) {
                statuses.push(entry);
            }
        }
    };

    for relationship in relationships(metadata) {
        match relationship {
            Relationship::Grouped(status, group) => {
                for (key, flag) in group {
                    if flag == &Value::Bool(true) {
                        add(key.as_str(), status);
                    }
                }
            }
            Relationship::Party(key, value) => {
                for status in statuses_of(value) {
                    add(key, status);
                }
            }
        }
    }
    statuses
}

fn statuses_of(value: &Value) -> Vec<QuestStatus> {
    match value {
        Value::Object(flags) => {
            let mut found = Vec::new();
            if flags.get(ACTIVE_STATUS) == Some(&Value::Bool(true)) {
                found.push(QuestStatus::Active);
            }
            if flags.get(COMPLETED_STATUS) == Some(&Value::Bool(true)) {
                found.push(QuestStatus::Completed);
            }
            found
        }
        Value::String(s) => QuestStatus::from_label(s).into_iter().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_world_and_location_refs() {
        let record = ContentRecord::new("The Shattered Crown")
            .with_field("world", "[[Worlds/Vaeltharis|the world]]")
            .with_field("location", "Mistport.md");

        let refs = normalize(&record);
        assert_eq!(refs.world_ref.as_deref(), Some("Vaeltharis"));
        assert_eq!(refs.location_ref.as_deref(), Some("Mistport"));
        assert!(refs.party_refs.is_empty());
    }

    #[test]
    fn test_single_party_wins() {
        let record = ContentRecord::new("Session-24")
            .with_field("party", "[[Heroes]]")
            .with_field("partyRelationships", json!({"[[Zephyr Company]]": true}));

        assert_eq!(normalize(&record).party_refs, vec!["Heroes".to_string()]);
    }

    #[test]
    fn test_relationship_keys_are_parsed_and_deduplicated() {
        let record = ContentRecord::new("The Sunken Vault").with_field(
            "partyRelationships",
            json!({
                "[[Parties/Heroes|The Heroes]]": {"active": true},
                "Zephyr Company": true,
                "Heroes": "completed",
                "[[]]": true
            }),
        );

        assert_eq!(
            normalize(&record).party_refs,
            vec!["Heroes".to_string(), "Zephyr Company".to_string()]
        );
    }

    #[test]
    fn test_unparseable_party_falls_back() {
        let record = ContentRecord::new("Theron Ashvale")
            .with_field("party", "[[]]")
            .with_field("partyRelationships", json!({"[[Heroes]]": true}));

        assert_eq!(normalize(&record).party_refs, vec!["Heroes".to_string()]);
    }

    #[test]
    fn test_non_map_relationships_ignored() {
        let record = ContentRecord::new("Odd").with_field("partyRelationships", "[[Heroes]]");
        assert!(normalize(&record).party_refs.is_empty());
    }

    #[test]
    fn test_quest_statuses() {
        let metadata = Metadata::new().with(
            "partyRelationships",
            json!({
                "[[Heroes]]": {"active": true, "completed": false},
                "[[Zephyr Company]]": "Completed",
                "[[Wanderers]]": true,
                "[[Heroes|again]]": {"active": true}
            }),
        );

        assert_eq!(
            quest_statuses(&metadata),
            vec![
                ("Heroes".to_string(), QuestStatus::Active),
                ("Zephyr Company".to_string(), QuestStatus::Completed),
            ]
        );
    }

    #[test]
    fn test_grouped_quest_statuses() {
        let metadata = Metadata::new().with(
            "partyRelationships",
            json!({
                "active": {"[[Heroes]]": true, "[[Wanderers]]": false},
                "completed": {"[[Zephyr Company]]": true}
            }),
        );

        assert_eq!(
            quest_statuses(&metadata),
            vec![
                ("Heroes".to_string(), QuestStatus::Active),
                ("Zephyr Company".to_string(), QuestStatus::Completed),
            ]
        );
    }

    #[test]
    fn test_grouped_relationship_keys_are_parties() {
        let record = ContentRecord::new("The Sunken Vault").with_field(
            "partyRelationships",
            json!({
                "active": {"[[Heroes]]": true, "[[Wanderers]]": false},
                "completed": {"[[Zephyr Company]]": true, "[[Heroes]]": true}
            }),
        );

        assert_eq!(
            normalize(&record).party_refs,
            vec![
                "Heroes".to_string(),
                "Wanderers".to_string(),
                "Zephyr Company".to_string()
            ]
        );
    }

    #[test]
    fn test_status_named_key_without_group_is_a_party() {
        let record = ContentRecord::new("Odd Quest")
            .with_field("partyRelationships", json!({"[[Active]]": true}));

        assert_eq!(normalize(&record).party_refs, vec!["Active".to_string()]);
        assert!(quest_statuses(&record.metadata).is_empty());
    }

    #[test]
    fn test_unquoted_link_in_yaml_list() {
        // `location: [[Mistport]]` written without quotes reads as a nested list
        let record = ContentRecord::new("Theron Ashvale")
            .with_field("location", json!([["Mistport"]]))
            .with_field("world", json!({"name": "Vaeltharis"}));

        let refs = normalize(&record);
        assert_eq!(refs.location_ref.as_deref(), Some("Mistport"));
        assert_eq!(refs.world_ref, None);
    }

    #[test]
    fn test_references_helpers() {
        let refs = References {
            party_refs: vec!["Heroes".to_string()],
            ..Default::default()
        };
        assert!(refs.has_party("Heroes"));
        assert!(refs.shares_party_with(&["Zephyr Company".to_string(), "Heroes".to_string()]));
        assert!(!refs.shares_party_with(&[]));
    }
}
