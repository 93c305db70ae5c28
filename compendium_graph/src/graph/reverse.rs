//! Reverse indices: referenced name -> ids of the records pointing at it.

use compendium_model::{EntityKind, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// The derived relationships the graph maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReverseIndexKind {
    /// World -> campaigns set in it.
    #[serde(rename = "campaigns")]
    WorldCampaigns,
    /// World -> every location whose parent chain ends at it.
    #[serde(rename = "locations")]
    WorldLocations,
    /// Location -> locations directly inside it.
    #[serde(rename = "children")]
    LocationChildren,
    /// Location -> NPCs found there.
    #[serde(rename = "npcs")]
    LocationNpcs,
    /// Party -> campaigns it plays in.
    #[serde(rename = "party_campaigns")]
    PartyCampaigns,
    #[serde(rename = "sessions")]
    PartySessions,
    #[serde(rename = "active_quests")]
    PartyActiveQuests,
    #[serde(rename = "completed_quests")]
    PartyCompletedQuests,
}

impl ReverseIndexKind {
    pub const ALL: [ReverseIndexKind; 8] = [
        ReverseIndexKind::WorldCampaigns,
        ReverseIndexKind::WorldLocations,
        ReverseIndexKind::LocationChildren,
        ReverseIndexKind::LocationNpcs,
        ReverseIndexKind::PartyCampaigns,
        ReverseIndexKind::PartySessions,
        ReverseIndexKind::PartyActiveQuests,
        ReverseIndexKind::PartyCompletedQuests,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReverseIndexKind::WorldCampaigns => "campaigns",
            ReverseIndexKind::WorldLocations => "locations",
            ReverseIndexKind::LocationChildren => "children",
            ReverseIndexKind::LocationNpcs => "npcs",
            ReverseIndexKind::PartyCampaigns => "party_campaigns",
            ReverseIndexKind::PartySessions => "sessions",
            ReverseIndexKind::PartyActiveQuests => "active_quests",
            ReverseIndexKind::PartyCompletedQuests => "completed_quests",
        }
    }

    /// Kind of the record the lists are keyed by.
    pub fn owner_kind(&self) -> EntityKind {
        match self {
            ReverseIndexKind::WorldCampaigns | ReverseIndexKind::WorldLocations => {
                EntityKind::World
            }
            ReverseIndexKind::LocationChildren | ReverseIndexKind::LocationNpcs => {
                EntityKind::Location
            }
            ReverseIndexKind::PartyCampaigns
            | ReverseIndexKind::PartySessions
            | ReverseIndexKind::PartyActiveQuests
            | ReverseIndexKind::PartyCompletedQuests => EntityKind::Party,
        }
    }

    /// Kind of the records listed.
    pub fn member_kind(&self) -> EntityKind {
        match self {
            ReverseIndexKind::WorldCampaigns | ReverseIndexKind::PartyCampaigns => {
                EntityKind::Campaign
            }
            ReverseIndexKind::WorldLocations | ReverseIndexKind::LocationChildren => {
                EntityKind::Location
            }
            ReverseIndexKind::LocationNpcs => EntityKind::Npc,
            ReverseIndexKind::PartySessions => EntityKind::Session,
            ReverseIndexKind::PartyActiveQuests | ReverseIndexKind::PartyCompletedQuests => {
                EntityKind::Quest
            }
        }
    }

    /// The reverse lists attached to a record of `kind`.
    pub fn attached_to(kind: &EntityKind) -> &'static [ReverseIndexKind] {
        match kind {
            EntityKind::World => &[
                ReverseIndexKind::WorldCampaigns,
                ReverseIndexKind::WorldLocations,
            ],
            EntityKind::Location => &[
                ReverseIndexKind::LocationChildren,
                ReverseIndexKind::LocationNpcs,
            ],
            EntityKind::Party => &[
                ReverseIndexKind::PartyCampaigns,
                ReverseIndexKind::PartySessions,
                ReverseIndexKind::PartyActiveQuests,
                ReverseIndexKind::PartyCompletedQuests,
            ],
            _ => &[],
        }
    }
}

impl FromStr for ReverseIndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReverseIndexKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("unknown reverse index: {s:?}"))
    }
}

impl std::fmt::Display for ReverseIndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated reverse lists for every index kind.
///
/// Lists keep insertion order, and an id is never pushed twice onto the same
/// list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReverseIndex {
    lists: HashMap<ReverseIndexKind, HashMap<String, Vec<RecordId>>>,
}

impl ReverseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` to the list of `kind` keyed by `name`.
    ///
    /// Returns `false` if the id was already listed.
    pub fn push(&mut self, kind: ReverseIndexKind, name: &str, id: RecordId) -> bool {
        let list = self
            .lists
            .entry(kind)
            .or_default()
            .entry(name.to_string())
            .or_default();

        if list.contains(&id) {
            false
        } else {
            list.push(id);
            true
        }
    }

    /// The list for `name`, empty if nothing references it.
    pub fn get(&self, kind: ReverseIndexKind, name: &str) -> &[RecordId] {
        self.lists
            .get(&kind)
            .and_then(|by_name| by_name.get(name))
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Names with a non-empty list for `kind`.
    pub fn names(&self, kind: ReverseIndexKind) -> impl Iterator<Item = &str> {
        self.lists
            .get(&kind)
            .into_iter()
            .flat_map(|by_name| by_name.keys().map(String::as_str))
    }

    /// Total number of ids listed under `kind`.
    pub fn entry_count(&self, kind: ReverseIndexKind) -> usize {
        self.lists
            .get(&kind)
            .map(|by_name| by_name.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}
