//! Content graph - classified records plus every derived reverse relationship.
//!
//! The graph is built in one batch pass:
//! 1. **Accumulate**: every record pushes its id onto the reverse lists of the
//!    names it references (a campaign onto its world's campaigns, an NPC onto
//!    its location's NPCs, ...)
//! 2. **Attach**: every record receives the lists keyed by its own name that
//!    are relevant to its kind
//!
//! Lists keep scan order, so rebuilding from the same records always yields
//! the same graph.

mod hierarchy;
mod reverse;

pub use hierarchy::*;
pub use reverse::*;

use compendium_model::{EntityKind, RecordId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::resolution::{quest_statuses, ClassifiedRecord, QuestStatus};

/// One classified record with its attached reverse relationships.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub record: ClassifiedRecord,

    /// Reverse lists keyed by this record's name, for the kinds relevant to it.
    pub relations: BTreeMap<ReverseIndexKind, Vec<RecordId>>,

    /// Owning world of a location.
    pub world: Option<String>,
}

impl GraphNode {
    pub fn id(&self) -> RecordId {
        self.record.id()
    }

    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn kind(&self) -> &EntityKind {
        &self.record.kind
    }

    /// An attached reverse list, empty if not relevant to this kind.
    pub fn related(&self, kind: ReverseIndexKind) -> &[RecordId] {
        self.relations
            .get(&kind)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }
}

/// The immutable, fully cross-linked content graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<RecordId, usize>,
    reverse: ReverseIndex,
}

impl Graph {
    /// Reverse list of `kind` for the record called `name`; empty if absent.
    pub fn get_reverse(&self, kind: ReverseIndexKind, name: &str) -> &[RecordId] {
        self.reverse.get(kind, name)
    }

    pub fn reverse_index(&self) -> &ReverseIndex {
        &self.reverse
    }

    pub fn node(&self, id: RecordId) -> Option<&GraphNode> {
        self.by_id.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_by_name(&self, name: &str) -> Option<&GraphNode> {
        self.by_name.get(name).map(|&i| &self.nodes[i])
    }

    /// All nodes in scan order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn nodes_of_kind<'a>(&'a self, kind: &'a EntityKind) -> impl Iterator<Item = &'a GraphNode> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    /// Look up nodes for a list of ids, skipping unknown ones.
    pub fn resolve_ids<'a, 'i>(
        &'a self,
        ids: &'i [RecordId],
    ) -> impl Iterator<Item = &'a GraphNode> + 'i
    where
        'a: 'i,
    {
        ids.iter().filter_map(move |id| self.node(*id))
    }

    /// The world a record belongs to.
    ///
    /// Locations use their resolved world; NPCs inherit the world of their
    /// location when it has one; everything else uses its explicit world link.
    pub fn world_of(&self, name: &str) -> Option<&str> {
        let node = self.node_by_name(name)?;
        match node.kind() {
            EntityKind::Location => node.world.as_deref(),
            EntityKind::Npc => node
                .record
                .refs
                .location_ref
                .as_deref()
                .and_then(|loc| self.node_by_name(loc))
                .and_then(|loc| loc.world.as_deref())
                .or(node.record.refs.world_ref.as_deref()),
            _ => node.record.refs.world_ref.as_deref(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build the graph from classified records.
///
/// Dangling references and broken location chains are tolerated. Two records
/// sharing a name or an id fail the build; names are the join keys and ids
/// key every reverse list.
pub fn build_graph(classified: Vec<ClassifiedRecord>) -> GraphResult<Graph> {
    let mut by_name: HashMap<String, usize> = HashMap::with_capacity(classified.len());
    let mut by_id: HashMap<RecordId, usize> = HashMap::with_capacity(classified.len());

    for (i, record) in classified.iter().enumerate() {
        if let Some(&first) = by_name.get(record.name()) {
            return Err(GraphError::DuplicateName {
                name: record.name().to_string(),
                first: classified[first].id(),
                second: record.id(),
            });
        }
        if let Some(&first) = by_id.get(&record.id()) {
            return Err(GraphError::DuplicateId {
                id: record.id(),
                first: classified[first].name().to_string(),
                second: record.name().to_string(),
            });
        }
        by_name.insert(record.name().to_string(), i);
        by_id.insert(record.id(), i);
    }

    let (reverse, worlds) = accumulate(&classified);

    let nodes: Vec<GraphNode> = classified
        .into_iter()
        .zip(worlds)
        .map(|(record, world)| {
            let relations = ReverseIndexKind::attached_to(&record.kind)
                .iter()
                .map(|&kind| (kind, reverse.get(kind, record.name()).to_vec()))
                .collect();
            GraphNode {
                record,
                relations,
                world,
            }
        })
        .collect();

    info!(
        records = nodes.len(),
        world_locations = reverse.entry_count(ReverseIndexKind::WorldLocations),
        location_npcs = reverse.entry_count(ReverseIndexKind::LocationNpcs),
        party_sessions = reverse.entry_count(ReverseIndexKind::PartySessions),
        "content graph built"
    );

    Ok(Graph {
        nodes,
        by_name,
        by_id,
        reverse,
    })
}

/// Accumulate phase: one scan over all records in order.
///
/// Also returns the resolved world of each record (only locations get one).
fn accumulate(records: &[ClassifiedRecord]) -> (ReverseIndex, Vec<Option<String>>) {
    let by_name = index_by_name(records);
    let mut resolver = WorldResolver::new(&by_name);
    let mut reverse = ReverseIndex::new();
    let mut worlds = Vec::with_capacity(records.len());

    for record in records {
        let id = record.id();
        let refs = &record.refs;
        let mut world = None;

        match record.kind {
            EntityKind::Campaign => {
                if let Some(w) = &refs.world_ref {
                    reverse.push(ReverseIndexKind::WorldCampaigns, w, id);
                }
                for party in &refs.party_refs {
                    reverse.push(ReverseIndexKind::PartyCampaigns, party, id);
                }
            }
            EntityKind::Location => {
                if let Some(parent) = &refs.location_ref {
                    reverse.push(ReverseIndexKind::LocationChildren, parent, id);
                }
                world = resolver
                    .resolve(record.name())
                    .map(str::to_string)
                    .or_else(|| refs.world_ref.clone());
                match &world {
                    Some(w) => {
                        reverse.push(ReverseIndexKind::WorldLocations, w, id);
                    }
                    None => debug!(location = record.name(), "location belongs to no world"),
                }
            }
            EntityKind::Npc => {
                if let Some(location) = &refs.location_ref {
                    reverse.push(ReverseIndexKind::LocationNpcs, location, id);
                }
            }
            EntityKind::Session => {
                for party in &refs.party_refs {
                    reverse.push(ReverseIndexKind::PartySessions, party, id);
                }
            }
            EntityKind::Quest => {
                for (party, status) in quest_statuses(&record.record.metadata) {
                    let kind = match status {
                        QuestStatus::Active => ReverseIndexKind::PartyActiveQuests,
                        QuestStatus::Completed => ReverseIndexKind::PartyCompletedQuests,
                    };
                    reverse.push(kind, &party, id);
                }
            }
            EntityKind::World | EntityKind::Party | EntityKind::Custom(_) => {}
        }

        worlds.push(world);
    }

    (reverse, worlds)
}
