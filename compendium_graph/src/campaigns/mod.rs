//! Campaign partitioning - splitting one vault into per-campaign subgraphs.
//!
//! Several campaigns can share a vault. Each campaign claims the records it
//! is built from:
//! 1. its world and every location under that world, with their NPCs
//! 2. its parties, with their sessions and quests
//! 3. NPCs, sessions and quests linked to one of its parties or to its world
//!
//! A record claimed by several campaigns goes to the first of them in scan
//! order, so the subgraphs are disjoint.

use compendium_model::{EntityKind, RecordId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::graph::{Graph, GraphNode, ReverseIndexKind};
use crate::resolution::slugify;

/// The records hosted under one campaign.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignSubgraph {
    pub campaign: RecordId,
    pub name: String,
    pub slug: String,
    pub world: Option<String>,
    pub parties: Vec<String>,

    /// Member ids in graph scan order, the campaign itself included.
    pub members: Vec<RecordId>,
}

impl CampaignSubgraph {
    pub fn contains(&self, id: RecordId) -> bool {
        self.members.contains(&id)
    }

    /// Members of one kind, in scan order.
    pub fn members_of_kind<'g>(&self, graph: &'g Graph, kind: &EntityKind) -> Vec<&'g GraphNode> {
        graph
            .resolve_ids(&self.members)
            .filter(|node| node.kind() == kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A record more than one campaign wanted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContestedRecord {
    pub record: RecordId,
    /// Claiming campaigns in scan order; the first one owns the record.
    pub campaigns: Vec<RecordId>,
}

/// The result of splitting a graph by campaign.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CampaignPartition {
    pub campaigns: Vec<CampaignSubgraph>,
    pub contested: Vec<ContestedRecord>,

    /// Records no campaign claimed, in scan order.
    pub unassigned: Vec<RecordId>,
}

impl CampaignPartition {
    pub fn by_slug(&self, slug: &str) -> Option<&CampaignSubgraph> {
        self.campaigns.iter().find(|c| c.slug == slug)
    }

    /// The campaign a record was assigned to.
    pub fn campaign_of(&self, id: RecordId) -> Option<&CampaignSubgraph> {
        self.campaigns.iter().find(|c| c.contains(id))
    }
}

/// Split the graph into disjoint per-campaign subgraphs.
pub fn partition_campaigns(graph: &Graph) -> CampaignPartition {
    let campaigns: Vec<&GraphNode> = graph.nodes_of_kind(&EntityKind::Campaign).collect();

    // record -> indices of claiming campaigns, ascending
    let mut claims: HashMap<RecordId, Vec<usize>> = HashMap::new();
    for (index, campaign) in campaigns.iter().enumerate() {
        for id in claimed_by(graph, campaign) {
            claims.entry(id).or_default().push(index);
        }
    }

    let mut subgraphs: Vec<CampaignSubgraph> = campaigns
        .iter()
        .map(|campaign| CampaignSubgraph {
            campaign: campaign.id(),
            name: campaign.name().to_string(),
            slug: slugify(campaign.name()),
            world: campaign.record.refs.world_ref.clone(),
            parties: campaign.record.refs.party_refs.clone(),
            members: Vec::new(),
        })
        .collect();

    let mut partition = CampaignPartition::default();
    for node in graph.nodes() {
        let Some(claimants) = claims.get(&node.id()) else {
            partition.unassigned.push(node.id());
            continue;
        };

        let owner = claimants[0];
        subgraphs[owner].members.push(node.id());

        if claimants.len() > 1 {
            warn!(
                record = node.name(),
                owner = %subgraphs[owner].name,
                claimants = claimants.len(),
                "record claimed by several campaigns, keeping the first"
            );
            partition.contested.push(ContestedRecord {
                record: node.id(),
                campaigns: claimants.iter().map(|&i| campaigns[i].id()).collect(),
            });
        }
    }

    let mut slugs = HashSet::new();
    for subgraph in &subgraphs {
        if !slugs.insert(subgraph.slug.as_str()) {
            warn!(campaign = %subgraph.name, slug = %subgraph.slug, "campaign slug already in use");
        }
    }

    info!(
        campaigns = subgraphs.len(),
        contested = partition.contested.len(),
        unassigned = partition.unassigned.len(),
        "campaigns partitioned"
    );

    partition.campaigns = subgraphs;
    partition
}

/// Every record a campaign would host, ignoring other campaigns.
fn claimed_by(graph: &Graph, campaign: &GraphNode) -> HashSet<RecordId> {
    let refs = &campaign.record.refs;
    let world = refs.world_ref.as_deref();
    let parties = &refs.party_refs;

    let mut claimed = HashSet::new();
    claimed.insert(campaign.id());

    if let Some(world) = world {
        if let Some(node) = graph.node_by_name(world) {
            if node.kind() == &EntityKind::World {
                claimed.insert(node.id());
            }
        }
        for location in graph.resolve_ids(graph.get_reverse(ReverseIndexKind::WorldLocations, world)) {
            claimed.insert(location.id());
            claimed.extend(
                graph
                    .get_reverse(ReverseIndexKind::LocationNpcs, location.name())
                    .iter()
                    .copied(),
            );
        }
    }

    for party in parties {
        if let Some(node) = graph.node_by_name(party) {
            if node.kind() == &EntityKind::Party {
                claimed.insert(node.id());
            }
        }
        for kind in [
            ReverseIndexKind::PartySessions,
            ReverseIndexKind::PartyActiveQuests,
            ReverseIndexKind::PartyCompletedQuests,
        ] {
            claimed.extend(graph.get_reverse(kind, party).iter().copied());
        }
    }

    for node in graph.nodes() {
        let linkable = matches!(
            node.kind(),
            EntityKind::Npc | EntityKind::Session | EntityKind::Quest
        );
        if !linkable {
            continue;
        }
        let node_refs = &node.record.refs;
        let same_world = world.is_some() && node_refs.world_ref.as_deref() == world;
        if same_world || node_refs.shares_party_with(parties) {
            claimed.insert(node.id());
        }
    }

    claimed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::resolution::{ClassifiedRecord, References};
    use compendium_model::ContentRecord;

    fn record(name: &str, kind: EntityKind, refs: References) -> ClassifiedRecord {
        ClassifiedRecord {
            record: ContentRecord::new(name),
            kind,
            refs,
        }
    }

    fn campaign(name: &str, world: &str, party: &str) -> ClassifiedRecord {
        record(
            name,
            EntityKind::Campaign,
            References {
                world_ref: Some(world.to_string()),
                party_refs: vec![party.to_string()],
                ..Default::default()
            },
        )
    }

    fn located(name: &str, kind: EntityKind, location: &str) -> ClassifiedRecord {
        record(
            name,
            kind,
            References {
                location_ref: Some(location.to_string()),
                ..Default::default()
            },
        )
    }

    fn for_party(name: &str, kind: EntityKind, party: &str) -> ClassifiedRecord {
        record(
            name,
            kind,
            References {
                party_refs: vec![party.to_string()],
                ..Default::default()
            },
        )
    }

    fn two_campaign_graph() -> Graph {
        build_graph(vec![
            campaign("The Shattered Crown", "Vaeltharis", "Heroes"),
            campaign("Tides of Ash", "Ostmere", "Zephyr Company"),
            record("Vaeltharis", EntityKind::World, References::default()),
            record("Ostmere", EntityKind::World, References::default()),
            record("Heroes", EntityKind::Party, References::default()),
            record("Zephyr Company", EntityKind::Party, References::default()),
            located("Mistport", EntityKind::Location, "Vaeltharis"),
            located("Saltmarsh", EntityKind::Location, "Ostmere"),
            located("Theron Ashvale", EntityKind::Npc, "Mistport"),
            for_party("Session-24", EntityKind::Session, "Heroes"),
            for_party("Session-3", EntityKind::Session, "Zephyr Company"),
            record("Stray Note", EntityKind::custom("lore"), References::default()),
        ])
        .unwrap()
    }

    fn names(graph: &Graph, subgraph: &CampaignSubgraph) -> Vec<String> {
        graph
            .resolve_ids(&subgraph.members)
            .map(|n| n.name().to_string())
            .collect()
    }

    #[test]
    fn test_partition_two_campaigns() {
        let graph = two_campaign_graph();
        let partition = partition_campaigns(&graph);

        assert_eq!(partition.campaigns.len(), 2);
        assert!(partition.contested.is_empty());

        let crown = partition.by_slug("the-shattered-crown").unwrap();
        assert_eq!(
            names(&graph, crown),
            vec![
                "The Shattered Crown",
                "Vaeltharis",
                "Heroes",
                "Mistport",
                "Theron Ashvale",
                "Session-24"
            ]
        );

        let tides = partition.by_slug("tides-of-ash").unwrap();
        assert_eq!(
            names(&graph, tides),
            vec!["Tides of Ash", "Ostmere", "Zephyr Company", "Saltmarsh", "Session-3"]
        );

        let stray = graph.node_by_name("Stray Note").unwrap().id();
        assert_eq!(partition.unassigned, vec![stray]);
    }

    #[test]
    fn test_members_of_kind() {
        let graph = two_campaign_graph();
        let partition = partition_campaigns(&graph);
        let crown = partition.by_slug("the-shattered-crown").unwrap();

        let sessions = crown.members_of_kind(&graph, &EntityKind::Session);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].name(), "Session-24");

        let theron = graph.node_by_name("Theron Ashvale").unwrap().id();
        assert_eq!(partition.campaign_of(theron).unwrap().name, "The Shattered Crown");
    }

    #[test]
    fn test_shared_world_is_contested() {
        let graph = build_graph(vec![
            campaign("First Age", "Vaeltharis", "Heroes"),
            campaign("Second Age", "Vaeltharis", "Zephyr Company"),
            record("Vaeltharis", EntityKind::World, References::default()),
            located("Mistport", EntityKind::Location, "Vaeltharis"),
            for_party("Session-1", EntityKind::Session, "Zephyr Company"),
        ])
        .unwrap();
        let partition = partition_campaigns(&graph);

        let first = &partition.campaigns[0];
        let second = &partition.campaigns[1];
        let world = graph.node_by_name("Vaeltharis").unwrap().id();
        let mistport = graph.node_by_name("Mistport").unwrap().id();
        let session = graph.node_by_name("Session-1").unwrap().id();

        assert!(first.contains(world) && first.contains(mistport));
        assert!(!second.contains(world) && !second.contains(mistport));
        assert!(second.contains(session));

        let contested: Vec<_> = partition.contested.iter().map(|c| c.record).collect();
        assert_eq!(contested, vec![world, mistport]);
        assert_eq!(
            partition.contested[0].campaigns,
            vec![first.campaign, second.campaign]
        );
    }

    #[test]
    fn test_no_campaigns() {
        let graph = build_graph(vec![record(
            "Vaeltharis",
            EntityKind::World,
            References::default(),
        )])
        .unwrap();
        let partition = partition_campaigns(&graph);

        assert!(partition.campaigns.is_empty());
        assert_eq!(partition.unassigned.len(), 1);
    }
}
