//! Entity classification - first matching rule wins.

use compendium_model::{ContentRecord, EntityKind, RecordId, RuleSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{normalize, References};

/// A record with its entity kind and normalized forward references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub record: ContentRecord,
    pub kind: EntityKind,
    pub refs: References,
}

impl ClassifiedRecord {
    pub fn id(&self) -> RecordId {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn is(&self, kind: &EntityKind) -> bool {
        &self.kind == kind
    }
}

/// Decide which kind a record belongs to.
///
/// Rules are tried in configured order and the first match wins. A record
/// matching several rules is still classified, with a warning, since that
/// usually means two rules overlap by mistake.
pub fn classify(record: &ContentRecord, rules: &RuleSet) -> Option<EntityKind> {
    let mut matching = rules
        .iter()
        .filter(|(_, rule)| rule.matches(record))
        .map(|(kind, _)| kind);

    let first = matching.next()?;
    let also: Vec<&str> = matching
        .filter(|kind| *kind != first)
        .map(EntityKind::as_str)
        .collect();

    if !also.is_empty() {
        warn!(
            record = %record.name,
            path = %record.source_path,
            kind = %first,
            also_matched = ?also,
            "record matches several classification rules, keeping the first"
        );
    }

    Some(first.clone())
}

/// Classify and normalize one record. `None` if no rule matches.
pub fn classify_record(record: ContentRecord, rules: &RuleSet) -> Option<ClassifiedRecord> {
    let Some(kind) = classify(&record, rules) else {
        debug!(record = %record.name, path = %record.source_path, "record left unclassified");
        return None;
    };
    let refs = normalize(&record);
    Some(ClassifiedRecord { record, kind, refs })
}

/// Classify a whole record set in parallel, keeping input order.
///
/// Unclassified records are dropped; they take no part in the graph.
pub fn classify_all(records: Vec<ContentRecord>, rules: &RuleSet) -> Vec<ClassifiedRecord> {
    records
        .into_par_iter()
        .filter_map(|record| classify_record(record, rules))
        .collect()
}
