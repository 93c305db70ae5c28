//! Location hierarchy: walking parent links up to the owning world.

use compendium_model::EntityKind;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::resolution::ClassifiedRecord;

/// Classified records keyed by name.
pub type RecordsByName<'a> = HashMap<&'a str, &'a ClassifiedRecord>;

/// Index records by name. With duplicate names the last record wins; the graph
/// builder rejects duplicates before it gets here.
pub fn index_by_name(records: &[ClassifiedRecord]) -> RecordsByName<'_> {
    records.iter().map(|r| (r.name(), r)).collect()
}

/// Find the world a record's location chain ends at.
///
/// Follows `location_ref` links from `start`. Returns the last record's name if
/// the chain ends at a world, and `None` if it ends anywhere else, points at a
/// missing record, or loops.
pub fn resolve_world_root(start: &str, records_by_name: &RecordsByName<'_>) -> Option<String> {
    WorldResolver::new(records_by_name)
        .resolve(start)
        .map(str::to_string)
}

/// Memoizing world resolver used during a graph build.
///
/// The answer for a record depends only on that record, so every name visited
/// on a walk is cached with the walk's result.
pub struct WorldResolver<'a, 'm> {
    by_name: &'m RecordsByName<'a>,
    cache: HashMap<&'a str, Option<&'a str>>,
}

impl<'a, 'm> WorldResolver<'a, 'm> {
    pub fn new(by_name: &'m RecordsByName<'a>) -> Self {
        Self {
            by_name,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, start: &str) -> Option<&'a str> {
        let mut current = *self.by_name.get(start)?;
        let mut visited: Vec<&'a str> = Vec::new();
        let mut seen: HashSet<&'a str> = HashSet::new();

        let result = loop {
            let name = current.record.name.as_str();
            if let Some(cached) = self.cache.get(name) {
                break *cached;
            }
            if !seen.insert(name) {
                warn!(start, at = name, "location chain loops, no world resolved");
                break None;
            }
            visited.push(name);

            let Some(parent) = current.refs.location_ref.as_deref() else {
                break (current.kind == EntityKind::World).then_some(name);
            };
            match self.by_name.get(parent) {
                Some(next) => current = *next,
                None => {
                    debug!(record = name, parent, "location chain points at a missing record");
                    break None;
                }
            }
        };

        for name in visited {
            self.cache.insert(name, result);
        }
        result
    }
}
