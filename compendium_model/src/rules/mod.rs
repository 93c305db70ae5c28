//! Classification rules: which notes count as which entity kind.
//!
//! A [`RuleSet`] is an explicit ordered list of `(kind, rule)` pairs. Order is
//! part of the configuration: the classifier assigns a record to the first
//! kind whose rule matches, so more specific rules must come first.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::entities::{ContentRecord, EntityKind, Metadata};
use crate::error::ModelResult;

/// Fine-grained test over a record's metadata.
///
/// Used to tell apart notes that share tags and folders, such as a generic
/// item note and a structured game item with stat fields.
#[derive(Clone)]
pub struct MetadataPredicate(Arc<dyn Fn(&Metadata) -> bool + Send + Sync>);

impl MetadataPredicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Metadata) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn test(&self, metadata: &Metadata) -> bool {
        (self.0)(metadata)
    }
}

impl std::fmt::Debug for MetadataPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MetadataPredicate(..)")
    }
}

/// Matching conditions for one entity kind.
///
/// Within a field the entries are alternatives (any one suffices); across
/// fields every non-empty condition must hold. An empty include list always
/// passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRule {
    pub include_tags: Vec<String>,

    /// Path fragments; a record matches when its source path contains one.
    pub include_paths: Vec<String>,

    pub exclude_tags: Vec<String>,

    pub exclude_paths: Vec<String>,

    /// Metadata keys that must all be present with a non-null value.
    pub require_metadata: Vec<String>,

    #[serde(skip)]
    pub extra_predicate: Option<MetadataPredicate>,
}

impl ClassificationRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_tag(mut self, tag: impl Into<String>) -> Self {
        self.include_tags.push(tag.into());
        self
    }

    pub fn include_path(mut self, path: impl Into<String>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    pub fn exclude_tag(mut self, tag: impl Into<String>) -> Self {
        self.exclude_tags.push(tag.into());
        self
    }

    pub fn exclude_path(mut self, path: impl Into<String>) -> Self {
        self.exclude_paths.push(path.into());
        self
    }

    pub fn require_key(mut self, key: impl Into<String>) -> Self {
        self.require_metadata.push(key.into());
        self
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Metadata) -> bool + Send + Sync + 'static,
    {
        self.extra_predicate = Some(MetadataPredicate::new(predicate));
        self
    }

    /// Check whether a record satisfies this rule.
    pub fn matches(&self, record: &ContentRecord) -> bool {
        let tag_match = self.include_tags.is_empty()
            || self.include_tags.iter().any(|tag| record.has_tag(tag));

        let path_match = self.include_paths.is_empty()
            || self
                .include_paths
                .iter()
                .any(|p| record.source_path.contains(p.as_str()));

        let excluded_by_tag = self.exclude_tags.iter().any(|tag| record.has_tag(tag));

        let excluded_by_path = self
            .exclude_paths
            .iter()
            .any(|p| record.source_path.contains(p.as_str()));

        let required_present = self
            .require_metadata
            .iter()
            .all(|key| record.metadata.contains_key(key));

        let predicate_passes = self
            .extra_predicate
            .as_ref()
            .map_or(true, |p| p.test(&record.metadata));

        tag_match
            && path_match
            && !excluded_by_tag
            && !excluded_by_path
            && required_present
            && predicate_passes
    }
}

/// One entry of a rule file. Unknown keys are rejected so a misspelled
/// condition cannot silently widen a rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    kind: EntityKind,
    #[serde(default)]
    include_tags: Vec<String>,
    #[serde(default)]
    include_paths: Vec<String>,
    #[serde(default)]
    exclude_tags: Vec<String>,
    #[serde(default)]
    exclude_paths: Vec<String>,
    #[serde(default)]
    require_metadata: Vec<String>,
}

impl RuleEntry {
    fn into_rule(self) -> (EntityKind, ClassificationRule) {
        let rule = ClassificationRule {
            include_tags: self.include_tags,
            include_paths: self.include_paths,
            exclude_tags: self.exclude_tags,
            exclude_paths: self.exclude_paths,
            require_metadata: self.require_metadata,
            extra_predicate: None,
        };
        (self.kind, rule)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

/// Ordered classification configuration.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<(EntityKind, ClassificationRule)>,
}

impl RuleSet {
    /// Create an empty rule set. Every record stays unclassified.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Later rules only apply when no earlier rule matched.
    pub fn with_rule(mut self, kind: EntityKind, rule: ClassificationRule) -> Self {
        self.push(kind, rule);
        self
    }

    pub fn push(&mut self, kind: EntityKind, rule: ClassificationRule) {
        self.rules.push((kind, rule));
    }

    /// Attach a metadata predicate to every rule for `kind`.
    ///
    /// Predicates cannot be written in rule files, so a loaded configuration
    /// is completed in code this way.
    pub fn with_predicate<F>(mut self, kind: &EntityKind, predicate: F) -> Self
    where
        F: Fn(&Metadata) -> bool + Send + Sync + 'static,
    {
        let predicate = MetadataPredicate::new(predicate);
        for (rule_kind, rule) in &mut self.rules {
            if rule_kind == kind {
                rule.extra_predicate = Some(predicate.clone());
            }
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKind, &ClassificationRule)> {
        self.rules.iter().map(|(kind, rule)| (kind, rule))
    }

    /// The first rule configured for `kind`.
    pub fn rule_for(&self, kind: &EntityKind) -> Option<&ClassificationRule> {
        self.rules
            .iter()
            .find(|(rule_kind, _)| rule_kind == kind)
            .map(|(_, rule)| rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parse a rule set from TOML (`[[rules]]` tables, in priority order).
    pub fn from_toml_str(input: &str) -> ModelResult<Self> {
        let file: RuleFile = toml::from_str(input)?;
        Ok(Self {
            rules: file.rules.into_iter().map(RuleEntry::into_rule).collect(),
        })
    }

    /// Load a rule set from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl Default for RuleSet {
    /// The vault layout the compendium was built for.
    fn default() -> Self {
        RuleSet::new()
            .with_rule(
                EntityKind::Campaign,
                ClassificationRule::new()
                    .include_tag("campaign")
                    .include_path("1. DM Stuff/Campaigns/"),
            )
            .with_rule(
                EntityKind::Party,
                ClassificationRule::new()
                    .include_tag("party")
                    .include_path("3. The Party/Parties/"),
            )
            .with_rule(
                EntityKind::Session,
                ClassificationRule::new()
                    .include_tag("session-journal")
                    .include_path("1. DM Stuff/Session Journals/"),
            )
            .with_rule(
                EntityKind::World,
                ClassificationRule::new()
                    .include_tag("world")
                    .include_path("4. World Almanac/Worlds/"),
            )
            .with_rule(
                EntityKind::Npc,
                ClassificationRule::new()
                    .include_tag("npc")
                    .include_path("4. World Almanac/NPCs/"),
            )
            .with_rule(
                EntityKind::Location,
                ClassificationRule::new()
                    .include_tag("location")
                    .exclude_tag("world")
                    .include_path("4. World Almanac/Settlements/")
                    .include_path("4. World Almanac/Places of Interest/")
                    .include_path("4. World Almanac/Regions/"),
            )
            .with_rule(
                EntityKind::Quest,
                ClassificationRule::new()
                    .include_tag("quest")
                    .include_path("3. The Party/Quests/"),
            )
    }
}
