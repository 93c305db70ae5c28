//! # Compendium Graph
//!
//! Turns a flat set of content records into a cross-linked content graph.
//! This crate reads records through `compendium_model`, classifies them by the
//! configured rules, normalizes their wiki-link references and derives every
//! reverse relationship the rendering side needs.
//!
//! ## Core Components
//!
//! - **resolution**: link parsing, entity classification, relationship normalization
//! - **graph**: location hierarchy, reverse indices and the built [`Graph`]
//! - **campaigns**: splitting one graph into per-campaign subgraphs
//!
//! Malformed content never aborts a build. Dangling links, cycles and
//! unparseable references degrade to "no relationship".

pub mod campaigns;
pub mod error;
pub mod graph;
pub mod resolution;

pub use campaigns::*;
pub use error::*;
pub use graph::*;
pub use resolution::*;

use compendium_model::{ContentSource, RuleSet};
use tracing::info;

/// List, classify and link every record of a source.
pub fn build_from_source(source: &impl ContentSource, rules: &RuleSet) -> GraphResult<Graph> {
    let records = source.list_records()?;
    let total = records.len();

    let classified = classify_all(records, rules);
    info!(
        records = total,
        classified = classified.len(),
        "records classified"
    );

    build_graph(classified)
}
