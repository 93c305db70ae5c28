//! Error types for graph construction.

use compendium_model::{ModelError, RecordId};

/// Fatal graph-build errors.
///
/// Malformed content never shows up here: dangling references, cycles and
/// unparseable links all degrade to "no relationship". Only a broken join key
/// or record id stops the build.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate record name {name:?} (records {first} and {second})")]
    DuplicateName {
        name: String,
        first: RecordId,
        second: RecordId,
    },

    #[error("duplicate record id {id} (records {first:?} and {second:?})")]
    DuplicateId {
        id: RecordId,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type GraphResult<T> = Result<T, GraphError>;
