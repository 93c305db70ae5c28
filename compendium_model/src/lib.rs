//! # Compendium Model
//!
//! The data side of the campaign compendium: content records as they come out
//! of a notes vault, the entity kinds they can be classified into, the ordered
//! classification rule configuration, and the content sources that produce
//! records. This crate holds no graph logic.

pub mod content_store;
pub mod entities;
pub mod error;
pub mod rules;

pub use content_store::*;
pub use entities::*;
pub use error::*;
pub use rules::*;
