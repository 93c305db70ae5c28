//! Per-record resolution: link parsing, classification and normalization.
//!
//! Everything here is a pure function of one record and the rule set, so it
//! can run over records in any order and in parallel.

mod classify;
mod normalize;
mod reference;

pub use classify::*;
pub use normalize::*;
pub use reference::*;
