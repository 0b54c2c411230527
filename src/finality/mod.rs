//! Finality module: vote aggregation and in-order height finalization.
//!
//! Public surface:
//! - FinalityTracker: tallies candidate votes, finalizes heights at quorum
//! - FinalitySnapshot: owned view of the chain and the pending tally
//! - types: height/id aliases and defaults

pub mod tracker;
pub mod types;

pub use tracker::{FinalitySnapshot, FinalityTracker};
pub use types::{BlockId, Height};
