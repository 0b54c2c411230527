//! Quorus: in-memory block finality tracking.
//!
//! Votes arrive as (start_height, candidate sequence) batches; the element
//! aligned with the next pending height is tallied, and a candidate reaching
//! quorum is appended to the finalized chain, strictly in height order.

pub mod finality;
pub mod node;
pub mod utils;

pub use finality::{FinalitySnapshot, FinalityTracker};
