//! Concurrent vote-load harness.
//!
//! Spawns proposer tasks that hammer a shared tracker with vote batches, the
//! way a gossip layer would fan submissions in from many peers. Each proposer
//! derives its own candidate id per height and submits its full sequence until
//! the chain has advanced through the requested height range.

use crate::finality::tracker::{FinalitySnapshot, FinalityTracker};
use crate::finality::types::{derive_block_id, BlockId, Height};
use crate::utils::errors::{Result, TrackerError};
use futures::future::join_all;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// concurrent proposer tasks
    pub workers: usize,
    /// heights to drive to finalization (1..=heights)
    pub heights: Height,
    /// sleep a random few hundred microseconds between submissions so
    /// interleavings vary between runs
    pub jitter: bool,
}

impl SimulationConfig {
    fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(TrackerError::SimulationError(
                "workers must be at least 1".into(),
            ));
        }
        if self.heights == 0 {
            return Err(TrackerError::SimulationError(
                "heights must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Candidate sequence a single proposer claims for heights 1..=heights.
fn proposer_sequence(proposer: usize, heights: Height) -> Vec<BlockId> {
    (1..=heights)
        .map(|height| derive_block_id(format!("{}:{}", height, proposer).as_bytes()))
        .collect()
}

/// Run the load harness to completion and return the final snapshot.
///
/// Every proposer performs at most `heights * quorum` submissions, which is
/// enough for any single proposer to walk the whole range by itself, so the
/// run always terminates with all requested heights finalized.
pub async fn run(tracker: Arc<FinalityTracker>, cfg: SimulationConfig) -> Result<FinalitySnapshot> {
    cfg.validate()?;
    let quorum = tracker.quorum();
    let rounds = cfg.heights.saturating_mul(quorum as u64);
    info!(
        "starting simulation: {} workers, heights 1..={}, quorum {}",
        cfg.workers, cfg.heights, quorum
    );

    let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(cfg.workers);
    for proposer in 0..cfg.workers {
        let tracker = tracker.clone();
        let sequence = proposer_sequence(proposer, cfg.heights);
        let target = cfg.heights;
        let jitter = cfg.jitter;
        handles.push(tokio::spawn(async move {
            for _ in 0..rounds {
                if tracker.finalized_height() >= target {
                    break;
                }
                if jitter {
                    let micros = rand::thread_rng().gen_range(0..500);
                    tokio::time::sleep(Duration::from_micros(micros)).await;
                }
                tracker.submit_votes(1, &sequence);
            }
        }));
    }

    for joined in join_all(handles).await {
        joined.map_err(|e| TrackerError::SimulationError(e.to_string()))?;
    }

    let snapshot = tracker.status();
    info!(
        "simulation done: finalized height {}",
        snapshot.pending_height - 1
    );
    Ok(snapshot)
}
