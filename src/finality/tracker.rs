//! FinalityTracker: vote tallying and strictly in-order height finalization.
//!
//! The tracker owns the finalized chain (block id -> height) and the pending
//! tally for the single next height behind one exclusive guard. Vote batches
//! are validated against the pending height, the aligned candidate is tallied,
//! and a candidate reaching quorum is appended to the chain while the tally
//! starts fresh for the next height.

use crate::finality::types::{BlockId, Height};
use crate::utils::metrics::{self, METRICS};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Snapshot representation for CLI/debugging
#[derive(Debug, Clone, Serialize)]
pub struct FinalitySnapshot {
    /// next height awaiting finalization
    pub pending_height: Height,
    /// finalized chain: block id -> height
    pub finalized: HashMap<BlockId, Height>,
    /// votes per candidate at `pending_height` since the last reset
    pub tally: HashMap<BlockId, u32>,
}

impl fmt::Display for FinalitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut finalized: Vec<_> = self.finalized.iter().collect();
        finalized.sort_by_key(|(_, height)| **height);
        write!(f, "finalized:")?;
        for (id, height) in finalized {
            write!(f, " {}={}", id, height)?;
        }
        write!(f, "  pending(height {}):", self.pending_height)?;
        let mut tally: Vec<_> = self.tally.iter().collect();
        tally.sort();
        for (id, votes) in tally {
            write!(f, " {}={}", id, votes)?;
        }
        Ok(())
    }
}

/// Mutable tracker state; both maps and the counter are guarded as one unit.
#[derive(Debug)]
struct TrackerState {
    /// finalized chain, dense heights from 0 (genesis)
    finalized: HashMap<BlockId, Height>,
    /// explicit counter; always equals finalized.len()
    pending_height: Height,
    /// in-flight vote counts for candidates at `pending_height`
    tally: HashMap<BlockId, u32>,
}

impl TrackerState {
    /// Check whether `candidates` covers the pending height. Returns the
    /// verdict together with the current finalized height, computed before
    /// any mutation.
    fn check_window(&self, start_height: Height, candidates: &[BlockId]) -> (bool, Height) {
        let current = self.pending_height - 1;
        let window_end = start_height.saturating_add(candidates.len() as u64);
        if self.pending_height < start_height || self.pending_height >= window_end {
            return (false, current);
        }
        (true, current)
    }
}

/// FinalityTracker holds live finality state and serializes all access.
pub struct FinalityTracker {
    state: RwLock<TrackerState>,
    quorum: u32,
}

impl FinalityTracker {
    /// Create a tracker seeded with `genesis_id` at height 0.
    pub fn new(genesis_id: impl Into<BlockId>, quorum: u32) -> Self {
        let mut finalized = HashMap::new();
        finalized.insert(genesis_id.into(), 0);
        Self {
            state: RwLock::new(TrackerState {
                finalized,
                pending_height: 1,
                tally: HashMap::new(),
            }),
            quorum,
        }
    }

    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    /// Height of the most recently finalized block.
    pub fn finalized_height(&self) -> Height {
        self.state.read().pending_height - 1
    }

    /// Submit a batch of candidate identifiers starting at `start_height`.
    ///
    /// `candidates[i]` is the caller's claimed block id for height
    /// `start_height + i`. Only the element aligned with the pending height is
    /// tallied; the rest of the batch is ignored for this call. Returns the
    /// current finalized height whether or not the submission advanced it:
    /// out-of-window and already-finalized submissions are benign no-ops, not
    /// errors.
    pub fn submit_votes(&self, start_height: Height, candidates: &[BlockId]) -> Height {
        let mut st = self.state.write();
        METRICS.inc_counter(metrics::VOTES_SUBMITTED);

        let (valid, current) = st.check_window(start_height, candidates);
        if !valid {
            METRICS.inc_counter(metrics::VOTES_REJECTED_WINDOW);
            debug!(
                "vote batch [{}, {}) outside pending height {}",
                start_height,
                start_height.saturating_add(candidates.len() as u64),
                st.pending_height
            );
            return current;
        }

        let idx = (st.pending_height - start_height) as usize;
        let candidate = candidates[idx].clone();
        let votes = {
            let entry = st.tally.entry(candidate.clone()).or_insert(0);
            *entry += 1;
            *entry
        };
        debug!(
            "vote {}/{} for candidate {} at height {}",
            votes, self.quorum, candidate, st.pending_height
        );

        if votes == self.quorum {
            if st.finalized.contains_key(&candidate) {
                // same id already accepted at an earlier height; leave the
                // tally untouched so this entry climbs past quorum and never
                // triggers again
                METRICS.inc_counter(metrics::DUPLICATE_FINAL_IGNORED);
                debug!(
                    "candidate {} reached quorum but is already finalized, ignoring",
                    candidate
                );
                return st.pending_height - 1;
            }
            let height = st.pending_height;
            st.finalized.insert(candidate.clone(), height);
            st.pending_height += 1;
            st.tally.clear();
            METRICS.inc_counter(metrics::HEIGHTS_FINALIZED);
            info!("candidate {} finalized at height {}", candidate, height);
            debug_assert_eq!(st.finalized.len() as u64, st.pending_height);
        }

        st.pending_height - 1
    }

    /// Window check exposed for callers that want to validate a batch without
    /// submitting it. Same verdict `submit_votes` would reach.
    pub fn check_window(&self, start_height: Height, candidates: &[BlockId]) -> (bool, Height) {
        self.state.read().check_window(start_height, candidates)
    }

    /// Deep snapshot of both maps for diagnostics; no live references escape
    /// the guard.
    pub fn status(&self) -> FinalitySnapshot {
        let st = self.state.read();
        FinalitySnapshot {
            pending_height: st.pending_height,
            finalized: st.finalized.clone(),
            tally: st.tally.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finality::types::{DEFAULT_GENESIS_ID, DEFAULT_QUORUM};

    fn ids(raw: &[&str]) -> Vec<BlockId> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn tracker() -> FinalityTracker {
        FinalityTracker::new(DEFAULT_GENESIS_ID, DEFAULT_QUORUM)
    }

    #[test]
    fn test_finalize_one_by_one() {
        let t = tracker();
        for _ in 0..2 {
            assert_eq!(0, t.submit_votes(1, &ids(&["id-1"])));
        }
        assert_eq!(1, t.submit_votes(1, &ids(&["id-1"])));
        let snap = t.status();
        assert_eq!(Some(&1), snap.finalized.get("id-1"));
        assert!(snap.tally.is_empty());
    }

    #[test]
    fn test_competing_candidates_same_height() {
        let t = tracker();
        for _ in 0..2 {
            assert_eq!(0, t.submit_votes(1, &ids(&["id-1"])));
            assert_eq!(0, t.submit_votes(1, &ids(&["id-2"])));
        }
        // id-1 wins as it is first to reach quorum
        assert_eq!(1, t.submit_votes(1, &ids(&["id-1"])));
        // losing candidate's window has moved on; nothing changes
        assert_eq!(1, t.submit_votes(1, &ids(&["id-2"])));

        // height 2 starts from an empty tally, id-2's old votes are gone
        for _ in 0..2 {
            assert_eq!(1, t.submit_votes(2, &ids(&["id-2"])));
        }
        assert_eq!(2, t.submit_votes(2, &ids(&["id-2"])));
        assert_eq!(Some(&2), t.status().finalized.get("id-2"));
    }

    #[test]
    fn test_already_finalized_candidate_is_skipped() {
        let t = tracker();
        for _ in 0..2 {
            assert_eq!(0, t.submit_votes(1, &ids(&["id-1"])));
        }
        assert_eq!(1, t.submit_votes(1, &ids(&["id-1"])));

        // id-1 reaches quorum again at height 2 but is never re-appended
        for _ in 0..2 {
            assert_eq!(1, t.submit_votes(2, &ids(&["id-1"])));
        }
        assert_eq!(1, t.submit_votes(2, &ids(&["id-1"])));
        let snap = t.status();
        assert_eq!(2, snap.pending_height);
        assert_eq!(Some(&1), snap.finalized.get("id-1"));
        // extra votes keep counting past quorum without re-triggering
        assert_eq!(1, t.submit_votes(2, &ids(&["id-1"])));
        assert_eq!(2, t.status().pending_height);
    }

    #[test]
    fn test_check_window() {
        let t = tracker();
        for id in ["blockid-1", "blockid-2"] {
            for _ in 0..3 {
                t.submit_votes(t.finalized_height() + 1, &ids(&[id]));
            }
        }
        // pending height is now 3
        assert!(!t.check_window(0, &ids(&["block-1"])).0);
        assert!(!t.check_window(1, &ids(&["block-1"])).0);
        assert!(!t.check_window(1, &ids(&["block-1", "block-2"])).0);
        assert!(t.check_window(1, &ids(&["block-1", "block-2", "block-3"])).0);
        assert!(t.check_window(3, &ids(&["block-1"])).0);
        let (_, current) = t.check_window(3, &ids(&["block-1"]));
        assert_eq!(2, current);
    }

    #[test]
    fn test_out_of_window_leaves_state_unchanged() {
        let t = tracker();
        t.submit_votes(1, &ids(&["id-1"]));
        let before = t.status();

        // entirely in the past and entirely in the future
        assert_eq!(0, t.submit_votes(0, &ids(&["stale"])));
        assert_eq!(0, t.submit_votes(5, &ids(&["early"])));

        let after = t.status();
        assert_eq!(before.pending_height, after.pending_height);
        assert_eq!(before.finalized, after.finalized);
        assert_eq!(before.tally, after.tally);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let t = tracker();
        assert_eq!(0, t.submit_votes(1, &[]));
        assert!(t.status().tally.is_empty());
    }

    #[test]
    fn test_batch_offset_selects_aligned_candidate() {
        let t = tracker();
        // pending height 1 lines up with the second element
        let batch = ids(&["id-zero", "id-one", "id-two"]);
        for _ in 0..3 {
            t.submit_votes(0, &batch);
        }
        assert_eq!(Some(&1), t.status().finalized.get("id-one"));
    }

    #[test]
    fn test_configurable_quorum() {
        let t = FinalityTracker::new(DEFAULT_GENESIS_ID, 1);
        assert_eq!(1, t.submit_votes(1, &ids(&["solo"])));

        let t = FinalityTracker::new(DEFAULT_GENESIS_ID, 5);
        for _ in 0..4 {
            assert_eq!(0, t.submit_votes(1, &ids(&["id-1"])));
        }
        assert_eq!(1, t.submit_votes(1, &ids(&["id-1"])));
    }

    #[test]
    fn test_returned_height_is_monotonic() {
        let t = tracker();
        let mut last = 0;
        for round in 0..40u64 {
            let height = t.submit_votes(
                round % 7,
                &ids(&["id-a", "id-b", "id-c", "id-d", "id-e", "id-f", "id-g"]),
            );
            assert!(height >= last);
            last = height;
        }
    }
}
