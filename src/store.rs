//! Owner of the published [`DashboardSnapshot`].
//!
//! Only the poller and the animator write here. The renderer reads full copies.

use crate::shared::Shared;
use crate::types::{
    hash_rate_from_difficulty, BlockStat, ChainInfo, DashboardSnapshot, MempoolInfo, NetworkInfo,
    PeerRecord,
};

/// Result of the fast phase of one poll cycle.
#[derive(Clone, Debug, Default)]
pub struct CoreMetrics {
    pub chain: ChainInfo,
    pub network: NetworkInfo,
    pub mempool: MempoolInfo,
    pub peers: Vec<PeerRecord>,
}

#[derive(Clone, Default)]
pub struct SnapshotStore {
    state: Shared<DashboardSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state.snapshot()
    }

    /// Current tip height as last published.
    pub fn tip(&self) -> i64 {
        self.state.with(|s| s.chain.blocks)
    }

    pub fn blocks_fetched_at(&self) -> i64 {
        self.state.with(|s| s.blocks_fetched_at)
    }

    pub fn set_refreshing(&self, refreshing: bool) {
        self.state.update(|s| s.refreshing = refreshing);
    }

    /// Publish a fully successful fast phase.
    pub fn publish_core(&self, core: CoreMetrics, updated_at: String) {
        let hash_rate = hash_rate_from_difficulty(core.chain.difficulty);
        self.state.update(move |s| {
            s.chain = core.chain;
            s.network = core.network;
            s.mempool = core.mempool;
            s.peers = core.peers;
            s.hash_rate = hash_rate;
            s.connected = true;
            s.last_error = None;
            s.last_update = Some(updated_at);
        });
    }

    /// Mark the node unreachable; every other field keeps its last good value.
    pub fn record_failure(&self, message: String) {
        self.state.update(|s| {
            s.connected = false;
            s.last_error = Some(message);
        });
    }

    /// Swap in a freshly fetched block list for `tip`.
    ///
    /// Returns true when the block animation was armed: the previous list was
    /// non-empty and differs from `fresh`, so it is kept as the animation's
    /// "old" list and the frame counter restarts at 0.
    ///
    /// An empty `fresh` keeps the current list and leaves the fetched-at height
    /// alone, so the next cycle retries the same tip.
    pub fn publish_blocks(&self, tip: i64, fresh: Vec<BlockStat>) -> bool {
        if fresh.is_empty() {
            return false;
        }
        self.state.update(|s| {
            let armed = !s.recent_blocks.is_empty() && s.recent_blocks != fresh;
            if armed {
                s.animation.old = std::mem::take(&mut s.recent_blocks);
                s.animation.frame = 0;
                s.animation.active = true;
            }
            s.recent_blocks = fresh;
            s.blocks_fetched_at = tip;
            armed
        })
    }

    /// Advance the block animation by one frame out of `total`.
    ///
    /// Returns false, touching nothing, when no animation is running.
    pub fn advance_animation(&self, total: u32) -> bool {
        self.state.update(|s| {
            let anim = &mut s.animation;
            if !anim.active {
                return false;
            }
            anim.frame += 1;
            if anim.frame >= total {
                anim.active = false;
                anim.old.clear();
            }
            true
        })
    }
}
