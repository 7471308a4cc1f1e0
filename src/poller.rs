use crate::{
    error::RpcError,
    rpc::{call_as, RpcTransport},
    store::{CoreMetrics, SnapshotStore},
    types::{BlockStat, ChainInfo, MempoolInfo, NetworkInfo, PeerRecord},
    wake::Wake,
};
use serde_json::json;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::time::{sleep, Duration};

/// How many blocks ending at the tip get per-block stats.
pub const BLOCK_WINDOW: i64 = 20;

/// Granularity of the between-cycle sleep; bounds shutdown latency.
pub const SLEEP_STEP: Duration = Duration::from_millis(100);

const BLOCK_STAT_FIELDS: [&str; 5] = ["height", "txs", "total_size", "total_weight", "time"];

pub struct Poller {
    rpc: Arc<dyn RpcTransport>,
    store: SnapshotStore,
    wake: Wake,
    shutdown: Arc<AtomicBool>,
    interval: Duration,
}

impl Poller {
    pub fn new(
        rpc: Arc<dyn RpcTransport>,
        store: SnapshotStore,
        wake: Wake,
        shutdown: Arc<AtomicBool>,
        interval: Duration,
    ) -> Self {
        Self {
            rpc,
            store,
            wake,
            shutdown,
            interval,
        }
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// One poll cycle: core metrics first, then block stats if the tip moved.
    pub async fn refresh(&self) {
        let cached_tip = self.store.blocks_fetched_at();

        let core = match self.fetch_core().await {
            Ok(core) => core,
            Err(e) => {
                log::error!("❌ RPC error: {e}");
                if !self.stopping() {
                    self.store.record_failure(e.to_string());
                    self.wake.signal();
                }
                return;
            }
        };
        let new_tip = core.chain.blocks;
        log::debug!("✅ Got tip height: {new_tip}");

        if self.stopping() {
            return;
        }
        self.store.publish_core(core, now_string());
        // Let the renderer show core metrics while block stats are fetched.
        self.wake.signal();

        if new_tip == cached_tip || new_tip <= 0 {
            log::debug!("💤 Tip unchanged at {new_tip}, skipping block stats");
            return;
        }

        let fresh = self.fetch_block_stats(new_tip).await;
        log::info!(
            "📦 Fetched stats for {} blocks ending at {new_tip}",
            fresh.len()
        );
        if self.stopping() {
            return;
        }
        if self.store.publish_blocks(new_tip, fresh) {
            log::debug!("new block list, animation armed");
        }
        self.wake.signal();
    }

    async fn fetch_core(&self) -> Result<CoreMetrics, RpcError> {
        let rpc = self.rpc.as_ref();
        let chain: ChainInfo = call_as(rpc, "getblockchaininfo", json!([])).await?;
        let network: NetworkInfo = call_as(rpc, "getnetworkinfo", json!([])).await?;
        let mempool: MempoolInfo = call_as(rpc, "getmempoolinfo", json!([])).await?;
        let peers: Vec<PeerRecord> = call_as(rpc, "getpeerinfo", json!([])).await?;
        Ok(CoreMetrics {
            chain,
            network,
            mempool,
            peers,
        })
    }

    /// Stats for up to [`BLOCK_WINDOW`] heights ending at `tip`, newest first.
    /// Stops at the first failing height and keeps what it has.
    pub async fn fetch_block_stats(&self, tip: i64) -> Vec<BlockStat> {
        let mut fresh = Vec::with_capacity(BLOCK_WINDOW as usize);
        for height in (0..=tip).rev().take(BLOCK_WINDOW as usize) {
            match call_as::<BlockStat>(
                self.rpc.as_ref(),
                "getblockstats",
                json!([height, BLOCK_STAT_FIELDS]),
            )
            .await
            {
                Ok(stat) => fresh.push(stat),
                Err(e) => {
                    log::warn!("⚠️ Failed to fetch block stats for {height}: {e}");
                    break;
                }
            }
        }
        fresh
    }

    /// Poll until the shutdown flag is set.
    pub async fn run(self) {
        log::info!(
            "🚀 RPC polling loop started - every {}s",
            self.interval.as_secs()
        );

        loop {
            self.store.set_refreshing(true);
            self.wake.signal();

            self.refresh().await;

            self.store.set_refreshing(false);
            self.wake.signal();

            if !self.sleep_interval().await {
                break;
            }
        }
        log::info!("RPC polling loop stopped");
    }

    /// Sleep one interval in [`SLEEP_STEP`] slices. False when shutting down.
    async fn sleep_interval(&self) -> bool {
        let steps = (self.interval.as_millis() / SLEEP_STEP.as_millis()).max(1);
        for _ in 0..steps {
            if self.stopping() {
                return false;
            }
            sleep(SLEEP_STEP).await;
        }
        !self.stopping()
    }
}

fn now_string() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
