use serde::{Deserialize, Serialize};

/// Subset of `getblockchaininfo`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: i64,
    pub headers: i64,
    pub difficulty: f64,
    #[serde(rename = "verificationprogress")]
    pub verification_progress: f64,
    pub pruned: bool,
    #[serde(rename = "initialblockdownload")]
    pub initial_block_download: bool,
    #[serde(rename = "bestblockhash")]
    pub best_block_hash: String,
}

impl Default for ChainInfo {
    fn default() -> Self {
        Self {
            chain: "—".into(),
            blocks: 0,
            headers: 0,
            difficulty: 0.0,
            verification_progress: 0.0,
            pruned: false,
            initial_block_download: false,
            best_block_hash: String::new(),
        }
    }
}

/// Subset of `getnetworkinfo`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkInfo {
    pub connections: i64,
    pub connections_in: i64,
    pub connections_out: i64,
    pub subversion: String,
    #[serde(rename = "protocolversion")]
    pub protocol_version: i64,
    #[serde(rename = "networkactive")]
    pub network_active: bool,
    #[serde(rename = "relayfee")]
    pub relay_fee: f64,
}

impl Default for NetworkInfo {
    fn default() -> Self {
        Self {
            connections: 0,
            connections_in: 0,
            connections_out: 0,
            subversion: String::new(),
            protocol_version: 0,
            network_active: true,
            relay_fee: 0.0,
        }
    }
}

/// Subset of `getmempoolinfo`. Fee fields are BTC or BTC/kvB as the node reports them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolInfo {
    pub size: i64,
    pub bytes: i64,
    pub usage: i64,
    #[serde(rename = "maxmempool")]
    pub max: i64,
    #[serde(rename = "mempoolminfee")]
    pub min_fee: f64,
    pub total_fee: f64,
}

impl Default for MempoolInfo {
    fn default() -> Self {
        Self {
            size: 0,
            bytes: 0,
            usage: 0,
            max: 300_000_000,
            min_fee: 0.0,
            total_fee: 0.0,
        }
    }
}

/// One entry of `getpeerinfo`, valid only for the fetch that produced it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerRecord {
    pub id: i64,
    pub addr: String,
    pub network: String,
    pub subver: String,
    pub inbound: bool,
    #[serde(rename = "bytessent")]
    pub bytes_sent: i64,
    #[serde(rename = "bytesrecv")]
    pub bytes_recv: i64,
    #[serde(rename = "pingtime")]
    pub ping_secs: Option<f64>,
    pub version: i64,
    pub synced_blocks: i64,
}

impl PeerRecord {
    pub fn ping_ms(&self) -> Option<f64> {
        self.ping_secs.map(|s| s * 1000.0)
    }
}

/// Per-block aggregate from `getblockstats`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockStat {
    pub height: i64,
    pub txs: i64,
    pub total_size: i64,
    pub total_weight: i64,
    pub time: i64,
}

/// Fields the block-arrival slide animation reads and writes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockAnimation {
    pub active: bool,
    pub frame: u32,
    /// Block list displayed before the newest fetch; empty when idle.
    pub old: Vec<BlockStat>,
}

/// Everything the dashboard shows about the node, published as one value.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardSnapshot {
    pub chain: ChainInfo,
    pub network: NetworkInfo,
    pub mempool: MempoolInfo,
    /// Hashes per second implied by the current difficulty.
    pub hash_rate: f64,
    pub peers: Vec<PeerRecord>,
    /// Newest first.
    pub recent_blocks: Vec<BlockStat>,
    /// Tip height the block list was fetched for, -1 before the first fetch.
    pub blocks_fetched_at: i64,
    pub animation: BlockAnimation,
    pub connected: bool,
    pub refreshing: bool,
    pub last_error: Option<String>,
    pub last_update: Option<String>,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            chain: ChainInfo::default(),
            network: NetworkInfo::default(),
            mempool: MempoolInfo::default(),
            hash_rate: 0.0,
            peers: Vec::new(),
            recent_blocks: Vec::new(),
            blocks_fetched_at: -1,
            animation: BlockAnimation::default(),
            connected: false,
            refreshing: false,
            last_error: None,
            last_update: None,
        }
    }
}

/// Expected network hashes per second at `difficulty`: `difficulty * 2^32 / 600`.
pub fn hash_rate_from_difficulty(difficulty: f64) -> f64 {
    difficulty * 4_294_967_296.0 / 600.0
}
