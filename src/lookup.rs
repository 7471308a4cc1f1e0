//! Transaction / block lookup: result model and the RPC classification chain.

use crate::{
    error::{LookupError, RpcError},
    rpc::{call_as, RpcTransport},
};
use serde::Deserialize;
use serde_json::json;

#[derive(Clone, Debug, PartialEq)]
pub struct BlockDetails {
    pub hash: String,
    pub height: i64,
    pub time: i64,
    pub tx_count: i64,
    pub size: i64,
    pub weight: i64,
    pub difficulty: f64,
    /// Pool tag read from the coinbase scriptSig, `—` when none.
    pub miner: String,
    pub confirmations: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MempoolEntry {
    /// BTC
    pub fee: f64,
    /// sat/vB
    pub fee_rate: f64,
    pub vsize: i64,
    pub weight: i64,
    pub ancestors: i64,
    pub descendants: i64,
    pub entry_time: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxInput {
    /// Block reward input, no previous output.
    Coinbase,
    Spend { txid: String, vout: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TxOutput {
    /// BTC
    pub value: f64,
    pub address: Option<String>,
    pub script_type: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfirmedTx {
    pub confirmations: i64,
    pub block_hash: String,
    /// Derived from the tip at search time; unknown if the tip was not known yet.
    pub block_height: Option<i64>,
    pub block_time: i64,
    pub vsize: i64,
    pub weight: i64,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// BTC, sum of all output values.
    pub total_output: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LookupKind {
    Searching,
    Block(BlockDetails),
    Mempool(MempoolEntry),
    Confirmed(ConfirmedTx),
    Error { message: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    Inputs,
    Outputs,
}

/// Modal list over a confirmed transaction. At most one is open.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    Closed,
    Inputs { selected: i32 },
    Outputs { selected: i32 },
}

impl Overlay {
    pub fn kind(&self) -> Option<OverlayKind> {
        match self {
            Overlay::Closed => None,
            Overlay::Inputs { .. } => Some(OverlayKind::Inputs),
            Overlay::Outputs { .. } => Some(OverlayKind::Outputs),
        }
    }
}

/// What Enter does on the current result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    None,
    /// Drill down into another lookup.
    Search(String),
    Open(OverlayKind),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LookupResult {
    pub query: String,
    pub kind: LookupKind,
    /// Row cursor: -1 none, 0 block row, then inputs row and outputs row when present.
    pub selected: i32,
    pub overlay: Overlay,
}

impl LookupResult {
    pub fn new(query: impl Into<String>, kind: LookupKind) -> Self {
        Self {
            query: query.into(),
            kind,
            selected: -1,
            overlay: Overlay::Closed,
        }
    }

    pub fn searching(query: impl Into<String>) -> Self {
        Self::new(query, LookupKind::Searching)
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.kind, LookupKind::Searching)
    }

    pub fn confirmed(&self) -> Option<&ConfirmedTx> {
        match &self.kind {
            LookupKind::Confirmed(tx) => Some(tx),
            _ => None,
        }
    }

    /// Number of rows below the block row (inputs and outputs, if any).
    pub fn navigable_rows(&self) -> i32 {
        self.confirmed()
            .map(|tx| !tx.inputs.is_empty() as i32 + !tx.outputs.is_empty() as i32)
            .unwrap_or(0)
    }

    pub fn inputs_row(&self) -> Option<i32> {
        self.confirmed()
            .filter(|tx| !tx.inputs.is_empty())
            .map(|_| 1)
    }

    pub fn outputs_row(&self) -> Option<i32> {
        let tx = self.confirmed().filter(|tx| !tx.outputs.is_empty())?;
        Some(if tx.inputs.is_empty() { 1 } else { 2 })
    }

    /// Move the row cursor, clamped to `[-1, navigable_rows]`.
    pub fn navigate(&mut self, delta: i32) -> bool {
        if self.confirmed().is_none() {
            return false;
        }
        let next = self
            .selected
            .saturating_add(delta)
            .clamp(-1, self.navigable_rows());
        let changed = next != self.selected;
        self.selected = next;
        changed
    }

    /// Open an overlay, replacing whichever one was open.
    pub fn open_overlay(&mut self, kind: OverlayKind) -> bool {
        let Some(tx) = self.confirmed() else {
            return false;
        };
        let available = match kind {
            OverlayKind::Inputs => !tx.inputs.is_empty(),
            OverlayKind::Outputs => !tx.outputs.is_empty(),
        };
        if !available {
            return false;
        }
        self.overlay = match kind {
            OverlayKind::Inputs => Overlay::Inputs { selected: -1 },
            OverlayKind::Outputs => Overlay::Outputs { selected: -1 },
        };
        true
    }

    pub fn close_overlay(&mut self) -> bool {
        let was_open = self.overlay != Overlay::Closed;
        self.overlay = Overlay::Closed;
        was_open
    }

    /// Scroll the open overlay's cursor, clamped to `[-1, len - 1]`.
    pub fn overlay_move(&mut self, delta: i32) -> bool {
        let (inputs, outputs) = match self.confirmed() {
            Some(tx) => (tx.inputs.len() as i32, tx.outputs.len() as i32),
            None => return false,
        };
        let (selected, len) = match &mut self.overlay {
            Overlay::Closed => return false,
            Overlay::Inputs { selected } => (selected, inputs),
            Overlay::Outputs { selected } => (selected, outputs),
        };
        let next = selected.saturating_add(delta).clamp(-1, len - 1);
        let changed = next != *selected;
        *selected = next;
        changed
    }

    pub fn activation(&self) -> Activation {
        let Some(tx) = self.confirmed() else {
            return Activation::None;
        };
        match self.overlay {
            Overlay::Inputs { selected } => match usize::try_from(selected)
                .ok()
                .and_then(|i| tx.inputs.get(i))
            {
                Some(TxInput::Spend { txid, .. }) => Activation::Search(txid.clone()),
                _ => Activation::None,
            },
            Overlay::Outputs { .. } => Activation::None,
            Overlay::Closed => {
                let sel = Some(self.selected);
                if sel == self.inputs_row() {
                    Activation::Open(OverlayKind::Inputs)
                } else if sel == self.outputs_row() {
                    Activation::Open(OverlayKind::Outputs)
                } else if !tx.block_hash.is_empty() {
                    // Block row, or nothing selected yet.
                    Activation::Search(tx.block_hash.clone())
                } else {
                    Activation::None
                }
            }
        }
    }
}

/// How a query is resolved first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueryKind {
    /// All digits: a block height, resolved height -> hash -> block.
    Height,
    /// Anything else: mempool entry, then confirmed tx, then block hash.
    Hash,
}

/// 64 hex chars: a txid or block hash.
pub fn is_txid(query: &str) -> bool {
    query.len() == 64 && query.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Up to 8 digits.
pub fn is_height(query: &str) -> bool {
    (1..=8).contains(&query.len()) && query.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a typed query is worth sending to the node at all.
pub fn is_searchable(query: &str) -> bool {
    is_txid(query) || is_height(query)
}

pub fn classify(query: &str) -> QueryKind {
    // An all-numeric 64-digit txid would also land here; heights win.
    if !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit()) {
        QueryKind::Height
    } else {
        QueryKind::Hash
    }
}

/// Longest printable ASCII run (at least 4 chars, `/` excluded) in a coinbase
/// scriptSig, capped at 24 chars.
pub fn extract_miner(coinbase_hex: &str) -> String {
    let mut best = String::new();
    let mut run = String::new();

    fn close_run(run: &mut String, best: &mut String) {
        if run.len() >= 4 && run.len() > best.len() {
            *best = std::mem::take(run);
        }
        run.clear();
    }

    for pair in coinbase_hex.as_bytes().chunks_exact(2) {
        let byte = std::str::from_utf8(pair)
            .ok()
            .and_then(|s| u8::from_str_radix(s, 16).ok());
        match byte {
            Some(b) if (0x20..0x7f).contains(&b) && b != b'/' => run.push(b as char),
            _ => close_run(&mut run, &mut best),
        }
    }
    close_run(&mut run, &mut best);

    if best.is_empty() {
        return "—".into();
    }
    best.truncate(24);
    best
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBlock {
    hash: String,
    height: i64,
    time: i64,
    #[serde(rename = "nTx")]
    n_tx: i64,
    size: i64,
    weight: i64,
    difficulty: f64,
    confirmations: i64,
    tx: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFees {
    base: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMempoolEntry {
    fees: Option<RawFees>,
    fee: Option<f64>,
    vsize: i64,
    weight: i64,
    #[serde(rename = "ancestorcount")]
    ancestor_count: i64,
    #[serde(rename = "descendantcount")]
    descendant_count: i64,
    time: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVin {
    coinbase: Option<String>,
    txid: Option<String>,
    vout: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawScriptPubKey {
    #[serde(rename = "type")]
    kind: String,
    address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVout {
    value: f64,
    #[serde(rename = "scriptPubKey")]
    script_pub_key: Option<RawScriptPubKey>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTx {
    vsize: i64,
    weight: i64,
    #[serde(rename = "blockhash")]
    block_hash: String,
    confirmations: i64,
    #[serde(rename = "blocktime")]
    block_time: i64,
    vin: Vec<RawVin>,
    vout: Vec<RawVout>,
}

impl From<RawMempoolEntry> for MempoolEntry {
    fn from(raw: RawMempoolEntry) -> Self {
        let fee = match raw.fees {
            Some(fees) => fees.base,
            None => raw.fee.unwrap_or(0.0),
        };
        let fee_rate = if raw.vsize > 0 {
            fee * 1e8 / raw.vsize as f64
        } else {
            0.0
        };
        MempoolEntry {
            fee,
            fee_rate,
            vsize: raw.vsize,
            weight: raw.weight,
            ancestors: raw.ancestor_count,
            descendants: raw.descendant_count,
            entry_time: raw.time,
        }
    }
}

fn confirmed_from_raw(raw: RawTx, tip: i64) -> ConfirmedTx {
    let inputs = raw
        .vin
        .into_iter()
        .map(|vin| match vin.coinbase {
            Some(_) => TxInput::Coinbase,
            None => TxInput::Spend {
                txid: vin.txid.unwrap_or_default(),
                vout: vin.vout.unwrap_or_default(),
            },
        })
        .collect();
    let outputs: Vec<TxOutput> = raw
        .vout
        .into_iter()
        .map(|vout| {
            let spk = vout.script_pub_key.unwrap_or_default();
            TxOutput {
                value: vout.value,
                address: spk.address,
                script_type: spk.kind,
            }
        })
        .collect();
    let total_output = outputs.iter().map(|o| o.value).sum();
    let block_height = (tip > 0 && raw.confirmations > 0).then(|| tip - raw.confirmations + 1);

    ConfirmedTx {
        confirmations: raw.confirmations,
        block_hash: raw.block_hash,
        block_height,
        block_time: raw.block_time,
        vsize: raw.vsize,
        weight: raw.weight,
        inputs,
        outputs,
        total_output,
    }
}

async fn fetch_block(rpc: &dyn RpcTransport, hash: &str) -> Result<BlockDetails, RpcError> {
    let raw: RawBlock = call_as(rpc, "getblock", json!([hash, 1])).await?;
    let block_hash = if raw.hash.is_empty() {
        hash.to_string()
    } else {
        raw.hash
    };

    let miner = match raw.tx.first() {
        Some(coinbase_txid) => fetch_miner(rpc, coinbase_txid, &block_hash).await,
        None => "—".into(),
    };

    Ok(BlockDetails {
        hash: block_hash,
        height: raw.height,
        time: raw.time,
        tx_count: raw.n_tx,
        size: raw.size,
        weight: raw.weight,
        difficulty: raw.difficulty,
        miner,
        confirmations: raw.confirmations,
    })
}

async fn fetch_miner(rpc: &dyn RpcTransport, coinbase_txid: &str, block_hash: &str) -> String {
    // Passing the block hash lets the node find the coinbase without txindex.
    let coinbase: Result<RawTx, _> = call_as(
        rpc,
        "getrawtransaction",
        json!([coinbase_txid, true, block_hash]),
    )
    .await;
    match coinbase {
        Ok(tx) => tx
            .vin
            .first()
            .and_then(|vin| vin.coinbase.as_deref())
            .map(extract_miner)
            .unwrap_or_else(|| "—".into()),
        Err(e) => {
            log::debug!("coinbase lookup for {coinbase_txid} failed: {e}");
            "—".into()
        }
    }
}

/// Resolve `query` against the node. `tip` is the height known at search time.
pub async fn perform_lookup(
    rpc: &dyn RpcTransport,
    query: &str,
    tip: i64,
) -> Result<LookupKind, LookupError> {
    match classify(query) {
        QueryKind::Height => {
            let height: u64 = query
                .parse()
                .map_err(|_| LookupError::InvalidHeight(query.to_string()))?;
            let hash: String = call_as(rpc, "getblockhash", json!([height])).await?;
            Ok(LookupKind::Block(fetch_block(rpc, &hash).await?))
        }
        QueryKind::Hash => {
            let mempool_err =
                match call_as::<RawMempoolEntry>(rpc, "getmempoolentry", json!([query])).await {
                    Ok(entry) => return Ok(LookupKind::Mempool(entry.into())),
                    Err(e) => e,
                };
            log::debug!("{query} not in mempool: {mempool_err}");

            // Needs txindex=1 on the node.
            let tx_err =
                match call_as::<RawTx>(rpc, "getrawtransaction", json!([query, true])).await {
                    Ok(tx) => return Ok(LookupKind::Confirmed(confirmed_from_raw(tx, tip))),
                    Err(e) => e,
                };
            log::debug!("{query} not a known transaction: {tx_err}");

            fetch_block(rpc, query)
                .await
                .map(LookupKind::Block)
                .map_err(|last| LookupError::NotFound {
                    query: query.to_string(),
                    last,
                })
        }
    }
}
