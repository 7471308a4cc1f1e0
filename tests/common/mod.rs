//! Scripted in-memory node for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bitcoin_tui::{error::RpcError, rpc::RpcTransport};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Handler = Arc<dyn Fn(&Value) -> Result<Value, RpcError> + Send + Sync>;

#[derive(Default)]
struct Inner {
    handlers: Mutex<HashMap<String, Handler>>,
    calls: Mutex<Vec<(String, Value)>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

/// Responds per method from registered closures and records every call.
/// Unregistered methods fail like an unknown RPC would.
#[derive(Clone, Default)]
pub struct MockRpc {
    inner: Arc<Inner>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        &self,
        method: &str,
        f: impl Fn(&Value) -> Result<Value, RpcError> + Send + Sync + 'static,
    ) {
        self.inner
            .handlers
            .lock()
            .unwrap()
            .insert(method.to_string(), Arc::new(f));
    }

    pub fn ok(&self, method: &str, result: Value) {
        self.on(method, move |_| Ok(result.clone()));
    }

    pub fn fail(&self, method: &str, err: RpcError) {
        self.on(method, move |_| Err(err.clone()));
    }

    /// Park every call to `method` until the returned handle is notified.
    pub fn hold(&self, method: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner
            .gates
            .lock()
            .unwrap()
            .insert(method.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    pub fn calls_with_params(&self) -> Vec<(String, Value)> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|m| m.as_str() == method).count()
    }

    pub fn clear_calls(&self) {
        self.inner.calls.lock().unwrap().clear();
    }

    pub fn transport(&self) -> Arc<dyn RpcTransport> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl RpcTransport for MockRpc {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        let gate = self.inner.gates.lock().unwrap().get(method).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let handler = self.inner.handlers.lock().unwrap().get(method).cloned();
        match handler {
            Some(h) => h(&params),
            None => Err(RpcError::Protocol {
                code: -32601,
                message: "Method not found".into(),
            }),
        }
    }
}

pub fn not_found(message: &str) -> RpcError {
    RpcError::Protocol {
        code: -5,
        message: message.into(),
    }
}

/// Block stats for `height` the way `getblockstats` reports them.
pub fn block_stats(height: i64) -> Value {
    json!({
        "height": height,
        "txs": 1000 + height % 100,
        "total_size": 1_500_000,
        "total_weight": 3_990_000,
        "time": 1_700_000_000 + height * 600,
    })
}

/// Register the four dashboard methods plus `getblockstats` for a node at `tip`.
pub fn healthy_node(rpc: &MockRpc, tip: i64) {
    rpc.ok(
        "getblockchaininfo",
        json!({
            "chain": "main",
            "blocks": tip,
            "headers": tip,
            "difficulty": 1.1e14,
            "verificationprogress": 0.99999,
            "pruned": false,
            "initialblockdownload": false,
            "bestblockhash": "00000000000000000001aa",
        }),
    );
    rpc.ok(
        "getnetworkinfo",
        json!({
            "connections": 10,
            "connections_in": 2,
            "connections_out": 8,
            "subversion": "/Satoshi:27.0.0/",
            "protocolversion": 70016,
            "networkactive": true,
            "relayfee": 0.00001,
        }),
    );
    rpc.ok(
        "getmempoolinfo",
        json!({
            "size": 4200,
            "bytes": 2_100_000,
            "usage": 9_000_000,
            "maxmempool": 300_000_000,
            "mempoolminfee": 0.00001,
            "total_fee": 0.25,
        }),
    );
    rpc.ok(
        "getpeerinfo",
        json!([
            {"id": 1, "addr": "10.0.0.1:8333", "network": "ipv4", "inbound": false,
             "bytessent": 1000, "bytesrecv": 2000, "pingtime": 0.05, "synced_blocks": tip},
            {"id": 2, "addr": "10.0.0.2:8333", "network": "ipv4", "inbound": true,
             "bytessent": 10, "bytesrecv": 20, "synced_blocks": tip - 1},
        ]),
    );
    rpc.on("getblockstats", |params| {
        let height = params[0].as_i64().unwrap_or_default();
        Ok(block_stats(height))
    });
}
