use crate::error::RpcError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tokio::time::Duration;

/// One request/response round trip against the node.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

#[derive(Clone, Debug)]
pub struct RpcConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub timeout: Duration,
}

/// JSON-RPC 1.1 client for Bitcoin Core's HTTP interface.
pub struct RpcClient {
    cfg: RpcConfig,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(cfg: RpcConfig) -> Self {
        Self {
            cfg,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn url(&self) -> &str {
        &self.cfg.url
    }
}

#[async_trait]
impl RpcTransport for RpcClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let body = json!({
            "jsonrpc": "1.1",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut req = http_client()
            .post(&self.cfg.url)
            .json(&body)
            .timeout(self.cfg.timeout);
        if !self.cfg.user.is_empty() || !self.cfg.password.is_empty() {
            req = req.basic_auth(&self.cfg.user, Some(&self.cfg.password));
        }

        log::debug!("rpc -> {method} (id {id})");
        let res = req.send().await?;

        // Bitcoin Core answers RPC-level errors with 500 and a JSON body.
        match res.status().as_u16() {
            401 => return Err(RpcError::Auth),
            200 | 500 => {}
            other => return Err(RpcError::Transport(format!("HTTP {other}"))),
        }

        let text = res.text().await?;
        decode_response(&text)
    }
}

/// Unwrap a JSON-RPC envelope into its `result`.
pub fn decode_response(text: &str) -> Result<Value, RpcError> {
    let mut v: Value = serde_json::from_str(text)?;

    if let Some(err) = v.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("RPC error")
            .to_string();
        return Err(RpcError::Protocol { code, message });
    }

    match v.get_mut("result") {
        Some(r) => Ok(r.take()),
        None => Err(RpcError::Protocol {
            code: 0,
            message: "invalid rpc payload (no result)".into(),
        }),
    }
}

/// Call `method` and deserialize the result into `T`.
pub async fn call_as<T: DeserializeOwned>(
    rpc: &dyn RpcTransport,
    method: &str,
    params: Value,
) -> Result<T, RpcError> {
    let v = rpc.call(method, params).await?;
    Ok(serde_json::from_value(v)?)
}
