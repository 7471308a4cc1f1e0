//! Error taxonomy for node RPC calls and lookups.

use thiserror::Error;

/// Failure of a single JSON-RPC round trip.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RpcError {
    /// Connection, timeout, or unexpected HTTP status.
    #[error("transport error: {0}")]
    Transport(String),
    /// HTTP 401 from the node.
    #[error("Authentication failed, check your RPC credentials")]
    Auth,
    /// Malformed envelope or an RPC-level `error` object.
    #[error("{message}")]
    Protocol { code: i64, message: String },
    /// Response body was not valid JSON or did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        RpcError::Transport(e.to_string())
    }
}

/// Failure of a lookup as a whole.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    /// Every classification strategy failed; carries the last failure.
    #[error("{last}")]
    NotFound { query: String, last: RpcError },
    #[error("invalid block height: {0}")]
    InvalidHeight(String),
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_last_failure() {
        let err = LookupError::NotFound {
            query: "abc".into(),
            last: RpcError::Protocol {
                code: -5,
                message: "Block not found".into(),
            },
        };
        assert_eq!(err.to_string(), "Block not found");
    }

    #[test]
    fn parse_error_from_serde() {
        let e = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let rpc: RpcError = e.into();
        assert!(matches!(rpc, RpcError::Parse(_)));
        assert!(rpc.to_string().starts_with("JSON parse error"));
    }
}
