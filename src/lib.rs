//! bitcoin-tui - Terminal dashboard for Bitcoin Core
//!
//! Polls a node over JSON-RPC in the background and renders chain, mempool,
//! network and peer state with ratatui. A lookup panel resolves block heights,
//! block hashes and txids, with drill-down into blocks and transaction inputs.
//!
//! ## Architecture
//!
//! - [`poller`] writes node metrics into the [`store`] every refresh interval.
//! - [`animator`] advances the recent-blocks slide while one is running.
//! - [`coordinator`] runs at most one lookup at a time and owns its results.
//! - Every writer bumps a [`wake`] signal; the renderer redraws from copies.
//!
//! ```bash
//! cargo run -- --regtest -u alice -P secret
//! ```

// Core modules
pub mod error;
pub mod rpc;
pub mod shared;
pub mod types;
pub mod util_text;
pub mod wake;

// Background workers and the state they publish
pub mod animator;
pub mod coordinator;
pub mod lookup;
pub mod poller;
pub mod store;

// Configuration and credentials
pub mod config;
pub mod credentials;

// UI
pub mod app;
pub mod theme;
pub mod ui;

// Re-export commonly used types
pub use app::{App, InputMode, View};
pub use config::{Config, Network};
pub use error::{LookupError, RpcError};
pub use rpc::{RpcClient, RpcTransport};
pub use types::DashboardSnapshot;
