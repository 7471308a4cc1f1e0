//! Poll cycle against a scripted node.

mod common;

use bitcoin_tui::{
    error::RpcError,
    poller::{Poller, BLOCK_WINDOW},
    store::SnapshotStore,
    wake::Wake,
};
use common::{block_stats, healthy_node, MockRpc};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

fn poller(rpc: &MockRpc, store: &SnapshotStore, wake: &Wake) -> Poller {
    Poller::new(
        rpc.transport(),
        store.clone(),
        wake.clone(),
        Arc::new(AtomicBool::new(false)),
        Duration::from_secs(1),
    )
}

#[tokio::test]
async fn healthy_cycle_publishes_everything() {
    let rpc = MockRpc::new();
    healthy_node(&rpc, 884231);
    let store = SnapshotStore::new();
    let wake = Wake::new();

    poller(&rpc, &store, &wake).refresh().await;

    let s = store.snapshot();
    assert!(s.connected);
    assert!(s.last_error.is_none());
    assert!(s.last_update.is_some());
    assert_eq!(s.chain.blocks, 884231);
    assert_eq!(s.peers.len(), 2);
    assert!(s.hash_rate > 0.0);
    assert_eq!(s.recent_blocks.len(), BLOCK_WINDOW as usize);
    assert_eq!(s.recent_blocks[0].height, 884231);
    assert_eq!(s.recent_blocks[19].height, 884212);
    assert_eq!(s.blocks_fetched_at, 884231);
    // First list has nothing to slide away from.
    assert!(!s.animation.active);
    assert!(wake.generation() >= 2);
}

#[tokio::test]
async fn failed_cycle_keeps_last_good_values() {
    let rpc = MockRpc::new();
    healthy_node(&rpc, 884231);
    let store = SnapshotStore::new();
    let wake = Wake::new();
    let p = poller(&rpc, &store, &wake);

    p.refresh().await;
    let good = store.snapshot();

    rpc.fail(
        "getnetworkinfo",
        RpcError::Transport("connection refused".into()),
    );
    p.refresh().await;
    let bad = store.snapshot();

    assert!(!bad.connected);
    assert_eq!(
        bad.last_error.as_deref(),
        Some("transport error: connection refused")
    );
    let mut expected = good.clone();
    expected.connected = false;
    expected.last_error = bad.last_error.clone();
    assert_eq!(bad, expected);
}

#[tokio::test]
async fn recovery_clears_error() {
    let rpc = MockRpc::new();
    rpc.fail("getblockchaininfo", RpcError::Auth);
    let store = SnapshotStore::new();
    let wake = Wake::new();
    let p = poller(&rpc, &store, &wake);

    p.refresh().await;
    let s = store.snapshot();
    assert!(!s.connected);
    assert!(s.last_update.is_none());
    assert_eq!(rpc.count("getnetworkinfo"), 0);

    healthy_node(&rpc, 10);
    p.refresh().await;
    let s = store.snapshot();
    assert!(s.connected);
    assert!(s.last_error.is_none());
}

#[tokio::test]
async fn block_stats_stop_at_first_failure() {
    let rpc = MockRpc::new();
    healthy_node(&rpc, 1000);
    rpc.on("getblockstats", |params| {
        let height = params[0].as_i64().unwrap_or_default();
        if height <= 995 {
            Err(RpcError::Protocol {
                code: -1,
                message: "Can't read block from disk".into(),
            })
        } else {
            Ok(block_stats(height))
        }
    });
    let store = SnapshotStore::new();
    let wake = Wake::new();

    poller(&rpc, &store, &wake).refresh().await;

    let heights: Vec<i64> = store
        .snapshot()
        .recent_blocks
        .iter()
        .map(|b| b.height)
        .collect();
    assert_eq!(heights, vec![1000, 999, 998, 997, 996]);
    assert_eq!(rpc.count("getblockstats"), 6);
}

#[tokio::test]
async fn short_chain_fetches_down_to_genesis() {
    let rpc = MockRpc::new();
    healthy_node(&rpc, 5);
    let store = SnapshotStore::new();
    let wake = Wake::new();

    poller(&rpc, &store, &wake).refresh().await;

    let s = store.snapshot();
    assert_eq!(s.recent_blocks.len(), 6);
    assert_eq!(s.recent_blocks.last().map(|b| b.height), Some(0));
}

#[tokio::test]
async fn unchanged_tip_skips_block_stats() {
    let rpc = MockRpc::new();
    healthy_node(&rpc, 884231);
    let store = SnapshotStore::new();
    let wake = Wake::new();
    let p = poller(&rpc, &store, &wake);

    p.refresh().await;
    assert_eq!(rpc.count("getblockstats"), BLOCK_WINDOW as usize);
    p.refresh().await;
    assert_eq!(rpc.count("getblockstats"), BLOCK_WINDOW as usize);
    assert_eq!(rpc.count("getblockchaininfo"), 2);
}

#[tokio::test]
async fn new_tip_arms_animation() {
    let rpc = MockRpc::new();
    healthy_node(&rpc, 884231);
    let store = SnapshotStore::new();
    let wake = Wake::new();
    let p = poller(&rpc, &store, &wake);

    p.refresh().await;
    healthy_node(&rpc, 884232);
    p.refresh().await;

    let s = store.snapshot();
    assert!(s.animation.active);
    assert_eq!(s.animation.frame, 0);
    assert_eq!(s.animation.old[0].height, 884231);
    assert_eq!(s.recent_blocks[0].height, 884232);
}

#[tokio::test]
async fn run_stops_on_shutdown() {
    let rpc = MockRpc::new();
    healthy_node(&rpc, 100);
    let store = SnapshotStore::new();
    let shutdown = Arc::new(AtomicBool::new(false));
    let p = Poller::new(
        rpc.transport(),
        store.clone(),
        Wake::new(),
        Arc::clone(&shutdown),
        Duration::from_secs(30),
    );

    let task = tokio::spawn(p.run());
    for _ in 0..100 {
        if store.snapshot().connected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(store.snapshot().connected);

    shutdown.store(true, Ordering::Release);
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("poller did not stop")
        .expect("poller panicked");
    assert!(!store.snapshot().refreshing);
    assert_eq!(rpc.count("getblockchaininfo"), 1);
}

#[tokio::test]
async fn failed_block_fetch_keeps_strip_and_retries() {
    let rpc = MockRpc::new();
    healthy_node(&rpc, 1000);
    let store = SnapshotStore::new();
    let wake = Wake::new();
    let p = poller(&rpc, &store, &wake);
    p.refresh().await;

    healthy_node(&rpc, 1001);
    rpc.fail(
        "getblockstats",
        RpcError::Protocol {
            code: -1,
            message: "Can't read block from disk".into(),
        },
    );
    p.refresh().await;

    let s = store.snapshot();
    assert_eq!(s.recent_blocks.len(), BLOCK_WINDOW as usize);
    assert_eq!(s.recent_blocks[0].height, 1000);
    assert_eq!(s.blocks_fetched_at, 1000);
    assert!(!s.animation.active);

    // Same tip next cycle: the fetch is retried.
    healthy_node(&rpc, 1001);
    p.refresh().await;
    let s = store.snapshot();
    assert_eq!(s.recent_blocks[0].height, 1001);
    assert_eq!(s.blocks_fetched_at, 1001);
}
