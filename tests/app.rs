//! Key-level behavior of the app state and a render pass over every view.

mod common;

use bitcoin_tui::{
    app::{App, AppOptions, InputMode, View},
    lookup::LookupKind,
    theme::Theme,
    ui,
};
use common::{healthy_node, not_found, MockRpc};
use ratatui::{backend::TestBackend, Terminal};
use serde_json::json;
use std::time::Duration;

const TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

fn app(rpc: &MockRpc) -> App {
    App::new(
        AppOptions {
            endpoint: "127.0.0.1:8332".into(),
            refresh: Duration::from_secs(5),
            view: View::Dashboard,
            theme: Theme::Nord,
        },
        rpc.transport(),
        rpc.transport(),
    )
}

fn type_query(app: &mut App, query: &str) {
    app.start_search();
    for c in query.chars() {
        app.search_add_char(c);
    }
}

fn screen(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();
    terminal.draw(|f| ui::draw(f, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[tokio::test]
async fn malformed_query_is_dropped() {
    let rpc = MockRpc::new();
    let mut app = app(&rpc);

    type_query(&mut app, "not-a-txid");
    assert_eq!(app.input_mode(), InputMode::Search);
    assert!(!app.submit_search());

    assert_eq!(app.input_mode(), InputMode::Normal);
    assert_eq!(app.search_input(), "");
    assert_eq!(app.view(), View::Dashboard);
    assert!(app.lookup_state().current.is_none());
    assert!(rpc.calls().is_empty());
}

#[tokio::test]
async fn top_level_search_switches_to_mempool() {
    let rpc = MockRpc::new();
    rpc.ok(
        "getmempoolentry",
        json!({"fees": {"base": 0.00002}, "vsize": 100}),
    );
    let mut app = app(&rpc);

    type_query(&mut app, &format!("  {TXID} "));
    assert!(app.submit_search());
    assert_eq!(app.view(), View::Mempool);
    app.lookups().join_worker().await;

    let state = app.lookup_state();
    let current = state.current.expect("result");
    assert_eq!(current.query, TXID);
    assert!(matches!(current.kind, LookupKind::Mempool(_)));
}

#[tokio::test]
async fn escape_walks_back_then_quits() {
    let rpc = MockRpc::new();
    rpc.fail("getmempoolentry", not_found("Transaction not in mempool"));
    rpc.fail("getrawtransaction", not_found("No such transaction"));
    rpc.fail("getblock", not_found("Block not found"));
    let mut app = app(&rpc);

    assert!(app.trigger_search(TXID, true));
    app.lookups().join_worker().await;
    assert!(matches!(
        app.lookup_state().current.map(|r| r.kind),
        Some(LookupKind::Error { .. })
    ));

    app.escape();
    assert!(!app.quit_flag());
    assert!(app.lookup_state().current.is_none());
    app.escape();
    assert!(app.quit_flag());
}

#[tokio::test]
async fn drill_down_search_keeps_view() {
    let rpc = MockRpc::new();
    rpc.ok("getblockhash", json!("00".repeat(32)));
    rpc.ok("getblock", json!({"height": 7, "tx": []}));
    let mut app = app(&rpc);
    app.set_active_view(View::Peers);

    assert!(app.trigger_search("7", false));
    assert_eq!(app.view(), View::Peers);
    app.lookups().join_worker().await;
}

#[tokio::test]
async fn every_view_renders() {
    let rpc = MockRpc::new();
    healthy_node(&rpc, 884231);
    let mut app = app(&rpc);
    app.start();
    for _ in 0..200 {
        if !app.snapshot().recent_blocks.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    for view in View::ALL {
        app.set_active_view(view);
        let text = screen(&app);
        assert!(text.contains(view.title()), "{view} tab missing");
    }

    type_query(&mut app, "884");
    let text = screen(&app);
    assert!(text.contains("884"));

    app.shutdown().await;
}

#[test]
fn renders_before_first_poll() {
    let rpc = MockRpc::new();
    let app = app(&rpc);
    let text = screen(&app);
    assert!(text.contains("Dashboard"));
}
