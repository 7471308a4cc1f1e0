//! Owns the current lookup result, the drill-down history, and the single
//! background lookup worker.

use crate::{
    lookup::{perform_lookup, Activation, LookupKind, LookupResult, OverlayKind},
    rpc::RpcTransport,
    shared::Shared,
    store::SnapshotStore,
    wake::Wake,
};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use tokio::task::JoinHandle;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupState {
    pub current: Option<LookupResult>,
    /// Results that were drilled down from, most recent last.
    pub history: Vec<LookupResult>,
    /// Sequence number of the lookup whose placeholder is showing. A finished
    /// worker only publishes if it still matches.
    pending: Option<u64>,
}

/// Outcome of Esc on the lookup stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dismissed {
    /// Previous result restored from history.
    Popped,
    /// Last result cleared.
    Cleared,
    /// Nothing left to dismiss.
    Exhausted,
}

pub struct LookupCoordinator {
    rpc: Arc<dyn RpcTransport>,
    store: SnapshotStore,
    wake: Wake,
    shutdown: Arc<AtomicBool>,
    state: Shared<LookupState>,
    in_flight: Arc<AtomicBool>,
    seq: AtomicU64,
    worker: Shared<Option<JoinHandle<()>>>,
}

impl LookupCoordinator {
    /// `rpc` should carry the shorter search timeout.
    pub fn new(
        rpc: Arc<dyn RpcTransport>,
        store: SnapshotStore,
        wake: Wake,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            rpc,
            store,
            wake,
            shutdown,
            state: Shared::default(),
            in_flight: Arc::new(AtomicBool::new(false)),
            seq: AtomicU64::new(0),
            worker: Shared::new(None),
        }
    }

    pub fn state(&self) -> LookupState {
        self.state.snapshot()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start a lookup for `query`.
    ///
    /// `reset_context` starts a fresh stack (top-level search); otherwise the
    /// current result is pushed to history (drill-down). Returns false, with no
    /// state change, when the query is empty or a lookup is already running.
    /// Must be called from within a tokio runtime.
    pub fn search(&self, query: &str, reset_context: bool) -> bool {
        let query = query.trim().to_string();
        if query.is_empty() {
            return false;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("lookup for {query} ignored, another one is running");
            return false;
        }

        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.state.update(|s| {
            if reset_context {
                s.history.clear();
            } else if let Some(prev) = s.current.take().filter(|r| !r.is_searching()) {
                s.history.push(prev);
            }
            s.current = Some(LookupResult::searching(query.clone()));
            s.pending = Some(seq);
        });
        self.wake.signal();

        let tip = self.store.tip();
        let rpc = Arc::clone(&self.rpc);
        let state = self.state.clone();
        let wake = self.wake.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let in_flight = Arc::clone(&self.in_flight);

        log::info!("🔍 Looking up {query} (tip {tip})");
        // Swap handles under one lock; each worker joins its predecessor.
        self.worker.update(move |slot| {
            let previous = slot.take();
            *slot = Some(tokio::spawn(async move {
                if let Some(previous) = previous {
                    let _ = previous.await;
                }

                let kind = match perform_lookup(rpc.as_ref(), &query, tip).await {
                    Ok(kind) => kind,
                    Err(e) => {
                        log::warn!("lookup for {query} failed: {e}");
                        LookupKind::Error {
                            message: e.to_string(),
                        }
                    }
                };

                if !shutdown.load(Ordering::Acquire) {
                    let published = state.update(|s| {
                        if s.pending != Some(seq) {
                            return false;
                        }
                        s.current = Some(LookupResult::new(query.clone(), kind));
                        s.pending = None;
                        true
                    });
                    if published {
                        wake.signal();
                    } else {
                        log::debug!("lookup for {query} was dismissed, dropping result");
                    }
                }
                in_flight.store(false, Ordering::Release);
            }));
        });
        true
    }

    fn edit_current(&self, f: impl FnOnce(&mut LookupResult) -> bool) -> bool {
        let changed = self
            .state
            .update(|s| s.current.as_mut().map(f).unwrap_or(false));
        if changed {
            self.wake.signal();
        }
        changed
    }

    /// Move the row cursor of a confirmed-tx result.
    pub fn navigate(&self, delta: i32) -> bool {
        self.edit_current(|r| r.navigate(delta))
    }

    pub fn open_overlay(&self, kind: OverlayKind) -> bool {
        self.edit_current(|r| r.open_overlay(kind))
    }

    pub fn close_overlay(&self) -> bool {
        self.edit_current(|r| r.close_overlay())
    }

    pub fn overlay_move(&self, delta: i32) -> bool {
        self.edit_current(|r| r.overlay_move(delta))
    }

    pub fn overlay_open(&self) -> bool {
        self.state.with(|s| {
            s.current
                .as_ref()
                .is_some_and(|r| r.overlay.kind().is_some())
        })
    }

    /// Enter on the current result: drill into a block or input, or open a list.
    pub fn activate(&self) -> bool {
        let action = self.state.with(|s| {
            s.current
                .as_ref()
                .map(LookupResult::activation)
                .unwrap_or(Activation::None)
        });
        match action {
            Activation::None => false,
            Activation::Search(query) => self.search(&query, false),
            Activation::Open(kind) => self.open_overlay(kind),
        }
    }

    /// Pop one level of the lookup stack.
    pub fn dismiss(&self) -> Dismissed {
        let outcome = self.state.update(|s| {
            s.pending = None;
            if let Some(prev) = s.history.pop() {
                s.current = Some(prev);
                Dismissed::Popped
            } else if s.current.take().is_some() {
                Dismissed::Cleared
            } else {
                Dismissed::Exhausted
            }
        });
        if outcome != Dismissed::Exhausted {
            self.wake.signal();
        }
        outcome
    }

    /// Wait for the most recent lookup worker, if any, to finish.
    pub async fn join_worker(&self) {
        if let Some(handle) = self.worker.replace(None) {
            if let Err(e) = handle.await {
                log::warn!("lookup worker ended abnormally: {e}");
            }
        }
    }
}
