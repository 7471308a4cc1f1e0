use crate::{
    animator::Animator,
    coordinator::{Dismissed, LookupCoordinator, LookupState},
    lookup::is_searchable,
    poller::Poller,
    rpc::RpcTransport,
    store::SnapshotStore,
    theme::Theme,
    types::DashboardSnapshot,
    wake::{Wake, WakeReceiver},
};
use anyhow::anyhow;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Dashboard,
    Mempool,
    Network,
    Peers,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Mempool, View::Network, View::Peers];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Mempool => "Mempool",
            View::Network => "Network",
            View::Peers => "Peers",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    fn offset(self, delta: isize) -> View {
        let n = Self::ALL.len() as isize;
        let idx = (self.index() as isize + delta).rem_euclid(n);
        Self::ALL[idx as usize]
    }
}

impl std::str::FromStr for View {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "dashboard" | "dash" => Ok(View::Dashboard),
            "mempool" => Ok(View::Mempool),
            "network" | "net" => Ok(View::Network),
            "peers" => Ok(View::Peers),
            _ => Err(anyhow!(
                "Invalid view '{s}'. Valid options: dashboard, mempool, network, peers"
            )),
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title().to_lowercase())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the `/` search box.
    Search,
}

pub struct AppOptions {
    /// `host:port`, shown in the title bar.
    pub endpoint: String,
    pub refresh: Duration,
    pub view: View,
    pub theme: Theme,
}

pub struct App {
    quit: bool,
    view: View,
    input_mode: InputMode,
    search_input: String,
    theme: Theme,
    endpoint: String,
    refresh: Duration,

    rpc: Arc<dyn RpcTransport>,
    store: SnapshotStore,
    wake: Wake,
    shutdown: Arc<AtomicBool>,
    lookups: LookupCoordinator,

    poller_task: Option<JoinHandle<()>>,
    animator_task: Option<JoinHandle<()>>,
}

impl App {
    /// `search_rpc` is used for lookups and normally has a shorter timeout than `rpc`.
    pub fn new(
        opts: AppOptions,
        rpc: Arc<dyn RpcTransport>,
        search_rpc: Arc<dyn RpcTransport>,
    ) -> Self {
        let store = SnapshotStore::new();
        let wake = Wake::new();
        let shutdown = Arc::new(AtomicBool::new(false));
        let lookups = LookupCoordinator::new(
            search_rpc,
            store.clone(),
            wake.clone(),
            Arc::clone(&shutdown),
        );
        Self {
            quit: false,
            view: opts.view,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            theme: opts.theme,
            endpoint: opts.endpoint,
            refresh: opts.refresh,
            rpc,
            store,
            wake,
            shutdown,
            lookups,
            poller_task: None,
            animator_task: None,
        }
    }

    /// Spawn the poller and the animator. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        if self.poller_task.is_some() {
            return;
        }
        let poller = Poller::new(
            Arc::clone(&self.rpc),
            self.store.clone(),
            self.wake.clone(),
            Arc::clone(&self.shutdown),
            self.refresh,
        );
        let animator = Animator::new(
            self.store.clone(),
            self.wake.clone(),
            Arc::clone(&self.shutdown),
        );
        self.poller_task = Some(tokio::spawn(poller.run()));
        self.animator_task = Some(tokio::spawn(animator.run()));
    }

    /// Stop every background task: lookup worker, then poller, then animator.
    pub async fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        self.lookups.join_worker().await;
        for (name, task) in [
            ("poller", self.poller_task.take()),
            ("animator", self.animator_task.take()),
        ] {
            if let Some(task) = task {
                if let Err(e) = task.await {
                    log::warn!("{name} task ended abnormally: {e}");
                }
            }
        }
        log::info!("background tasks stopped");
    }

    pub fn quit_flag(&self) -> bool {
        self.quit
    }
    pub fn request_quit(&mut self) {
        self.quit = true;
    }
    pub fn view(&self) -> View {
        self.view
    }
    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }
    pub fn search_input(&self) -> &str {
        &self.search_input
    }
    pub fn theme(&self) -> Theme {
        self.theme
    }
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
    pub fn refresh_secs(&self) -> u64 {
        self.refresh.as_secs()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.store.snapshot()
    }
    pub fn lookup_state(&self) -> LookupState {
        self.lookups.state()
    }
    pub fn lookups(&self) -> &LookupCoordinator {
        &self.lookups
    }
    pub fn subscribe(&self) -> WakeReceiver {
        self.wake.subscribe()
    }

    pub fn set_active_view(&mut self, view: View) {
        self.view = view;
    }
    pub fn next_view(&mut self) {
        self.view = self.view.offset(1);
    }
    pub fn prev_view(&mut self) {
        self.view = self.view.offset(-1);
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_input.clear();
    }
    pub fn search_add_char(&mut self, c: char) {
        self.search_input.push(c);
    }
    pub fn search_backspace(&mut self) {
        self.search_input.pop();
    }
    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_input.clear();
    }

    /// Enter in the search box. Malformed queries are dropped silently.
    pub fn submit_search(&mut self) -> bool {
        let query = self.search_input.trim().to_string();
        self.cancel_search();
        if !is_searchable(&query) {
            log::debug!("ignoring malformed query {query:?}");
            return false;
        }
        self.trigger_search(&query, true)
    }

    /// Start a lookup. A top-level one (`reset_context`) clears the drill-down
    /// stack and shows the Mempool view.
    pub fn trigger_search(&mut self, query: &str, reset_context: bool) -> bool {
        let started = self.lookups.search(query, reset_context);
        if started && reset_context {
            self.set_active_view(View::Mempool);
        }
        started
    }

    pub fn up(&mut self) {
        self.move_selection(-1);
    }
    pub fn down(&mut self) {
        self.move_selection(1);
    }

    fn move_selection(&mut self, delta: i32) {
        if self.lookups.overlay_open() {
            self.lookups.overlay_move(delta);
        } else {
            self.lookups.navigate(delta);
        }
    }

    pub fn enter(&mut self) {
        self.lookups.activate();
    }

    /// Esc outside the search box: close overlay, else pop the lookup stack,
    /// else quit.
    pub fn escape(&mut self) {
        if self.lookups.close_overlay() {
            return;
        }
        if self.lookups.dismiss() == Dismissed::Exhausted {
            self.quit = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_wrap_around() {
        assert_eq!(View::Dashboard.offset(-1), View::Peers);
        assert_eq!(View::Peers.offset(1), View::Dashboard);
        assert_eq!(View::Mempool.offset(1), View::Network);
    }

    #[test]
    fn view_names() {
        assert_eq!("NET".parse::<View>().unwrap(), View::Network);
        assert_eq!(View::Mempool.to_string(), "mempool");
        assert!("wallet".parse::<View>().is_err());
    }
}
