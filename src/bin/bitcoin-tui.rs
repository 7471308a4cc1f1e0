// Native binary for bitcoin-tui - terminal dashboard

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use bitcoin_tui::{
    app::{App, AppOptions, InputMode},
    config::{load, Config},
    credentials,
    rpc::{RpcClient, RpcConfig},
    ui,
    wake::WakeReceiver,
};

/// Upper bound on redraw rate.
const FRAME_BUDGET: Duration = Duration::from_millis(33);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    init_logging(&cfg)?;
    cfg.print_summary();

    let creds = credentials::resolve(&cfg).context("Failed to read RPC credentials")?;
    let rpc_cfg = RpcConfig {
        url: cfg.rpc_url(),
        user: creds.user,
        password: creds.password,
        timeout: cfg.rpc_timeout,
    };
    let search_cfg = RpcConfig {
        timeout: cfg.search_timeout,
        ..rpc_cfg.clone()
    };

    let mut app = App::new(
        AppOptions {
            endpoint: format!("{}:{}", cfg.host, cfg.port),
            refresh: cfg.refresh,
            view: cfg.view,
            theme: cfg.theme,
        },
        Arc::new(RpcClient::new(rpc_cfg)),
        Arc::new(RpcClient::new(search_cfg)),
    );

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let wake = app.subscribe();
    app.start();

    // main loop
    let result = run_loop(&mut app, &mut terminal, wake);

    // cleanup
    app.shutdown().await;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// Logs go to `--log-file` when given; the terminal belongs to the UI otherwise.
fn init_logging(cfg: &Config) -> Result<()> {
    let mut builder = match &cfg.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let mut b =
                env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
            b.target(env_logger::Target::Pipe(Box::new(file)));
            b
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")),
    };
    builder.init();
    Ok(())
}

fn run_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut wake: WakeReceiver,
) -> Result<()> {
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        // frame budget (coalesced renders)
        let wait = FRAME_BUDGET.saturating_sub(last_frame.elapsed());

        if event::poll(wait)? {
            match event::read()? {
                Event::Key(k) => {
                    if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                        handle_key(app, k);
                        dirty = true;
                    }
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
        if wake.take() {
            dirty = true;
        }
        if app.quit_flag() {
            break;
        }

        if dirty && last_frame.elapsed() >= FRAME_BUDGET {
            terminal.draw(|f| ui::draw(f, app))?;
            last_frame = Instant::now();
            dirty = false;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, k: KeyEvent) {
    // Handle search input mode
    if app.input_mode() == InputMode::Search {
        match k.code {
            KeyCode::Char(c) => app.search_add_char(c),
            KeyCode::Backspace => app.search_backspace(),
            KeyCode::Enter => {
                app.submit_search();
            }
            KeyCode::Esc => app.cancel_search(),
            // Tab and arrows must not switch views while typing
            _ => {}
        }
        return;
    }

    // Normal mode keys
    match (k.code, k.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.request_quit();
        }
        (KeyCode::Char('/'), _) => app.start_search(),

        // View switching (circular)
        (KeyCode::Tab, _) | (KeyCode::Right, _) => app.next_view(),
        (KeyCode::BackTab, _) | (KeyCode::Left, _) => app.prev_view(),

        // Lookup result / overlay navigation
        (KeyCode::Up, _) => app.up(),
        (KeyCode::Down, _) => app.down(),
        (KeyCode::Enter, _) => app.enter(),
        (KeyCode::Esc, _) => app.escape(),
        _ => {}
    }
}
