use crate::{
    animator::{slide_offset, ANIMATION_FRAMES},
    app::{App, InputMode, View},
    coordinator::LookupState,
    lookup::{BlockDetails, ConfirmedTx, LookupKind, LookupResult, MempoolEntry, Overlay, TxInput},
    theme::ColorScheme,
    types::{BlockStat, DashboardSnapshot},
    util_text::{
        fmt_age, fmt_btc, fmt_bytes, fmt_difficulty, fmt_hashrate, fmt_height, fmt_int,
        fmt_satsvb, fmt_time_ago, shorten_hash, tail_chars,
    },
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
    Frame,
};

const BAR_HEIGHT: usize = 6;
const COL_WIDTH: u16 = 10;
/// Column plus one cell of spacing.
const COL_PITCH: u16 = COL_WIDTH + 1;
const MAX_BLOCK_WEIGHT: i64 = 4_000_000;
const RESULT_PANEL_WIDTH: u16 = 70;
const IO_PANEL_WIDTH: u16 = 84;
const IO_WINDOW: usize = 10;
const SEARCH_BOX_WIDTH: u16 = 46;

// ===============================
// Top-level draw
// ===============================
pub fn draw(f: &mut Frame, app: &App) {
    // One copy of each shared state per frame.
    let snap = app.snapshot();
    let lookup = app.lookup_state();
    let theme = app.theme().colors();
    let now = chrono::Utc::now().timestamp();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(3), // tabs + search
            Constraint::Min(0),    // body
            Constraint::Length(3), // status
        ])
        .split(f.area());

    title_bar(f, chunks[0], app, &snap, &theme);
    tab_bar(f, chunks[1], app, &theme);
    match app.view() {
        View::Dashboard => dashboard(f, chunks[2], &snap, &theme),
        View::Mempool => mempool(f, chunks[2], &snap, &lookup, now, &theme),
        View::Network => network(f, chunks[2], &snap, &theme),
        View::Peers => peers(f, chunks[2], &snap, &theme),
    }
    status_bar(f, chunks[3], app, &snap, &lookup, &theme);
}

// ===============================
// Chrome
// ===============================
fn title_bar(f: &mut Frame, area: Rect, app: &App, snap: &DashboardSnapshot, t: &ColorScheme) {
    let mut spans = vec![
        Span::styled(
            " ₿ Bitcoin Core TUI ",
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", app.endpoint()), Style::default().fg(t.text_dim)),
    ];
    let chain = snap.chain.chain.as_str();
    if !chain.is_empty() && chain != "—" {
        let style = if chain == "main" {
            Style::default().bg(Color::Green).fg(Color::White)
        } else {
            Style::default().bg(Color::Yellow).fg(Color::Black)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" {chain} "),
            style.add_modifier(Modifier::BOLD),
        ));
    }
    let w = Paragraph::new(Line::from(spans)).block(bordered(t));
    f.render_widget(w, area);
}

fn tab_bar(f: &mut Frame, area: Rect, app: &App, t: &ColorScheme) {
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(SEARCH_BOX_WIDTH)])
        .split(area);

    let mut spans = Vec::with_capacity(View::ALL.len() * 2);
    for (i, view) in View::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("│", Style::default().fg(t.border)));
        }
        let label = format!(" {} ", view.title());
        if *view == app.view() {
            spans.push(Span::styled(
                label,
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(t.text_dim)));
        }
    }
    f.render_widget(Paragraph::new(Line::from(spans)).block(bordered(t)), parts[0]);

    let search = if app.input_mode() == InputMode::Search {
        // Cursor-following: show the tail that ends at the cursor.
        let cols = SEARCH_BOX_WIDTH.saturating_sub(5) as usize;
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                tail_chars(app.search_input(), cols).to_string(),
                Style::default().fg(t.text),
            ),
            Span::styled("│", Style::default().fg(t.text)),
        ])
    } else {
        Line::from(Span::styled(" / search ", Style::default().fg(t.text_dim)))
    };
    let border = if app.input_mode() == InputMode::Search {
        t.warn
    } else {
        t.border
    };
    let w = Paragraph::new(search).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Plain)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(w, parts[1]);
}

fn status_bar(
    f: &mut Frame,
    area: Rect,
    app: &App,
    snap: &DashboardSnapshot,
    lookup: &LookupState,
    t: &ColorScheme,
) {
    let mut left: Vec<Span> = Vec::with_capacity(4);
    match (&snap.last_error, snap.connected) {
        (Some(err), false) => {
            left.push(Span::styled(
                " ERROR ",
                Style::default()
                    .bg(t.error)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
            left.push(Span::styled(format!(" {err}"), Style::default().fg(t.error)));
        }
        _ => {
            left.push(Span::raw(" "));
            if snap.connected {
                left.push(Span::styled(
                    "● CONNECTED",
                    Style::default().fg(t.ok).add_modifier(Modifier::BOLD),
                ));
            } else {
                left.push(Span::styled(
                    "○ CONNECTING…",
                    Style::default().fg(t.warn).add_modifier(Modifier::BOLD),
                ));
            }
            left.push(Span::styled(
                format!(
                    "  Last update: {}",
                    snap.last_update.as_deref().unwrap_or("—")
                ),
                Style::default().fg(t.text_dim),
            ));
        }
    }

    let hints = key_hints(app.input_mode(), lookup.current.as_ref());
    let right = if hints.is_empty() {
        let refresh = if snap.refreshing {
            Span::styled(" ↻ refreshing", Style::default().fg(t.warn))
        } else {
            Span::styled(
                format!(" ↻ every {}s", app.refresh_secs()),
                Style::default().fg(t.text_dim),
            )
        };
        Line::from(vec![
            refresh,
            Span::styled(
                "  [Tab/←/→] switch  [/] search  [q] quit ",
                Style::default().fg(t.text_dim),
            ),
        ])
    } else {
        Line::from(Span::styled(hints, Style::default().fg(t.warn)))
    };

    let block = bordered(t);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right.width() as u16)])
        .split(inner);
    f.render_widget(Paragraph::new(Line::from(left)), parts[0]);
    f.render_widget(Paragraph::new(right).alignment(Alignment::Right), parts[1]);
}

/// Footer key hints for the current interaction state; empty in the idle state.
pub fn key_hints(mode: InputMode, current: Option<&LookupResult>) -> &'static str {
    if mode == InputMode::Search {
        return "  [Enter] search  [Esc] cancel ";
    }
    let Some(result) = current else {
        return "";
    };
    match result.overlay {
        Overlay::Outputs { .. } => return "  [↑/↓] navigate  [Esc] back  [q] quit ",
        Overlay::Inputs { .. } => return "  [↑/↓] navigate  [↵] lookup  [Esc] back  [q] quit ",
        Overlay::Closed => {}
    }
    if result.confirmed().is_none() {
        return "  [Esc] dismiss  [q] quit ";
    }
    let sel = Some(result.selected);
    if sel == result.outputs_row() {
        "  [↵] show outputs  [↑/↓] navigate  [Esc] dismiss  [q] quit "
    } else if sel == result.inputs_row() {
        "  [↵] show inputs  [↑/↓] navigate  [Esc] dismiss  [q] quit "
    } else if result.selected == 0 {
        "  [↵] view block  [↑/↓] navigate  [Esc] dismiss  [q] quit "
    } else {
        "  [↑/↓] navigate  [Esc] dismiss  [q] quit "
    }
}

// ===============================
// Views
// ===============================
fn dashboard(f: &mut Frame, area: Rect, s: &DashboardSnapshot, t: &ColorScheme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    // Blockchain
    let chain_name = if s.chain.chain == "main" {
        "mainnet".to_string()
    } else {
        s.chain.chain.clone()
    };
    let chain_color = if s.chain.chain == "main" { t.ok } else { t.warn };
    let progress = s.chain.verification_progress.clamp(0.0, 1.0);
    let chain_block = section("Blockchain", t);
    let inner = chain_block.inner(cols[0]);
    f.render_widget(chain_block, cols[0]);
    let lines = vec![
        kv("Chain       : ", chain_name, chain_color, t),
        kv("Height      : ", fmt_height(s.chain.blocks), t.text, t),
        kv("Headers     : ", fmt_height(s.chain.headers), t.text, t),
        kv("Difficulty  : ", fmt_difficulty(s.chain.difficulty), t.text, t),
        kv("Hash Rate   : ", fmt_hashrate(s.hash_rate), t.text, t),
        Line::default(),
        kv(
            "IBD         : ",
            yes_no(s.chain.initial_block_download),
            if s.chain.initial_block_download { t.warn } else { t.ok },
            t,
        ),
        kv("Pruned      : ", yes_no(s.chain.pruned), t.text, t),
    ];
    f.render_widget(Paragraph::new(lines), inner);
    if inner.height > 5 {
        let row = Rect { y: inner.y + 5, height: 1, ..inner };
        gauge_row(
            f,
            row,
            "Sync        : ",
            progress,
            format!("{}%", (progress * 100.0) as i64),
            if progress >= 1.0 { t.ok } else { t.warn },
            t,
        );
    }

    // Network
    let net = &s.network;
    let lines = vec![
        kv(
            "Active      : ",
            yes_no(net.network_active),
            if net.network_active { t.ok } else { t.error },
            t,
        ),
        kv("Connections : ", net.connections.to_string(), t.text, t),
        kv("  In        : ", net.connections_in.to_string(), t.text, t),
        kv("  Out       : ", net.connections_out.to_string(), t.text, t),
        kv("Client      : ", net.subversion.clone(), t.text, t),
        kv("Protocol    : ", net.protocol_version.to_string(), t.text, t),
        kv("Relay fee   : ", fmt_satsvb(net.relay_fee), t.text, t),
    ];
    f.render_widget(Paragraph::new(lines).block(section("Network", t)), cols[1]);

    // Mempool
    let m = &s.mempool;
    let mem_block = section("Mempool", t);
    let inner = mem_block.inner(rows[1]);
    f.render_widget(mem_block, rows[1]);
    let lines = vec![
        kv("Transactions: ", fmt_int(m.size), t.text, t),
        kv("Size        : ", fmt_bytes(m.bytes), t.text, t),
        kv("Total fee   : ", format!("{:.4} BTC", m.total_fee), t.text, t),
        kv("Min fee     : ", fmt_satsvb(m.min_fee), t.text, t),
    ];
    f.render_widget(Paragraph::new(lines), inner);
    if inner.height > 4 {
        let usage = usage_fraction(m.usage, m.max);
        let row = Rect { y: inner.y + 4, height: 1, ..inner };
        gauge_row(
            f,
            row,
            "Memory      : ",
            usage,
            format!("{} / {}", fmt_bytes(m.usage), fmt_bytes(m.max)),
            if usage > 0.8 { t.error } else { t.info },
            t,
        );
    }
}

fn mempool(
    f: &mut Frame,
    area: Rect,
    s: &DashboardSnapshot,
    lookup: &LookupState,
    now: i64,
    t: &ColorScheme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Length(13), Constraint::Min(0)])
        .split(area);

    let m = &s.mempool;
    let usage = usage_fraction(m.usage, m.max);
    let usage_color = if usage > 0.8 {
        t.error
    } else if usage > 0.5 {
        t.warn
    } else {
        t.info
    };
    let stats = section("Mempool", t);
    let inner = stats.inner(rows[0]);
    f.render_widget(stats, rows[0]);
    let lines = vec![
        kv("Transactions    : ", fmt_int(m.size), t.text, t),
        kv("Virtual size    : ", fmt_bytes(m.bytes), t.text, t),
        kv("Total fees      : ", fmt_btc(m.total_fee), t.text, t),
        kv("Min relay fee   : ", fmt_satsvb(m.min_fee), t.text, t),
        Line::default(),
        Line::default(),
        Line::from(vec![
            Span::styled("  Used : ", Style::default().fg(t.text_dim)),
            Span::styled(fmt_bytes(m.usage), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("  /  Max : ", Style::default().fg(t.text_dim)),
            Span::styled(fmt_bytes(m.max), Style::default().add_modifier(Modifier::BOLD)),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), inner);
    if inner.height > 5 {
        let row = Rect { y: inner.y + 5, height: 1, ..inner };
        gauge_row(f, row, "Memory usage    : ", usage, String::new(), usage_color, t);
    }

    block_strip(f, rows[1], s, now, t);

    let Some(result) = &lookup.current else {
        return;
    };
    match result.overlay {
        Overlay::Inputs { selected } => {
            if let Some(tx) = result.confirmed() {
                io_overlay(f, area, &result.query, "Inputs", input_rows(tx), selected, t);
                return;
            }
        }
        Overlay::Outputs { selected } => {
            if let Some(tx) = result.confirmed() {
                io_overlay(f, area, &result.query, "Outputs", output_rows(tx), selected, t);
                return;
            }
        }
        Overlay::Closed => {}
    }
    result_panel(f, area, result, lookup.history.len(), now, t);
}

fn block_strip(f: &mut Frame, area: Rect, s: &DashboardSnapshot, now: i64, t: &ColorScheme) {
    let block = section("Recent Blocks", t);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if s.recent_blocks.is_empty() {
        let w = Paragraph::new(Line::from(Span::styled(
            "  Fetching…",
            Style::default().fg(t.text_dim),
        )));
        f.render_widget(w, inner);
        return;
    }

    // While sliding, draw the previous list shifted right; its last column
    // slides off the edge.
    let sliding = s.animation.active && !s.animation.old.is_empty();
    let (src, count, pad) = if sliding {
        (
            &s.animation.old,
            s.animation.old.len().saturating_sub(1),
            slide_offset(s.animation.frame + 1, ANIMATION_FRAMES, COL_PITCH),
        )
    } else {
        (&s.recent_blocks, s.recent_blocks.len(), 0)
    };
    let max_cols = (inner.width.saturating_sub(2) / COL_PITCH).max(1) as usize;
    let x0 = inner.x + 2 + pad;
    let right = inner.x + inner.width;

    for (i, b) in src.iter().take(count.min(max_cols)).enumerate() {
        let x = x0 + i as u16 * COL_PITCH;
        if x >= right {
            break;
        }
        let width = COL_WIDTH.min(right - x);
        let col = Rect {
            x,
            y: inner.y + 1.min(inner.height),
            width,
            height: inner.height.saturating_sub(1),
        };
        f.render_widget(
            Paragraph::new(block_column(b, now, t)).alignment(Alignment::Center),
            col,
        );
    }
}

fn block_column(b: &BlockStat, now: i64, t: &ColorScheme) -> Vec<Line<'static>> {
    let fill = block_fill(b.total_weight);
    let bar_color = if fill > 0.9 {
        t.error
    } else if fill > 0.7 {
        t.warn
    } else {
        t.bar
    };
    let filled = (fill * BAR_HEIGHT as f64).round() as usize;

    let mut lines = Vec::with_capacity(BAR_HEIGHT + 4);
    for row in 0..BAR_HEIGHT {
        if row >= BAR_HEIGHT - filled {
            lines.push(Line::from(Span::styled(
                "██████████",
                Style::default().fg(bar_color),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "░░░░░░░░░░",
                Style::default().fg(t.text_dim),
            )));
        }
    }
    let dim = Style::default().fg(t.text_dim);
    lines.push(Line::from(fmt_height(b.height)));
    lines.push(Line::from(Span::styled(format!("{} tx", fmt_int(b.txs)), dim)));
    lines.push(Line::from(Span::styled(fmt_bytes(b.total_size), dim)));
    let ago = if b.time > 0 {
        fmt_time_ago(b.time, now)
    } else {
        String::new()
    };
    lines.push(Line::from(Span::styled(ago, dim)));
    lines
}

/// Share of the 4M weight-unit block limit, in `[0, 1]`.
pub fn block_fill(total_weight: i64) -> f64 {
    if total_weight <= 0 {
        return 0.0;
    }
    (total_weight as f64 / MAX_BLOCK_WEIGHT as f64).min(1.0)
}

fn result_panel(
    f: &mut Frame,
    area: Rect,
    result: &LookupResult,
    depth: usize,
    now: i64,
    t: &ColorScheme,
) {
    let rows: Vec<Line> = match &result.kind {
        LookupKind::Searching => vec![Line::from(Span::styled(
            "  Searching…",
            Style::default().fg(t.warn),
        ))],
        LookupKind::Block(b) => block_rows(b, now, t),
        LookupKind::Mempool(m) => mempool_rows(m, now, t),
        LookupKind::Confirmed(tx) => confirmed_rows(tx, result, now, t),
        LookupKind::Error { message } => vec![Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(t.error),
        ))],
    };

    let title = if matches!(result.kind, LookupKind::Block(_)) {
        " Block Search "
    } else {
        " Transaction Search "
    };
    let crumb = if depth > 0 {
        format!(" {} · depth {} ", shorten_hash(&result.query, 20), depth)
    } else {
        format!(" {} ", shorten_hash(&result.query, 20))
    };

    let height = rows.len() as u16 + 2;
    let panel = centered(RESULT_PANEL_WIDTH, height, area);
    f.render_widget(Clear, panel);
    let w = Paragraph::new(rows).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(t.border))
            .style(Style::default().bg(t.background))
            .title(Span::styled(
                title,
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
            ))
            .title_top(Line::from(Span::styled(crumb, Style::default().fg(t.text_dim))).right_aligned()),
    );
    f.render_widget(w, panel);
}

fn block_rows(b: &BlockDetails, now: i64, t: &ColorScheme) -> Vec<Line<'static>> {
    let time = chrono::DateTime::from_timestamp(b.time, 0)
        .map(|d| {
            d.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "—".into());
    let age = if b.time > 0 {
        fmt_age(now - b.time)
    } else {
        "—".into()
    };
    vec![
        heading("  ⛏ BLOCK", t.info),
        kv("Height       : ", fmt_height(b.height), t.text, t),
        kv("Hash         : ", shorten_hash(&b.hash, 24), t.text, t),
        kv("Time         : ", time, t.text, t),
        kv("Age          : ", age, t.text, t),
        kv("Transactions : ", fmt_int(b.tx_count), t.text, t),
        kv("Size         : ", format!("{} B", fmt_int(b.size)), t.text, t),
        kv("Weight       : ", format!("{} WU", fmt_int(b.weight)), t.text, t),
        kv("Difficulty   : ", fmt_difficulty(b.difficulty), t.text, t),
        kv("Miner        : ", b.miner.clone(), t.text, t),
        kv("Confirmations: ", fmt_int(b.confirmations), t.text, t),
    ]
}

fn mempool_rows(m: &MempoolEntry, now: i64, t: &ColorScheme) -> Vec<Line<'static>> {
    vec![
        heading("  ● MEMPOOL", t.warn),
        kv("Fee         : ", fmt_btc(m.fee), t.ok, t),
        kv("Fee rate    : ", format!("{:.1} sat/vB", m.fee_rate), t.text, t),
        kv("vsize       : ", format!("{} vB", fmt_int(m.vsize)), t.text, t),
        kv("Weight      : ", format!("{} WU", fmt_int(m.weight)), t.text, t),
        kv("Ancestors   : ", fmt_int(m.ancestors), t.text, t),
        kv("Descendants : ", fmt_int(m.descendants), t.text, t),
        kv("In mempool  : ", fmt_age(now - m.entry_time), t.text, t),
    ]
}

fn confirmed_rows(
    tx: &ConfirmedTx,
    result: &LookupResult,
    now: i64,
    t: &ColorScheme,
) -> Vec<Line<'static>> {
    let link = |label: &'static str, value: String, row: Option<i32>| {
        let line = Line::from(vec![
            Span::styled(format!("  {label}"), Style::default().fg(t.text_dim)),
            Span::styled(
                value,
                Style::default().fg(t.info).add_modifier(Modifier::UNDERLINED),
            ),
        ]);
        if row.is_some() && row == Some(result.selected) {
            line.style(Style::default().add_modifier(Modifier::REVERSED))
        } else {
            line
        }
    };

    let block_num = tx
        .block_height
        .map(fmt_height)
        .unwrap_or_else(|| "—".into());
    let age = if tx.block_time > 0 {
        fmt_age(now - tx.block_time)
    } else {
        "—".into()
    };

    let mut rows = vec![
        heading("  ✔ CONFIRMED", t.ok),
        kv("Confirmations: ", fmt_int(tx.confirmations), t.text, t),
        link("Block #      : ", block_num, Some(0)),
        kv("Block hash   : ", shorten_hash(&tx.block_hash, 24), t.text, t),
        kv("Block age    : ", age, t.text, t),
        kv("vsize        : ", format!("{} vB", fmt_int(tx.vsize)), t.text, t),
        kv("Weight       : ", format!("{} WU", fmt_int(tx.weight)), t.text, t),
    ];
    if !tx.inputs.is_empty() {
        rows.push(link("Inputs       : ", tx.inputs.len().to_string(), result.inputs_row()));
    }
    if !tx.outputs.is_empty() {
        rows.push(link("Outputs      : ", tx.outputs.len().to_string(), result.outputs_row()));
    }
    rows.push(kv("Total out    : ", fmt_btc(tx.total_output), t.ok, t));
    rows
}

/// (label, dimmed) per input.
fn input_rows(tx: &ConfirmedTx) -> Vec<(String, bool)> {
    tx.inputs
        .iter()
        .map(|input| match input {
            TxInput::Coinbase => ("coinbase".to_string(), true),
            TxInput::Spend { txid, vout } => (format!("{txid}:{vout}"), false),
        })
        .collect()
}

fn output_rows(tx: &ConfirmedTx) -> Vec<(String, bool)> {
    tx.outputs
        .iter()
        .map(|out| {
            let mut label = fmt_btc(out.value);
            match &out.address {
                Some(addr) => {
                    label.push_str("  ");
                    // Taproot addresses are 62 chars; only shorten past 60.
                    if addr.len() > 60 {
                        label.push_str(&shorten_hash(addr, 28));
                    } else {
                        label.push_str(addr);
                    }
                }
                None if !out.script_type.is_empty() => {
                    label.push_str(&format!("  [{}]", out.script_type));
                }
                None => {}
            }
            (label, false)
        })
        .collect()
}

/// First visible row of a scrolling window of `win` rows over `n` items,
/// keeping `selected` centred where possible.
pub fn window_top(n: usize, selected: i32, win: usize) -> usize {
    let win = win.min(n);
    let Ok(sel) = usize::try_from(selected) else {
        return 0;
    };
    sel.saturating_sub(win / 2).min(n - win)
}

fn io_overlay(
    f: &mut Frame,
    area: Rect,
    query: &str,
    title: &str,
    items: Vec<(String, bool)>,
    selected: i32,
    t: &ColorScheme,
) {
    let n = items.len();
    let win = n.min(IO_WINDOW);
    let top = window_top(n, selected, IO_WINDOW);

    let mut rows: Vec<Line> = items
        .into_iter()
        .enumerate()
        .skip(top)
        .take(win)
        .map(|(i, (label, dimmed))| {
            let label_style = if dimmed {
                Style::default().fg(t.text_dim)
            } else {
                Style::default().fg(t.text)
            };
            let line = Line::from(vec![
                Span::styled(format!("  [{i}] "), Style::default().fg(t.text_dim)),
                Span::styled(label, label_style),
            ]);
            if i as i32 == selected {
                line.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                line
            }
        })
        .collect();
    if n > win {
        rows.push(
            Line::from(Span::styled(
                format!("{}–{} / {n}", top + 1, top + win),
                Style::default().fg(t.text_dim),
            ))
            .right_aligned(),
        );
    }

    let panel = centered(IO_PANEL_WIDTH, rows.len() as u16 + 2, area);
    f.render_widget(Clear, panel);
    let w = Paragraph::new(rows).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(t.border))
            .style(Style::default().bg(t.background))
            .title(Span::styled(
                format!(" {title} ({n}) "),
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
            ))
            .title_top(
                Line::from(Span::styled(
                    format!(" {} ", shorten_hash(query, 20)),
                    Style::default().fg(t.text_dim),
                ))
                .right_aligned(),
            ),
    );
    f.render_widget(w, panel);
}

fn network(f: &mut Frame, area: Rect, s: &DashboardSnapshot, t: &ColorScheme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Length(5), Constraint::Min(0)])
        .split(area);
    let net = &s.network;
    let status = vec![
        kv(
            "Network active : ",
            yes_no(net.network_active),
            if net.network_active { t.ok } else { t.error },
            t,
        ),
        kv("Total peers    : ", net.connections.to_string(), t.text, t),
        kv("Inbound        : ", net.connections_in.to_string(), t.text, t),
        kv("Outbound       : ", net.connections_out.to_string(), t.text, t),
    ];
    f.render_widget(Paragraph::new(status).block(section("Network Status", t)), rows[0]);
    let node = vec![
        kv("Client version : ", net.subversion.clone(), t.text, t),
        kv("Protocol       : ", net.protocol_version.to_string(), t.text, t),
        kv("Relay fee      : ", fmt_satsvb(net.relay_fee), t.text, t),
    ];
    f.render_widget(Paragraph::new(node).block(section("Node", t)), rows[1]);
}

fn peers(f: &mut Frame, area: Rect, s: &DashboardSnapshot, t: &ColorScheme) {
    if s.peers.is_empty() {
        let w = Paragraph::new(Line::from(Span::styled(
            "No peers connected.",
            Style::default().fg(t.text_dim),
        )))
        .alignment(Alignment::Center);
        f.render_widget(w, area);
        return;
    }

    let header = Row::new(
        ["ID", "Address", "Net", "I/O", "Ping ms", "Recv", "Sent", "Height"]
            .into_iter()
            .map(Cell::from),
    )
    .style(Style::default().fg(t.accent).add_modifier(Modifier::BOLD));

    let rows = s.peers.iter().map(|p| {
        let ping = p
            .ping_ms()
            .map(|ms| format!("{ms:.1}"))
            .unwrap_or_else(|| "—".into());
        let dir = if p.inbound { "in" } else { "out" };
        Row::new(vec![
            Cell::from(p.id.to_string()),
            Cell::from(p.addr.clone()),
            Cell::from(p.network.clone()),
            Cell::from(Span::styled(
                dir,
                Style::default().fg(if p.inbound { t.info } else { t.ok }),
            )),
            Cell::from(Line::from(ping).right_aligned()),
            Cell::from(Line::from(fmt_bytes(p.bytes_recv)).right_aligned()),
            Cell::from(Line::from(fmt_bytes(p.bytes_sent)).right_aligned()),
            Cell::from(Line::from(fmt_height(p.synced_blocks)).right_aligned()),
        ])
    });

    let widths = [
        Constraint::Length(5),
        Constraint::Min(20),
        Constraint::Length(6),
        Constraint::Length(4),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(9),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(section(&format!("Peers ({})", s.peers.len()), t));
    f.render_widget(table, area);
}

// ===============================
// Helpers
// ===============================
fn bordered(t: &ColorScheme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(t.border))
}

fn section(title: &str, t: &ColorScheme) -> Block<'static> {
    bordered(t).title(Span::styled(
        format!(" {title} "),
        Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
    ))
}

fn heading(text: &'static str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn kv(label: &'static str, value: String, color: Color, t: &ColorScheme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label}"), Style::default().fg(t.text_dim)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn gauge_row(
    f: &mut Frame,
    row: Rect,
    label: &'static str,
    ratio: f64,
    suffix: String,
    color: Color,
    t: &ColorScheme,
) {
    let label_w = label.chars().count() as u16 + 2;
    let suffix_w = if suffix.is_empty() {
        2
    } else {
        suffix.chars().count() as u16 + 2
    };
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(label_w),
            Constraint::Min(1),
            Constraint::Length(suffix_w),
        ])
        .split(row);
    f.render_widget(
        Paragraph::new(Span::styled(format!("  {label}"), Style::default().fg(t.text_dim))),
        parts[0],
    );
    f.render_widget(
        Gauge::default()
            .ratio(ratio.clamp(0.0, 1.0))
            .label("")
            .gauge_style(Style::default().fg(color)),
        parts[1],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            format!(" {suffix}"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        parts[2],
    );
}

fn usage_fraction(usage: i64, max: i64) -> f64 {
    if max > 0 {
        (usage as f64 / max as f64).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn yes_no(b: bool) -> String {
    String::from(if b { "yes" } else { "no" })
}

/// `width` x `height` box centred in `area`, clamped to fit.
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{OverlayKind, TxOutput};

    fn confirmed_result() -> LookupResult {
        LookupResult::new(
            "ab".repeat(32),
            LookupKind::Confirmed(ConfirmedTx {
                confirmations: 1,
                block_hash: "00".repeat(32),
                block_height: Some(10),
                block_time: 0,
                vsize: 100,
                weight: 400,
                inputs: vec![TxInput::Coinbase],
                outputs: vec![TxOutput {
                    value: 3.125,
                    address: None,
                    script_type: "pubkeyhash".into(),
                }],
                total_output: 3.125,
            }),
        )
    }

    #[test]
    fn window_follows_selection() {
        assert_eq!(window_top(25, -1, 10), 0);
        assert_eq!(window_top(25, 3, 10), 0);
        assert_eq!(window_top(25, 12, 10), 7);
        assert_eq!(window_top(25, 24, 10), 15);
        assert_eq!(window_top(4, 3, 10), 0);
    }

    #[test]
    fn fill_is_capped() {
        assert_eq!(block_fill(0), 0.0);
        assert_eq!(block_fill(2_000_000), 0.5);
        assert_eq!(block_fill(9_000_000), 1.0);
    }

    #[test]
    fn hints_follow_state() {
        assert_eq!(key_hints(InputMode::Normal, None), "");
        assert!(key_hints(InputMode::Search, None).contains("cancel"));

        let mut r = confirmed_result();
        r.selected = 0;
        assert!(key_hints(InputMode::Normal, Some(&r)).contains("view block"));
        r.selected = 1;
        assert!(key_hints(InputMode::Normal, Some(&r)).contains("show inputs"));
        r.selected = 2;
        assert!(key_hints(InputMode::Normal, Some(&r)).contains("show outputs"));
        r.open_overlay(OverlayKind::Inputs);
        assert!(key_hints(InputMode::Normal, Some(&r)).contains("lookup"));

        let err = LookupResult::new("x", LookupKind::Error { message: "nope".into() });
        assert!(key_hints(InputMode::Normal, Some(&err)).contains("dismiss"));
    }

    #[test]
    fn centered_box_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        let r = centered(70, 20, area);
        assert_eq!(r, area);
        let r = centered(20, 4, area);
        assert_eq!((r.x, r.y, r.width, r.height), (10, 3, 20, 4));
    }
}
