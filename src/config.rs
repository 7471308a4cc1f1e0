use crate::{app::View, theme::Theme};
use anyhow::{anyhow, Result};
use clap::Parser;
use std::{env, path::PathBuf, time::Duration};

/// Which Bitcoin network the node runs on. Picks the default port and the
/// cookie subdirectory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Network {
    #[default]
    Main,
    Testnet,
    Signet,
    Regtest,
}

impl Network {
    pub fn default_port(self) -> u16 {
        match self {
            Network::Main => 8332,
            Network::Testnet => 18332,
            Network::Signet => 38332,
            Network::Regtest => 18443,
        }
    }

    /// Subdirectory of the data dir holding this network's `.cookie`.
    pub fn cookie_subdir(self) -> &'static str {
        match self {
            Network::Main => "",
            Network::Testnet => "testnet3",
            Network::Signet => "signet",
            Network::Regtest => "regtest",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Main),
            "test" | "testnet" | "testnet3" => Ok(Network::Testnet),
            "signet" => Ok(Network::Signet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(anyhow!(
                "Invalid network '{s}'. Valid options: main, testnet, signet, regtest"
            )),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Main => write!(f, "main"),
            Network::Testnet => write!(f, "testnet"),
            Network::Signet => write!(f, "signet"),
            Network::Regtest => write!(f, "regtest"),
        }
    }
}

/// bitcoin-tui - Terminal dashboard for Bitcoin Core
///
/// Polls a Bitcoin Core node over JSON-RPC and shows chain, mempool, network and peer state.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "bitcoin-tui")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal dashboard for Bitcoin Core", long_about = None)]
pub struct CliArgs {
    /// RPC host
    #[arg(short = 'H', long, env = "BITCOIN_RPC_HOST")]
    pub host: Option<String>,

    /// RPC port (default depends on the network)
    #[arg(short, long, env = "BITCOIN_RPC_PORT")]
    pub port: Option<u16>,

    /// RPC username (disables cookie auth)
    #[arg(short, long, env = "BITCOIN_RPC_USER")]
    pub user: Option<String>,

    /// RPC password (disables cookie auth)
    #[arg(short = 'P', long, env = "BITCOIN_RPC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Path to the node's .cookie file (auto-detected if omitted)
    #[arg(short, long, env = "BITCOIN_RPC_COOKIE")]
    pub cookie: Option<PathBuf>,

    /// Bitcoin data directory used for cookie lookup
    #[arg(short, long, env = "BITCOIN_DATADIR")]
    pub datadir: Option<PathBuf>,

    /// Use testnet3 port (18332) and cookie subdir
    #[arg(long, conflicts_with_all = ["regtest", "signet"])]
    pub testnet: bool,

    /// Use regtest port (18443) and cookie subdir
    #[arg(long, conflicts_with_all = ["testnet", "signet"])]
    pub regtest: bool,

    /// Use signet port (38332) and cookie subdir
    #[arg(long, conflicts_with_all = ["testnet", "regtest"])]
    pub signet: bool,

    /// Refresh interval in seconds (1-3600)
    #[arg(short, long, env = "BITCOIN_TUI_REFRESH")]
    pub refresh: Option<u64>,

    /// Timeout for dashboard RPC calls in seconds (1-120)
    #[arg(long, env = "BITCOIN_TUI_RPC_TIMEOUT")]
    pub rpc_timeout: Option<u64>,

    /// Timeout for lookup RPC calls in seconds (1-120)
    #[arg(long, env = "BITCOIN_TUI_SEARCH_TIMEOUT")]
    pub search_timeout: Option<u64>,

    /// Initial view: dashboard, mempool, network, peers
    #[arg(long, env = "BITCOIN_TUI_VIEW", value_parser = clap::value_parser!(View))]
    pub view: Option<View>,

    /// Color theme: nord, dos-blue, amber-crt, green-phosphor
    #[arg(long, env = "BITCOIN_TUI_THEME", value_parser = clap::value_parser!(Theme))]
    pub theme: Option<Theme>,

    /// Write logs to this file (logging is off otherwise)
    #[arg(long, env = "BITCOIN_TUI_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub network: Network,
    pub user: Option<String>,
    pub password: Option<String>,
    pub cookie: Option<PathBuf>,
    pub datadir: Option<PathBuf>,
    pub refresh: Duration,
    pub rpc_timeout: Duration,
    pub search_timeout: Duration,
    pub view: View,
    pub theme: Theme,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn rpc_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    /// True when `-u`/`-P` were given, which turns cookie auth off.
    pub fn explicit_credentials(&self) -> bool {
        self.user.is_some() || self.password.is_some()
    }

    pub fn print_summary(&self) {
        log::info!("bitcoin-tui configuration:");
        log::info!("  RPC URL: {} ({})", self.rpc_url(), self.network);
        log::info!("  Refresh: {}s", self.refresh.as_secs());
        log::info!(
            "  Timeouts: rpc {}s, search {}s",
            self.rpc_timeout.as_secs(),
            self.search_timeout.as_secs()
        );
        if self.explicit_credentials() {
            log::info!("  Auth: user/password");
        } else {
            log::info!("  Auth: cookie");
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Load configuration from CLI args and environment variables
/// Priority: CLI args > Environment variables > Defaults
pub fn load() -> Result<Config> {
    from_args(CliArgs::parse())
}

pub fn from_args(args: CliArgs) -> Result<Config> {
    let network = if args.testnet {
        Network::Testnet
    } else if args.regtest {
        Network::Regtest
    } else if args.signet {
        Network::Signet
    } else {
        match env::var("BITCOIN_NETWORK") {
            Ok(s) => s.parse()?,
            Err(_) => Network::Main,
        }
    };

    let host = args.host.unwrap_or_else(|| "127.0.0.1".to_string());
    if host.trim().is_empty() {
        return Err(anyhow!("BITCOIN_RPC_HOST cannot be empty"));
    }
    let port = args.port.unwrap_or_else(|| network.default_port());
    let port = validate_in_range(port, 1, u16::MAX, "BITCOIN_RPC_PORT")?;

    let refresh = validate_in_range(args.refresh.unwrap_or(5), 1, 3600, "BITCOIN_TUI_REFRESH")?;
    let rpc_timeout = validate_in_range(
        args.rpc_timeout.unwrap_or(10),
        1,
        120,
        "BITCOIN_TUI_RPC_TIMEOUT",
    )?;
    let search_timeout = validate_in_range(
        args.search_timeout.unwrap_or(5),
        1,
        120,
        "BITCOIN_TUI_SEARCH_TIMEOUT",
    )?;

    Ok(Config {
        host,
        port,
        network,
        user: args.user,
        password: args.password,
        cookie: args.cookie,
        datadir: args.datadir,
        refresh: Duration::from_secs(refresh),
        rpc_timeout: Duration::from_secs(rpc_timeout),
        search_timeout: Duration::from_secs(search_timeout),
        view: args.view.unwrap_or_default(),
        theme: args.theme.unwrap_or_default(),
        log_file: args.log_file,
    })
}
