//! RPC credentials: explicit user/password or Bitcoin Core's `.cookie` file.

use crate::config::{Config, Network};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Platform default data directory under `home`.
pub fn default_datadir(home: &Path) -> PathBuf {
    if cfg!(target_os = "macos") {
        home.join("Library").join("Application Support").join("Bitcoin")
    } else {
        home.join(".bitcoin")
    }
}

/// `<datadir>/<network subdir>/.cookie`
pub fn cookie_path(datadir: &Path, network: Network) -> PathBuf {
    let sub = network.cookie_subdir();
    if sub.is_empty() {
        datadir.join(".cookie")
    } else {
        datadir.join(sub).join(".cookie")
    }
}

/// Parse the first line of a cookie file: `user:password`.
pub fn parse_cookie(content: &str) -> Result<Credentials> {
    let line = content.lines().next().unwrap_or("").trim_end_matches('\r');
    if line.is_empty() {
        return Err(anyhow!("cookie file is empty"));
    }
    let (user, password) = line
        .split_once(':')
        .ok_or_else(|| anyhow!("invalid cookie file (no ':' found)"))?;
    Ok(Credentials {
        user: user.to_string(),
        password: password.to_string(),
    })
}

pub fn read_cookie(path: &Path) -> Result<Credentials> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open cookie file: {}", path.display()))?;
    parse_cookie(&content).with_context(|| format!("Bad cookie file: {}", path.display()))
}

/// Work out the credentials to send.
///
/// Explicit `-u`/`-P` win. Otherwise the cookie is read: failing to read an
/// explicitly named cookie is an error, failing to read the auto-detected one
/// is logged and yields empty credentials (the node will answer 401).
pub fn resolve(cfg: &Config) -> Result<Credentials> {
    if cfg.explicit_credentials() {
        return Ok(Credentials {
            user: cfg.user.clone().unwrap_or_default(),
            password: cfg.password.clone().unwrap_or_default(),
        });
    }

    if let Some(path) = &cfg.cookie {
        return read_cookie(path);
    }

    let datadir = match &cfg.datadir {
        Some(dir) => dir.clone(),
        None => match std::env::var_os("HOME") {
            Some(home) => default_datadir(Path::new(&home)),
            None => {
                log::warn!("HOME not set; use --datadir or --cookie to locate .cookie");
                return Ok(Credentials::default());
            }
        },
    };
    let path = cookie_path(&datadir, cfg.network);
    match read_cookie(&path) {
        Ok(creds) => {
            log::info!("🔑 Using cookie auth from {}", path.display());
            Ok(creds)
        }
        Err(e) => {
            log::warn!("⚠️ No usable cookie ({e:#}), continuing without credentials");
            Ok(Credentials::default())
        }
    }
}
