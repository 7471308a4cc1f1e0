//! Display formatters for node metrics.

/// Group digits in threes: `1234567` -> `1,234,567`.
pub fn fmt_int(n: i64) -> String {
    group(n, ',')
}

/// Block heights use `'` grouping: `884231` -> `884'231`.
pub fn fmt_height(n: i64) -> String {
    group(n, '\'')
}

fn group(n: i64, sep: char) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

fn scaled(value: f64, base: f64, units: &[&str], precision: usize) -> String {
    let mut v = value;
    let mut unit = 0;
    while v >= base && unit + 1 < units.len() {
        v /= base;
        unit += 1;
    }
    if unit == 0 {
        format!("{v:.0} {}", units[0])
    } else {
        format!("{v:.precision$} {}", units[unit])
    }
}

/// `1536` -> `1.50 KB` (binary steps).
pub fn fmt_bytes(bytes: i64) -> String {
    scaled(bytes.max(0) as f64, 1024.0, &["B", "KB", "MB", "GB", "TB"], 2)
}

/// Difficulty with SI suffix: `1.10e14` -> `110.00 T`.
pub fn fmt_difficulty(d: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e18, "E"), (1e15, "P"), (1e12, "T"), (1e9, "G")];
    for (scale, suffix) in UNITS {
        if d >= scale {
            return format!("{:.2} {suffix}", d / scale);
        }
    }
    format!("{d:.2}")
}

pub fn fmt_hashrate(h: f64) -> String {
    scaled(
        h.max(0.0),
        1000.0,
        &["H/s", "kH/s", "MH/s", "GH/s", "TH/s", "PH/s", "EH/s", "ZH/s"],
        2,
    )
}

/// BTC/kvB as reported by the node -> sat/vB.
pub fn fmt_satsvb(btc_per_kvb: f64) -> String {
    format!("{:.2} sat/vB", btc_per_kvb * 1e8 / 1000.0)
}

pub fn fmt_btc(btc: f64) -> String {
    format!("{btc:.8} BTC")
}

/// Seconds between `unix` and `now`, as `"42s ago"`, `"3m ago"`, `"2h ago"`, `"5d ago"`.
pub fn fmt_time_ago(unix: i64, now: i64) -> String {
    let secs = (now - unix).max(0);
    match secs {
        s if s < 60 => format!("{s}s ago"),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86_400),
    }
}

/// Duration in seconds as `"45s"`, `"3m 4s"`, `"2h 5m"`.
pub fn fmt_age(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// `abcdef…123456` for hashes that do not fit.
pub fn shorten_hash(hash: &str, keep: usize) -> String {
    if hash.len() <= keep * 2 + 1 || !hash.is_ascii() {
        return hash.to_string();
    }
    format!("{}…{}", &hash[..keep], &hash[hash.len() - keep..])
}

/// Last `width` chars of `s`, for the cursor-following search box.
pub fn tail_chars(s: &str, width: usize) -> &str {
    let count = s.chars().count();
    if count <= width {
        return s;
    }
    match s.char_indices().nth(count - width) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping() {
        assert_eq!(fmt_int(0), "0");
        assert_eq!(fmt_int(999), "999");
        assert_eq!(fmt_int(1000), "1,000");
        assert_eq!(fmt_int(-1234567), "-1,234,567");
        assert_eq!(fmt_height(884231), "884'231");
    }

    #[test]
    fn byte_units() {
        assert_eq!(fmt_bytes(512), "512 B");
        assert_eq!(fmt_bytes(1536), "1.50 KB");
        assert_eq!(fmt_bytes(300_000_000), "286.10 MB");
    }

    #[test]
    fn difficulty_units() {
        assert_eq!(fmt_difficulty(1.1e14), "110.00 T");
        assert_eq!(fmt_difficulty(4.5e9), "4.50 G");
        assert_eq!(fmt_difficulty(1.0), "1.00");
    }

    #[test]
    fn hashrate_units() {
        assert_eq!(fmt_hashrate(7.5e20), "750.00 EH/s");
        assert_eq!(fmt_hashrate(12.0), "12 H/s");
    }

    #[test]
    fn fee_units() {
        assert_eq!(fmt_satsvb(0.00001), "1.00 sat/vB");
        assert_eq!(fmt_btc(0.0001), "0.00010000 BTC");
    }

    #[test]
    fn relative_times() {
        assert_eq!(fmt_time_ago(100, 112), "12s ago");
        assert_eq!(fmt_time_ago(0, 7200), "2h ago");
        assert_eq!(fmt_time_ago(200, 100), "0s ago");
        assert_eq!(fmt_age(184), "3m 4s");
        assert_eq!(fmt_age(7500), "2h 5m");
    }

    #[test]
    fn hash_shortening() {
        let h = "0".repeat(64);
        assert_eq!(shorten_hash(&h, 8).chars().count(), 17);
        assert_eq!(shorten_hash("abc", 8), "abc");
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("ab", 3), "ab");
    }
}
