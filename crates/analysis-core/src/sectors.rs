//! Sector reference data shared by the analysis crates.

/// Benchmark indices shown in the market overview.
pub const MARKET_INDICES: &[(&str, &str)] = &[
    ("S&P 500", "^GSPC"),
    ("NASDAQ", "^IXIC"),
    ("DOW", "^DJI"),
    ("VIX", "^VIX"),
];

/// Sector name and its SPDR sector ETF.
pub const SECTOR_ETFS: &[(&str, &str)] = &[
    ("Technology", "XLK"),
    ("Healthcare", "XLV"),
    ("Financial Services", "XLF"),
    ("Consumer Discretionary", "XLY"),
    ("Consumer Staples", "XLP"),
    ("Industrials", "XLI"),
    ("Energy", "XLE"),
    ("Materials", "XLB"),
    ("Real Estate", "XLRE"),
    ("Utilities", "XLU"),
    ("Communication Services", "XLC"),
];

const PEER_GROUPS: &[(&str, &[&str])] = &[
    ("Technology", &["AAPL", "MSFT", "GOOGL", "AMZN", "META"]),
    ("Healthcare", &["JNJ", "PFE", "UNH", "ABBV", "TMO"]),
    ("Financial Services", &["JPM", "BAC", "WFC", "GS", "MS"]),
];

/// Large-cap peers for a sector; empty for sectors without a peer set.
pub fn peer_group(sector: &str) -> &'static [&'static str] {
    PEER_GROUPS
        .iter()
        .find(|(name, _)| *name == sector)
        .map(|(_, peers)| *peers)
        .unwrap_or(&[])
}

/// Peers of `symbol` within its sector, excluding the symbol itself.
pub fn peers_excluding(sector: &str, symbol: &str) -> Vec<String> {
    peer_group(sector)
        .iter()
        .filter(|peer| !peer.eq_ignore_ascii_case(symbol))
        .map(|peer| peer.to_string())
        .collect()
}

/// Resolve a sector name (case-insensitive) to its canonical name and ETF.
pub fn sector_etf(sector: &str) -> Option<(&'static str, &'static str)> {
    let wanted = sector.trim();
    SECTOR_ETFS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .copied()
}
